//! Document IR builder.
//!
//! [`DocumentBuilder::build`] walks a [`SourceTree`] top-down:
//!
//! 1. Document settings and `STYLE_*` declarations are read from the meta
//!    properties.
//! 2. Each page node becomes a renderable [`Page`], or, when it carries
//!    `MASTER_DEF`, a [`Master`] registered under that name.
//! 3. Sections are walked recursively. Areas are inherited from the nearest
//!    ancestor that declares one, padding accumulates along the path, and a
//!    section with no `TYPE` (or `none`) contributes no element while its
//!    children are still walked. `IGNORE` drops a page or section subtree.
//! 4. Tables of contents are filled, master references are checked and the
//!    document is validated. Pages keep only their own elements; master
//!    layers are merged per page by [`crate::render::render_page`].
//!
//! The build never aborts: every problem is reported as a [`Diagnostic`]
//! and the fullest possible document is returned.

mod element;
mod options;
mod validate;

pub use options::{BuildOptions, DEFAULT_Z};
pub use validate::validate;

use crate::assets::{AnyFont, AssetProbe, FontCatalog, NullAssets};
use crate::layout::{parse_area, resolve_padding, GridDims, GridGeometry, GridRect, Padding};
use crate::master::Master;
use crate::model::{
    Diagnostic, DiagnosticCode, Diagnostics, Document, Element, ElementKind, Orientation, Page,
    PageSize, Payload, Severity, TocEntry,
};
use crate::tree::{Node, Properties, SourceTree};
use element::{parse_sides, parse_token, resolve_element, ElementScope, Reporter};
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Result of a build: the document and everything found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    /// The resolved document
    pub document: Document,

    /// Diagnostics in the order they were produced
    pub diagnostics: Diagnostics,
}

impl BuildOutput {
    /// Check for any error-level diagnostic.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Diagnostics that block the build under the given asset policy.
    pub fn blocking(&self, strict_assets: bool) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.is_blocking(strict_assets))
    }

    /// Fail-fast view: the first error-level diagnostic becomes `Err`.
    pub fn into_result(self) -> std::result::Result<Document, Diagnostic> {
        match self.diagnostics.errors().next() {
            Some(first) => Err(first.clone()),
            None => Ok(self.document),
        }
    }
}

/// Builds documents from parsed node trees.
pub struct DocumentBuilder {
    options: BuildOptions,
    fonts: Box<dyn FontCatalog>,
    assets: Box<dyn AssetProbe>,
}

impl DocumentBuilder {
    /// Create a builder with the given options and no-I/O collaborators.
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            fonts: Box::new(AnyFont),
            assets: Box::new(NullAssets),
        }
    }

    /// Use a font catalog for font availability checks.
    pub fn with_fonts(mut self, fonts: impl FontCatalog + 'static) -> Self {
        self.fonts = Box::new(fonts);
        self
    }

    /// Use an asset probe for asset checks.
    pub fn with_assets(mut self, assets: impl AssetProbe + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    /// The configured options.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The configured asset probe.
    pub fn assets(&self) -> &dyn AssetProbe {
        self.assets.as_ref()
    }

    /// Build a document. The same tree always yields the same output.
    pub fn build(&self, tree: &SourceTree) -> BuildOutput {
        let mut diags = Vec::new();
        let mut doc = self.document_settings(&tree.meta, &mut diags);

        for node in &tree.pages {
            self.build_page(&mut doc, node, &mut diags);
        }
        log::debug!(
            "built {} pages and {} masters",
            doc.pages.len(),
            doc.masters.len()
        );

        fill_tocs(&mut doc);
        check_master_refs(&doc, &mut diags);

        if self.options.check_fonts {
            for font in doc.styles.fonts(doc.font.as_deref()) {
                if !self.fonts.font_exists(&font) {
                    diags.push(Diagnostic::warning(
                        DiagnosticCode::MissingFont,
                        format!("font '{font}' is not available"),
                    ));
                }
            }
        }

        diags.extend(validate(&doc, self.assets.as_ref(), self.options.check_assets));

        let mut diagnostics = Diagnostics::new();
        diagnostics.extend(diags);
        BuildOutput {
            document: doc,
            diagnostics,
        }
    }

    fn document_settings(&self, meta: &Properties, diags: &mut Vec<Diagnostic>) -> Document {
        let mut report = Reporter::new(None, None, diags);

        let page_size = parse_token(meta, "PAGESIZE", PageSize::parse, &mut report)
            .unwrap_or(self.options.page_size);
        let orientation = parse_token(meta, "ORIENTATION", Orientation::parse, &mut report)
            .unwrap_or(self.options.orientation);
        let grid =
            parse_token(meta, "GRID", GridDims::parse, &mut report).unwrap_or(self.options.grid);

        let mut doc = Document::new(page_size, orientation, grid);
        doc.margins = parse_sides(meta, "MARGINS", &mut report);
        doc.padding = parse_sides(meta, "PADDING", &mut report);
        doc.default_master = meta.get_non_empty("DEFAULT_MASTER").map(str::to_string);
        doc.font = meta.get_non_empty("FONT").map(str::to_string);

        for (key, value) in meta.iter() {
            let Some(name) = key.strip_prefix("STYLE_") else {
                continue;
            };
            if name.trim().is_empty() {
                continue;
            }
            for d in doc.styles.declare(name, value) {
                report.push(d);
            }
        }
        doc
    }

    fn build_page(&self, doc: &mut Document, node: &Node, diags: &mut Vec<Diagnostic>) {
        let props = &node.properties;
        let id = node_id(node);
        let mut report = Reporter::new(Some(id.as_str()), None, diags);

        if is_ignored(props, &mut report) {
            log::debug!("ignoring page '{}'", id);
            return;
        }

        let ignored: Vec<&str> = ["PAGE_SIZE", "ORIENTATION"]
            .into_iter()
            .filter(|k| props.contains(k))
            .collect();
        if !ignored.is_empty() {
            report.warn(
                DiagnosticCode::IgnoredOverride,
                format!("{} ignored; page size is set per document", ignored.join(", ")),
            );
        }

        let grid = parse_token(props, "GRID", GridDims::parse, &mut report).unwrap_or(doc.grid);
        let margins = parse_sides(props, "MARGINS", &mut report).or(doc.margins);
        let page_padding = parse_sides(props, "PADDING", &mut report);
        let toc_ignore = match props.get_bool("TOC_IGNORE") {
            Ok(flag) => flag.unwrap_or(false),
            Err(e) => {
                report.report(&e, Severity::Warning);
                false
            }
        };

        let (width, height) = doc.dimensions();
        let geometry = GridGeometry::new(width, height, grid, margins);

        let elements = {
            let walker = SectionWalker {
                scope: ElementScope {
                    styles: &doc.styles,
                    font_override: doc.font.as_deref(),
                    default_z: self.options.default_z,
                },
                page_id: &id,
                geometry: &geometry,
                document_padding: doc.padding,
                page_padding,
            };
            let mut elements = Vec::new();
            let mut ancestors = Vec::new();
            for child in &node.children {
                walker.walk(child, None, &mut ancestors, &mut elements, diags);
            }
            elements
        };

        if let Some(name) = props.get_non_empty("MASTER_DEF") {
            log::debug!("page '{}' defines master '{}'", id, name);
            doc.masters
                .register_master(Master::new(name, elements).with_geometry(geometry));
            return;
        }

        let mut page = Page::new(id, node.title.trim(), geometry);
        page.master = props
            .get_non_empty("MASTER")
            .map(str::to_string)
            .or_else(|| doc.default_master.clone());
        page.toc_ignore = toc_ignore;
        page.elements = elements;
        doc.pages.push(page);
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

/// Recursive section walk for one page or master.
struct SectionWalker<'a> {
    scope: ElementScope<'a>,
    page_id: &'a str,
    geometry: &'a GridGeometry,
    document_padding: Option<Padding>,
    page_padding: Option<Padding>,
}

impl SectionWalker<'_> {
    fn walk(
        &self,
        node: &Node,
        inherited_area: Option<GridRect>,
        ancestors: &mut Vec<Padding>,
        out: &mut Vec<Element>,
        diags: &mut Vec<Diagnostic>,
    ) {
        let props = &node.properties;
        let id = node_id(node);
        let mut report = Reporter::new(Some(self.page_id), Some(id.as_str()), diags);

        if is_ignored(props, &mut report) {
            log::debug!("ignoring section '{}' on page '{}'", id, self.page_id);
            return;
        }

        let own_area = match props.get_non_empty("AREA") {
            Some(raw) => match parse_area(raw) {
                Ok(rect) => Some(rect),
                Err(e) => {
                    report.report(&e, Severity::Warning);
                    None
                }
            },
            None => None,
        };
        let area = own_area.or(inherited_area);
        let own_padding = parse_sides(props, "PADDING", &mut report);

        if let Some(kind) = props.get("TYPE").and_then(ElementKind::parse) {
            let padding = resolve_padding(
                self.document_padding,
                self.page_padding,
                ancestors,
                own_padding,
            );
            let area = area.unwrap_or_else(|| self.geometry.default_area());
            let element = resolve_element(
                &self.scope,
                node,
                id.clone(),
                kind,
                area,
                padding,
                &mut report,
            );
            out.push(element);
        }

        if let Some(p) = own_padding {
            ancestors.push(p);
        }
        for child in &node.children {
            self.walk(child, area, ancestors, out, diags);
        }
        if own_padding.is_some() {
            ancestors.pop();
        }
    }
}

fn is_ignored(props: &Properties, report: &mut Reporter<'_>) -> bool {
    match props.get_bool("IGNORE") {
        Ok(flag) => flag.unwrap_or(false),
        Err(e) => {
            report.report(&e, Severity::Warning);
            false
        }
    }
}

fn node_id(node: &Node) -> String {
    node.properties
        .get_non_empty("ID")
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&node.title))
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Derive an identifier from a title.
///
/// Accents are folded away, runs of anything but ASCII letters and digits
/// become a single `-`, and an empty result becomes `item`.
pub fn slugify(title: &str) -> String {
    let folded: String = title.nfkd().filter(char::is_ascii).collect();
    let lowered = folded.to_ascii_lowercase();
    let slug = slug_re().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

/// Fill every table of contents with the renderable pages.
fn fill_tocs(doc: &mut Document) {
    let entries: Vec<TocEntry> = doc
        .pages
        .iter()
        .enumerate()
        .filter(|(_, page)| !page.toc_ignore)
        .map(|(i, page)| TocEntry {
            title: page.title.clone(),
            page: i as u32 + 1,
        })
        .collect();

    let page_elements = doc.pages.iter_mut().flat_map(|p| p.elements.iter_mut());
    let master_elements = doc.masters.iter_mut().flat_map(|m| m.elements.iter_mut());
    for element in page_elements.chain(master_elements) {
        if let Payload::Toc(toc) = &mut element.payload {
            toc.entries = entries.clone();
        }
    }
}

/// Report pages that reference an unregistered master.
fn check_master_refs(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for page in &doc.pages {
        if let Some(name) = &page.master {
            if !doc.masters.contains(name) {
                diags.push(
                    Diagnostic::warning(
                        DiagnosticCode::UnknownMaster,
                        format!("master '{name}' is not defined"),
                    )
                    .with_page(&page.id),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, kind: &str, area: &str) -> Node {
        Node::new(title).prop("TYPE", kind).prop("AREA", area)
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Café  Menü "), "cafe-menu");
        assert_eq!(slugify("***"), "item");
        assert_eq!(slugify(""), "item");
    }

    #[test]
    fn test_document_settings() {
        let tree = SourceTree::new()
            .with_meta("PAGESIZE", "A3")
            .with_meta("ORIENTATION", "portrait")
            .with_meta("GRID", "6x4")
            .with_meta("MARGINS", "10,5,10,5")
            .with_meta("FONT", "Lora")
            .with_meta("DEFAULT_MASTER", "base");
        let out = DocumentBuilder::default().build(&tree);
        let doc = &out.document;
        assert_eq!(doc.dimensions(), (297.0, 420.0));
        assert_eq!(doc.grid, GridDims::new(6, 4));
        assert_eq!(doc.margins, Some(Padding::new(10.0, 5.0, 10.0, 5.0)));
        assert_eq!(doc.font.as_deref(), Some("Lora"));
        assert_eq!(doc.default_master.as_deref(), Some("base"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_meta_falls_back() {
        let tree = SourceTree::new()
            .with_meta("PAGESIZE", "B9")
            .with_meta("GRID", "wide");
        let out = DocumentBuilder::default().build(&tree);
        assert_eq!(out.document.page_size, PageSize::A4);
        assert_eq!(out.document.grid, GridDims::new(12, 8));
        assert_eq!(
            out.diagnostics.with_code(DiagnosticCode::InvalidValue).count(),
            2
        );
    }

    #[test]
    fn test_area_inheritance_and_type_none() {
        let page = Node::new("Intro").child(
            Node::new("Group")
                .prop("TYPE", "none")
                .prop("AREA", "B2,C6")
                .child(Node::new("Inner").prop("TYPE", "body"))
                .child(section("Own", "header", "A1")),
        );
        let out = DocumentBuilder::default().build(&SourceTree::new().with_page(page));
        let elements = &out.document.pages[0].elements;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].id, "inner");
        assert_eq!(elements[0].area, GridRect::new(2, 2, 5, 2).unwrap());
        assert_eq!(elements[1].area, GridRect::cell(1, 1).unwrap());
    }

    #[test]
    fn test_default_area() {
        let tree = SourceTree::new()
            .with_meta("GRID", "4x4")
            .with_page(Node::new("P").child(Node::new("T").prop("TYPE", "body")));
        let out = DocumentBuilder::default().build(&tree);
        assert_eq!(
            out.document.pages[0].elements[0].area,
            GridRect::new(1, 1, 4, 1).unwrap()
        );
    }

    #[test]
    fn test_invalid_area_inherits() {
        let page = Node::new("P").child(
            Node::new("G")
                .prop("AREA", "A1,B2")
                .child(section("T", "body", "not-an-area")),
        );
        let out = DocumentBuilder::default().build(&SourceTree::new().with_page(page));
        assert_eq!(
            out.document.pages[0].elements[0].area,
            GridRect::new(1, 1, 2, 2).unwrap()
        );
        let d: Vec<_> = out.diagnostics.with_code(DiagnosticCode::InvalidArea).collect();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].element.as_deref(), Some("t"));
    }

    #[test]
    fn test_padding_cascade_through_sections() {
        let tree = SourceTree::new().with_meta("PADDING", "10").with_page(
            Node::new("P").child(
                Node::new("Group")
                    .prop("PADDING", "1 2 3 4")
                    .child(section("Box", "rectangle", "A1"))
                    .child(section("Text", "body", "A2").prop("PADDING", "5")),
            ),
        );
        let out = DocumentBuilder::default().build(&tree);
        let els = &out.document.pages[0].elements;
        assert_eq!(els[0].padding, Some(Padding::new(11.0, 12.0, 13.0, 14.0)));
        assert_eq!(els[1].padding, Some(Padding::new(16.0, 17.0, 18.0, 19.0)));
    }

    #[test]
    fn test_ignore_section() {
        let page = Node::new("P")
            .child(section("Keep", "body", "A1"))
            .child(
                section("Drop", "body", "A2")
                    .prop("IGNORE", "true")
                    .child(section("Child", "body", "A3")),
            );
        let out = DocumentBuilder::default().build(&SourceTree::new().with_page(page));
        let ids: Vec<&str> = out.document.pages[0]
            .elements
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["keep"]);
    }

    #[test]
    fn test_master_definition() {
        let tree = SourceTree::new()
            .with_meta("DEFAULT_MASTER", "base")
            .with_page(
                Node::new("Base layout")
                    .prop("MASTER_DEF", "base")
                    .child(section("Logo", "figure", "H1").prop("SRC", "logo.png")),
            )
            .with_page(Node::new("One").child(section("Title", "header", "A1")))
            .with_page(Node::new("Two").prop("MASTER", "other"));

        let out = DocumentBuilder::default().build(&tree);
        let doc = &out.document;
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.masters.get("base").unwrap().elements[0].id, "logo");
        assert_eq!(doc.pages[0].master.as_deref(), Some("base"));

        let unknown: Vec<_> = out.diagnostics.with_code(DiagnosticCode::UnknownMaster).collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].page.as_deref(), Some("two"));
    }

    #[test]
    fn test_masters_merge_at_render_time() {
        let tree = SourceTree::new()
            .with_page(
                Node::new("Base")
                    .prop("MASTER_DEF", "base")
                    .child(section("Band", "rectangle", "A1").prop("Z", "0")),
            )
            .with_page(
                Node::new("One")
                    .prop("MASTER", "base")
                    .child(section("Title", "header", "A1")),
            )
            .with_page(Node::new("Two").prop("MASTER", "missing").child(section("Note", "body", "A1")));
        let out = DocumentBuilder::default().build(&tree);

        let own: Vec<_> = out.document.pages[0].elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(own, vec!["title"]);

        let pages = crate::render::render_pages(&out.document, &NullAssets);
        assert_eq!(pages[0].paint_order(), vec!["band", "title"]);
        assert_eq!(pages[1].paint_order(), vec!["note"]);
        assert_eq!(out.diagnostics.with_code(DiagnosticCode::UnknownMaster).count(), 1);
    }

    #[test]
    fn test_toc_entries() {
        let tree = SourceTree::new()
            .with_page(Node::new("Contents").prop("TOC_IGNORE", "yes").child(section("Toc", "toc", "A1")))
            .with_page(Node::new("Chapter One"))
            .with_page(Node::new("Chapter Two"));
        let out = DocumentBuilder::default().build(&tree);
        match &out.document.pages[0].elements[0].payload {
            Payload::Toc(toc) => {
                assert_eq!(toc.entries.len(), 2);
                assert_eq!(toc.entries[0].title, "Chapter One");
                assert_eq!(toc.entries[0].page, 2);
                assert_eq!(toc.entries[1].page, 3);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_page_size_override_ignored() {
        let tree = SourceTree::new().with_page(Node::new("P").prop("PAGE_SIZE", "A3"));
        let out = DocumentBuilder::default().build(&tree);
        let d: Vec<_> = out.diagnostics.with_code(DiagnosticCode::IgnoredOverride).collect();
        assert_eq!(d.len(), 1);
        assert_eq!(out.document.pages[0].geometry.page_width, 297.0);
    }

    #[test]
    fn test_page_grid_and_margin_override() {
        let tree = SourceTree::new().with_meta("GRID", "12x8").with_page(
            Node::new("P")
                .prop("GRID", "3x3")
                .prop("MARGINS", "5 0 0 5"),
        );
        let out = DocumentBuilder::default().build(&tree);
        let geo = out.document.pages[0].geometry;
        assert_eq!(geo.grid, GridDims::new(3, 3));
        assert_eq!(geo.total_cols(), 5);
    }

    #[test]
    fn test_into_result() {
        let page = Node::new("P")
            .child(section("A", "body", "A1"))
            .child(section("A", "body", "A2"));
        let out = DocumentBuilder::default().build(&SourceTree::new().with_page(page));
        assert!(out.has_errors());
        let err = out.into_result().unwrap_err();
        assert_eq!(err.code, DiagnosticCode::DuplicateId);
    }
}
