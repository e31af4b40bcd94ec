//! Structural validation of a built document.

use crate::assets::AssetProbe;
use crate::error::Error;
use crate::layout::GridGeometry;
use crate::model::{Diagnostic, DiagnosticCode, Document, Element, Severity};
use std::collections::HashSet;
use std::path::Path;

/// Validate a document.
///
/// Checks page and element id uniqueness, element types, area bounds,
/// rectangle alpha range and asset sources. Master elements are checked
/// once, against the geometry of the page that defined them. When
/// `check_assets` is set, relative sources that `assets` cannot find are
/// reported as warnings.
pub fn validate(doc: &Document, assets: &dyn AssetProbe, check_assets: bool) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut page_ids: HashSet<&str> = HashSet::new();
    let mut element_ids: HashSet<&str> = HashSet::new();
    let default_geometry = doc.geometry();

    for master in doc.masters.iter() {
        let geometry = master.geometry.unwrap_or(default_geometry);
        for element in &master.elements {
            check_element(
                element,
                &master.name,
                &geometry,
                &mut element_ids,
                assets,
                check_assets,
                &mut diags,
            );
        }
    }

    for page in &doc.pages {
        if !page_ids.insert(page.id.as_str()) {
            let err = Error::DuplicateId {
                kind: "page",
                id: page.id.clone(),
            };
            diags.push(Diagnostic::from_error(&err, Severity::Error).with_page(&page.id));
        }
        for element in &page.elements {
            check_element(
                element,
                &page.id,
                &page.geometry,
                &mut element_ids,
                assets,
                check_assets,
                &mut diags,
            );
        }
    }

    log::debug!("validation produced {} diagnostics", diags.len());
    diags
}

fn check_element<'a>(
    element: &'a Element,
    owner: &str,
    geometry: &GridGeometry,
    seen: &mut HashSet<&'a str>,
    assets: &dyn AssetProbe,
    check_assets: bool,
    diags: &mut Vec<Diagnostic>,
) {
    let tag = |d: Diagnostic| d.with_page(owner).with_element(&element.id);

    if !seen.insert(element.id.as_str()) {
        let err = Error::DuplicateId {
            kind: "element",
            id: element.id.clone(),
        };
        diags.push(tag(Diagnostic::from_error(&err, Severity::Error)));
    }

    if !element.kind.is_known() {
        let err = Error::UnknownType(element.kind.as_str().to_string());
        diags.push(tag(Diagnostic::from_error(&err, Severity::Warning)));
    }

    if !geometry.contains(&element.area) {
        let err = Error::OutOfRange(format!(
            "area {} exceeds the {}x{} grid",
            element.area,
            geometry.total_cols(),
            geometry.total_rows()
        ));
        diags.push(tag(Diagnostic::from_error(&err, Severity::Error)));
    }

    if let Some(rect) = element.rectangle() {
        if !(0.0..=1.0).contains(&rect.alpha) {
            let err = Error::OutOfRange(format!("alpha {}", rect.alpha));
            diags.push(tag(Diagnostic::from_error(&err, Severity::Error)));
        }
    }

    if element.kind.is_asset() {
        match element.asset_src() {
            None => diags.push(tag(Diagnostic::error(
                DiagnosticCode::MissingSource,
                format!("{} element has no source", element.kind),
            ))),
            Some(src) if check_assets && !Path::new(src).is_absolute() && !assets.exists(src) => {
                diags.push(tag(Diagnostic::warning(
                    DiagnosticCode::MissingAsset,
                    format!("asset '{src}' not found"),
                )))
            }
            Some(_) => {}
        }
    }
}
