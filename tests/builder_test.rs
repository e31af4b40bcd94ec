//! Integration tests for document building.

use pageir::model::{Length, LengthUnit, RectangleContent, TextContent};
use pageir::{
    build, build_with_options, AssetProbe, BuildOptions, DiagnosticCode, DocumentBuilder,
    ElementKind, Flow, GridRect, KnownFonts, Node, Origin, Padding, Payload, Severity, SourceTree,
    VAlign,
};

fn section(title: &str, kind: &str, area: &str) -> Node {
    Node::new(title).prop("TYPE", kind).prop("AREA", area)
}

fn rectangle(output: &pageir::BuildOutput, page: usize, index: usize) -> RectangleContent {
    match &output.document.pages[page].elements[index].payload {
        Payload::Rectangle(r) => r.clone(),
        other => panic!("expected rectangle payload, got {other:?}"),
    }
}

struct NoFiles;

impl AssetProbe for NoFiles {
    fn exists(&self, _path: &str) -> bool {
        false
    }

    fn probe_size(&self, path: &str) -> pageir::Result<(f64, f64)> {
        Err(pageir::Error::AssetProbe(path.to_string()))
    }
}

#[test]
fn test_alpha_above_one_clamps_with_single_warning() {
    let tree = SourceTree::new().with_page(
        Node::new("Slide").child(section("Box", "rectangle", "A1").prop("ALPHA", "1.2")),
    );
    let output = build(&tree);

    assert_eq!(rectangle(&output, 0, 0).alpha, 1.0);
    assert_eq!(output.diagnostics.len(), 1);
    let d = output.diagnostics.iter().next().unwrap();
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!(d.code, DiagnosticCode::OutOfRange);
    assert_eq!(d.element.as_deref(), Some("box"));
}

#[test]
fn test_uninterpretable_alpha_is_error() {
    let tree = SourceTree::new().with_page(
        Node::new("Slide").child(section("Box", "rectangle", "A1").prop("ALPHA", "opaque")),
    );
    let output = build(&tree);

    assert_eq!(rectangle(&output, 0, 0).alpha, 1.0);
    assert!(output.has_errors());
    assert_eq!(
        output.diagnostics.errors().next().map(|d| d.code),
        Some(DiagnosticCode::InvalidValue)
    );
}

#[test]
fn test_ignored_page_removes_subtree() {
    let tree = SourceTree::new()
        .with_page(
            Node::new("Draft").prop("IGNORE", "true").child(
                section("Group", "none", "A1,B2")
                    .child(section("Title", "header", "A1"))
                    .child(section("Body", "body", "B1")),
            ),
        )
        .with_page(Node::new("Final").child(section("Title", "header", "A1")));

    let output = build(&tree);
    assert_eq!(output.document.pages.len(), 1);
    assert_eq!(output.document.pages[0].id, "final");
    assert_eq!(output.document.element_count(), 1);
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_build_is_idempotent() {
    let tree = SourceTree::new()
        .with_meta("STYLE_NOTE", "font: Lora, weight: 450, bogus: 1")
        .with_meta("DEFAULT_MASTER", "base")
        .with_page(
            Node::new("Base")
                .prop("MASTER_DEF", "base")
                .child(section("Band", "rectangle", "A1,A12").prop("Z", "-1")),
        )
        .with_page(
            Node::new("One")
                .child(section("Note", "body", "B1").prop("STYLE", "note"))
                .child(section("Wide", "body", "A1,A40"))
                .child(section("Box", "rectangle", "C1").prop("ALPHA", "-3")),
        );

    let builder = DocumentBuilder::new(BuildOptions::default())
        .with_fonts(KnownFonts::new(["Inter"]))
        .with_assets(NoFiles);
    let first = builder.build(&tree);
    let second = builder.build(&tree);

    assert_eq!(first, second);
    assert!(!first.diagnostics.is_empty());
}

#[test]
fn test_master_elements_merge_before_page_at_equal_z() {
    let tree = SourceTree::new()
        .with_page(
            Node::new("Base")
                .prop("MASTER_DEF", "base")
                .child(section("M low", "rectangle", "A1").prop("Z", "-1"))
                .child(section("M mid", "rectangle", "A2").prop("Z", "5")),
        )
        .with_page(
            Node::new("Page")
                .prop("MASTER", "base")
                .child(section("P low", "rectangle", "B1").prop("Z", "-1"))
                .child(section("P high", "rectangle", "B2").prop("Z", "10")),
        );
    let output = build(&tree);
    let doc = &output.document;
    let page = &doc.pages[0];

    let merged: Vec<(&str, Origin)> = doc
        .masters
        .merge(page.master.as_deref(), &page.elements)
        .iter()
        .map(|l| (l.element.id.as_str(), l.origin))
        .collect();
    assert_eq!(
        merged,
        vec![
            ("m-low", Origin::Master),
            ("p-low", Origin::Page),
            ("m-mid", Origin::Master),
            ("p-high", Origin::Page),
        ]
    );
}

#[test]
fn test_master_redefinition_is_visible_to_all_pages() {
    let tree = SourceTree::new()
        .with_meta("DEFAULT_MASTER", "base")
        .with_page(
            Node::new("Old")
                .prop("MASTER_DEF", "base")
                .child(section("Old logo", "rectangle", "A1")),
        )
        .with_page(Node::new("Page"))
        .with_page(
            Node::new("New")
                .prop("MASTER_DEF", "base")
                .child(section("New logo", "rectangle", "A1")),
        );
    let output = build(&tree);
    let doc = &output.document;

    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.masters.len(), 1);
    let merged = doc.masters.merge(doc.pages[0].master.as_deref(), &doc.pages[0].elements);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].element.id, "new-logo");
}

#[test]
fn test_type_none_contributes_no_element_but_walks_children() {
    let tree = SourceTree::new().with_page(
        Node::new("Page").child(
            Node::new("Layout")
                .prop("AREA", "B2,D6")
                .child(Node::new("Caption").prop("TYPE", "body").line("Hello"))
                .child(Node::new("Nested").child(Node::new("Deep").prop("TYPE", "subheader"))),
        ),
    );
    let output = build(&tree);
    let elements = &output.document.pages[0].elements;

    let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["caption", "deep"]);
    for element in elements {
        assert_eq!(element.area, GridRect::new(2, 2, 5, 3).unwrap());
    }
    match &elements[0].payload {
        Payload::Text(text) => assert_eq!(text, &TextContent::from_lines(&["Hello".to_string()])),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn test_zero_padding_total_is_explicit() {
    let tree = SourceTree::new().with_meta("PADDING", "5").with_page(
        Node::new("Page")
            .child(section("Flat", "body", "A1").prop("PADDING", "-5"))
            .child(section("Plain", "body", "A2")),
    );
    let output = build(&tree);
    let elements = &output.document.pages[0].elements;

    assert_eq!(elements[0].padding, Some(Padding::zero()));
    assert!(elements[0].has_explicit_padding());
    assert_eq!(elements[1].padding, Some(Padding::uniform(5.0)));

    let bare = build(&SourceTree::new().with_page(Node::new("P").child(section("T", "body", "A1"))));
    assert!(!bare.document.pages[0].elements[0].has_explicit_padding());
}

#[test]
fn test_page_padding_joins_cascade() {
    let tree = SourceTree::new().with_page(
        Node::new("Page")
            .prop("PADDING", "1 2")
            .child(section("Text", "body", "A1").prop("PADDING", "3")),
    );
    let output = build(&tree);
    assert_eq!(
        output.document.pages[0].elements[0].padding,
        Some(Padding::new(4.0, 5.0, 4.0, 5.0))
    );
}

#[test]
fn test_flow_implies_valign_for_text_only() {
    let tree = SourceTree::new().with_page(
        Node::new("Page")
            .child(section("Up", "body", "A1").prop("FLOW", "bottom-up"))
            .child(
                section("Pinned", "body", "A2")
                    .prop("FLOW", "bottom-up")
                    .prop("VALIGN", "top"),
            )
            .child(section("Shape", "rectangle", "A3").prop("FLOW", "center-out")),
    );
    let output = build(&tree);
    let els = &output.document.pages[0].elements;

    assert_eq!(els[0].flow, Flow::BottomUp);
    assert_eq!(els[0].valign, Some(VAlign::Bottom));
    assert_eq!(els[1].valign, Some(VAlign::Top));
    assert_eq!(els[2].valign, None);
}

#[test]
fn test_style_cascade_and_font_override() {
    let tree = SourceTree::new()
        .with_meta("FONT", "Lora")
        .with_meta("STYLE_HEADER", "size: 30pt")
        .with_meta("STYLE_QUOTE", "color: rgb(10, 20, 30), justify: yes")
        .with_page(
            Node::new("Page")
                .child(section("Title", "header", "A1"))
                .child(section("Quote", "body", "A2").prop("STYLE", "Quote"))
                .child(section("Other", "body", "A3").prop("STYLE", "missing")),
        );
    let output = build_with_options(&tree, &BuildOptions::default().offline());
    let els = &output.document.pages[0].elements;

    let header = els[0].style.as_ref().unwrap();
    assert_eq!(header.properties.size.as_deref(), Some("30pt"));
    assert_eq!(header.properties.weight.as_deref(), Some("bold"));
    assert_eq!(header.font(), Some("Lora"));

    let quote = els[1].style.as_ref().unwrap();
    assert_eq!(quote.font(), Some("Lora"));
    assert_eq!(quote.color(), Some("rgb(10, 20, 30)"));
    assert_eq!(quote.properties.paragraph.justify, Some(true));

    assert_eq!(els[2].style.as_ref().map(|s| s.name.as_str()), Some("body"));
    let unknown: Vec<_> = output.diagnostics.with_code(DiagnosticCode::UnknownStyle).collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].element.as_deref(), Some("other"));
}

#[test]
fn test_missing_fonts_are_warnings() {
    let tree = SourceTree::new()
        .with_meta("STYLE_NOTE", "font: Papyrus")
        .with_page(Node::new("Page"));
    let output = DocumentBuilder::new(BuildOptions::default())
        .with_fonts(KnownFonts::new(["Inter"]))
        .build(&tree);

    let missing: Vec<_> = output.diagnostics.with_code(DiagnosticCode::MissingFont).collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("Papyrus"));
    assert!(!output.has_errors());
}

#[test]
fn test_rectangle_payload_from_style() {
    let tree = SourceTree::new()
        .with_meta("STYLE_CARD", "color: #222, alpha: 0.4, stroke: 2pt, radius: 3mm")
        .with_page(
            Node::new("Page")
                .child(section("Card", "rectangle", "A1").prop("STYLE", "card"))
                .child(
                    section("Bad", "rectangle", "A2")
                        .prop("STROKE", "2")
                        .prop("STROKE_COLOR", "red"),
                ),
        );
    let output = build(&tree);

    let card = rectangle(&output, 0, 0);
    assert_eq!(card.color, "#222");
    assert_eq!(card.alpha, 0.4);
    assert_eq!(
        card.stroke,
        Some(Length {
            value: 2.0,
            unit: LengthUnit::Pt
        })
    );
    assert_eq!(card.stroke_color.as_deref(), Some("#222"));

    let bad = rectangle(&output, 0, 1);
    assert_eq!(bad.stroke, None);
    assert_eq!(bad.stroke_color.as_deref(), Some("red"));
    let units: Vec<_> = output.diagnostics.with_code(DiagnosticCode::InvalidUnit).collect();
    assert_eq!(units.len(), 1);
    assert!(units[0].is_error());
}

#[test]
fn test_assets_and_payloads() {
    let tree = SourceTree::new().with_page(
        Node::new("Page")
            .child(
                Node::new("Photo")
                    .prop("TYPE", "figure")
                    .prop("AREA", "A1")
                    .prop("FIT", "fill")
                    .line("[[file:img/photo.png]]"),
            )
            .child(
                section("Deck", "pdf", "A2")
                    .prop("PDF", "deck.pdf")
                    .prop("PAGE", "3")
                    .prop("SCALE", "2"),
            )
            .child(section("Icon", "svg", "A3")),
    );
    let output = DocumentBuilder::default().with_assets(NoFiles).build(&tree);
    let els = &output.document.pages[0].elements;

    assert_eq!(els[0].asset_src(), Some("img/photo.png"));
    match &els[1].payload {
        Payload::Pdf(pdf) => assert_eq!(pdf.page, 3),
        other => panic!("unexpected payload {other:?}"),
    }

    let codes: Vec<DiagnosticCode> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            DiagnosticCode::IgnoredOverride,
            DiagnosticCode::MissingAsset,
            DiagnosticCode::MissingAsset,
            DiagnosticCode::MissingSource,
        ]
    );
    assert!(!output.blocking(false).any(|d| d.code == DiagnosticCode::MissingAsset));
    assert_eq!(output.blocking(true).count(), 3);
}

#[test]
fn test_unknown_type_is_retained_and_flagged() {
    let tree = SourceTree::new()
        .with_page(Node::new("Page").child(section("Chart", "chart", "A1")));
    let output = build(&tree);

    assert_eq!(
        output.document.pages[0].elements[0].kind,
        ElementKind::Unknown("chart".into())
    );
    let d: Vec<_> = output.diagnostics.with_code(DiagnosticCode::UnknownType).collect();
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].severity, Severity::Warning);
}

#[test]
fn test_area_outside_grid_is_error() {
    let tree = SourceTree::new()
        .with_meta("GRID", "6x6")
        .with_page(Node::new("Page").child(section("Wide", "body", "A1,A7")));
    let output = build(&tree);
    let err = output.into_result().unwrap_err();
    assert_eq!(err.code, DiagnosticCode::OutOfRange);
}

#[test]
fn test_overflowing_area_is_reported() {
    let tree = SourceTree::new().with_meta("GRID", "6x6").with_page(
        Node::new("Page").child(section("Far", "body", "4294967295,1,2,1")),
    );
    let output = build(&tree);

    let codes: Vec<_> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![DiagnosticCode::InvalidArea]);
    assert_eq!(
        output.document.pages[0].elements[0].area,
        GridRect::new(1, 1, 6, 1).unwrap()
    );
}

#[test]
fn test_oversized_grid_falls_back() {
    let tree = SourceTree::new()
        .with_meta("GRID", "4294967295x1")
        .with_meta("MARGINS", "5")
        .with_page(
            Node::new("Page")
                .prop("GRID", "2000x2")
                .child(section("Edge", "body", "A1")),
        );
    let output = build(&tree);

    let invalid = output
        .diagnostics
        .with_code(DiagnosticCode::InvalidValue)
        .count();
    assert_eq!(invalid, 2);
    assert_eq!(output.document.grid, BuildOptions::default().grid);
    assert_eq!(output.document.pages[0].geometry.grid, BuildOptions::default().grid);
    assert!(!output.has_errors());
}

#[test]
fn test_margins_extend_addressable_grid() {
    let tree = SourceTree::new()
        .with_meta("GRID", "6x6")
        .with_meta("MARGINS", "10")
        .with_page(Node::new("Page").child(section("Edge", "body", "H1,H8")));
    assert!(build(&tree).into_result().is_ok());
}

#[test]
fn test_json_tree_input() {
    let json = r#"{
        "meta": {"pagesize": "a5", "orientation": "portrait", "grid": "2x2"},
        "pages": [{
            "title": "Cover",
            "properties": {"id": "cover", "toc_ignore": "true"},
            "children": [
                {"title": "Contents", "properties": {"type": "toc", "area": "A1,B2"}}
            ]
        }, {
            "title": "Chapter"
        }]
    }"#;
    let tree = SourceTree::from_json(json).unwrap();
    let output = build(&tree);
    let doc = &output.document;

    assert_eq!(doc.dimensions(), (148.0, 210.0));
    assert_eq!(doc.pages[0].id, "cover");
    match &doc.pages[0].elements[0].payload {
        Payload::Toc(toc) => {
            assert_eq!(toc.entries.len(), 1);
            assert_eq!(toc.entries[0].title, "Chapter");
            assert_eq!(toc.entries[0].page, 2);
        }
        other => panic!("unexpected payload {other:?}"),
    }
}
