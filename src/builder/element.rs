//! Per-element property resolution.

use crate::error::Error;
use crate::layout::{resolve_alignment, Flow, GridRect, HAlign, Padding, VAlign};
use crate::model::{
    Diagnostic, DiagnosticCode, Element, ElementKind, FigureContent, FitMode, Length, Payload,
    PdfContent, RectangleContent, ResolvedStyle, ScaleMode, Severity, SvgContent, TextContent,
    TocContent, DEFAULT_RECT_COLOR,
};
use crate::style::StyleTable;
use crate::tree::{parse_bool, Node, Properties};
use regex::Regex;
use std::sync::OnceLock;

/// Collects diagnostics tagged with the current page and element.
pub(crate) struct Reporter<'a> {
    page: Option<&'a str>,
    element: Option<&'a str>,
    out: &'a mut Vec<Diagnostic>,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(
        page: Option<&'a str>,
        element: Option<&'a str>,
        out: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self { page, element, out }
    }

    fn tag(&self, mut d: Diagnostic) -> Diagnostic {
        if let Some(page) = self.page {
            d = d.with_page(page);
        }
        if let Some(id) = self.element {
            d = d.with_element(id);
        }
        d
    }

    /// Record a diagnostic as is.
    pub(crate) fn push(&mut self, d: Diagnostic) {
        self.out.push(d);
    }

    pub(crate) fn warn(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        let d = self.tag(Diagnostic::warning(code, message));
        self.out.push(d);
    }

    pub(crate) fn report(&mut self, err: &Error, severity: Severity) {
        let d = self.tag(Diagnostic::from_error(err, severity));
        self.out.push(d);
    }
}

/// Read-only inputs shared by every element of one page or master.
pub(crate) struct ElementScope<'a> {
    pub styles: &'a StyleTable,
    pub font_override: Option<&'a str>,
    pub default_z: i32,
}

fn file_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\[file:(?P<path>[^\]]+)\]\]").unwrap())
}

/// Parse an optional enum-like property, warning on unknown tokens.
pub(crate) fn parse_token<T>(
    props: &Properties,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
    report: &mut Reporter<'_>,
) -> Option<T> {
    let raw = props.get_non_empty(key)?;
    let parsed = parse(raw);
    if parsed.is_none() {
        report.report(&Error::invalid_value(key, raw), Severity::Warning);
    }
    parsed
}

/// Parse a four-sided shorthand property (`PADDING`, `MARGINS`), warning
/// and ignoring it when malformed.
pub(crate) fn parse_sides(props: &Properties, key: &str, report: &mut Reporter<'_>) -> Option<Padding> {
    let raw = props.get_non_empty(key)?;
    match Padding::parse(raw) {
        Ok(p) => Some(p),
        Err(_) => {
            report.report(&Error::invalid_value(key, raw), Severity::Warning);
            None
        }
    }
}

/// Resolve one element from its node.
pub(crate) fn resolve_element(
    scope: &ElementScope<'_>,
    node: &Node,
    id: String,
    kind: ElementKind,
    area: GridRect,
    padding: Option<Padding>,
    report: &mut Reporter<'_>,
) -> Element {
    let props = &node.properties;

    let z = match props.get_i64("Z") {
        Ok(Some(z)) => match i32::try_from(z) {
            Ok(z) => z,
            Err(_) => {
                report.report(&Error::OutOfRange(format!("z-order {z}")), Severity::Warning);
                scope.default_z
            }
        },
        Ok(None) => scope.default_z,
        Err(e) => {
            report.report(&e, Severity::Warning);
            scope.default_z
        }
    };

    let align = parse_token(props, "ALIGN", HAlign::parse, report);
    let valign = parse_token(props, "VALIGN", VAlign::parse, report);
    let flow = parse_token(props, "FLOW", Flow::parse, report).unwrap_or_default();
    let (align, valign) = resolve_alignment(align, valign, flow, &kind);

    let justify = match props.get("JUSTIFY") {
        None => None,
        Some(raw) => Some(parse_bool(raw).unwrap_or_else(|| {
            report.report(&Error::invalid_value("JUSTIFY", raw), Severity::Warning);
            true
        })),
    };

    let style = resolve_style(scope, props, &kind, report);
    let payload = build_payload(node, &kind, style.as_ref(), report);

    Element {
        id,
        title: node.title.trim().to_string(),
        kind,
        area,
        z,
        padding,
        align,
        valign,
        flow,
        justify,
        style,
        payload,
    }
}

/// Style key: explicit `STYLE`, else the kind's built-in style for text.
fn resolve_style(
    scope: &ElementScope<'_>,
    props: &Properties,
    kind: &ElementKind,
    report: &mut Reporter<'_>,
) -> Option<ResolvedStyle> {
    let fallback = kind.is_text().then(|| kind.as_str());
    match props.get_non_empty("STYLE") {
        Some(key) => match scope.styles.resolve(key, scope.font_override) {
            Some(style) => Some(style),
            None => {
                report.warn(DiagnosticCode::UnknownStyle, format!("Unknown style '{key}'"));
                fallback.and_then(|k| scope.styles.resolve(k, scope.font_override))
            }
        },
        None => fallback.and_then(|k| scope.styles.resolve(k, scope.font_override)),
    }
}

fn build_payload(
    node: &Node,
    kind: &ElementKind,
    style: Option<&ResolvedStyle>,
    report: &mut Reporter<'_>,
) -> Payload {
    let props = &node.properties;
    match kind {
        ElementKind::Header | ElementKind::Subheader | ElementKind::Body => {
            Payload::Text(TextContent::from_lines(&node.content))
        }
        ElementKind::Figure => {
            let src = props.get_non_empty("SRC").map(str::to_string).or_else(|| {
                node.content.iter().find_map(|line| {
                    file_link_re()
                        .captures(line.trim())
                        .map(|c| c["path"].trim().to_string())
                })
            });
            Payload::Figure(FigureContent {
                src,
                caption: props.get_non_empty("CAPTION").map(str::to_string),
                fit: parse_token(props, "FIT", FitMode::parse, report).unwrap_or_default(),
            })
        }
        ElementKind::Pdf => {
            let page = match props.get_i64("PAGE") {
                Ok(Some(n)) => match u32::try_from(n) {
                    Ok(page) if page >= 1 => page,
                    _ => {
                        report.report(&Error::OutOfRange(format!("PDF page {n}")), Severity::Warning);
                        1
                    }
                },
                Ok(None) => 1,
                Err(e) => {
                    report.report(&e, Severity::Warning);
                    1
                }
            };
            match props.get_f64("SCALE") {
                Ok(Some(scale)) if (scale - 1.0).abs() > 1e-6 => report.warn(
                    DiagnosticCode::IgnoredOverride,
                    format!("SCALE {scale} is ignored; containment scaling is enforced"),
                ),
                Ok(_) => {}
                Err(e) => report.report(&e, Severity::Warning),
            }
            Payload::Pdf(PdfContent {
                src: props.get_non_empty("PDF").map(str::to_string),
                page,
                scale_mode: parse_token(props, "SCALE_MODE", ScaleMode::parse, report)
                    .unwrap_or_default(),
            })
        }
        ElementKind::Svg => Payload::Svg(SvgContent {
            src: props
                .get_non_empty("SVG")
                .or_else(|| props.get_non_empty("SRC"))
                .map(str::to_string),
        }),
        ElementKind::Rectangle => Payload::Rectangle(build_rectangle(props, style, report)),
        ElementKind::Toc => Payload::Toc(TocContent::default()),
        ElementKind::Unknown(_) => Payload::None,
    }
}

fn parse_length(props: &Properties, key: &str, label: &str, report: &mut Reporter<'_>) -> Option<Length> {
    let raw = props.get_non_empty(key)?;
    match raw.parse::<Length>() {
        Ok(len) => Some(len),
        Err(_) => {
            report.report(&Error::invalid_unit(label, raw), Severity::Error);
            None
        }
    }
}

/// Clamp alpha into [0, 1], warning when it was outside.
fn clamp_alpha(alpha: f64, report: &mut Reporter<'_>) -> f64 {
    if (0.0..=1.0).contains(&alpha) {
        return alpha;
    }
    let clamped = alpha.clamp(0.0, 1.0);
    report.report(
        &Error::OutOfRange(format!("alpha {alpha} clamped to {clamped}")),
        Severity::Warning,
    );
    clamped
}

fn build_rectangle(
    props: &Properties,
    style: Option<&ResolvedStyle>,
    report: &mut Reporter<'_>,
) -> RectangleContent {
    let shape = style.map(|s| &s.properties.shape);

    let color = props
        .get_non_empty("COLOR")
        .or_else(|| style.and_then(ResolvedStyle::color))
        .unwrap_or(DEFAULT_RECT_COLOR)
        .to_string();

    let alpha = match props.get_non_empty("ALPHA") {
        Some(raw) => match raw.parse::<f64>() {
            Ok(a) if a.is_finite() => clamp_alpha(a, report),
            _ => {
                report.report(&Error::invalid_value("ALPHA", raw), Severity::Error);
                1.0
            }
        },
        None => match shape.and_then(|s| s.alpha) {
            Some(a) => clamp_alpha(a, report),
            None => 1.0,
        },
    };

    let stroke = parse_length(props, "STROKE", "Stroke", report).or(shape.and_then(|s| s.stroke));
    let radius = parse_length(props, "RADIUS", "Radius", report).or(shape.and_then(|s| s.radius));
    let stroke_color = props
        .get_non_empty("STROKE_COLOR")
        .map(str::to_string)
        .or_else(|| shape.and_then(|s| s.stroke_color.clone()))
        .or_else(|| stroke.map(|_| color.clone()));

    RectangleContent {
        color,
        alpha,
        stroke,
        stroke_color,
        radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LengthUnit;

    fn scope(styles: &StyleTable) -> ElementScope<'_> {
        ElementScope {
            styles,
            font_override: None,
            default_z: 10,
        }
    }

    fn resolve(node: &Node, kind: ElementKind, styles: &StyleTable) -> (Element, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let el = {
            let mut report = Reporter::new(Some("p"), Some("e"), &mut diags);
            resolve_element(
                &scope(styles),
                node,
                "e".to_string(),
                kind,
                GridRect::cell(1, 1).unwrap(),
                None,
                &mut report,
            )
        };
        (el, diags)
    }

    #[test]
    fn test_alpha_clamped_with_single_warning() {
        let styles = StyleTable::new();
        let node = Node::new("Box").prop("ALPHA", "1.2");
        let (el, diags) = resolve(&node, ElementKind::Rectangle, &styles);
        assert_eq!(el.rectangle().unwrap().alpha, 1.0);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::OutOfRange);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].element.as_deref(), Some("e"));
    }

    #[test]
    fn test_uninterpretable_alpha_is_error() {
        let styles = StyleTable::new();
        let node = Node::new("Box").prop("ALPHA", "half");
        let (el, diags) = resolve(&node, ElementKind::Rectangle, &styles);
        assert_eq!(el.rectangle().unwrap().alpha, 1.0);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_error());
    }

    #[test]
    fn test_rectangle_from_style() {
        let mut styles = StyleTable::new();
        styles.declare("card", "color: #111, alpha: 0.4, stroke: 1pt, radius: 2mm");
        let node = Node::new("Card").prop("STYLE", "card");
        let (el, diags) = resolve(&node, ElementKind::Rectangle, &styles);
        let rect = el.rectangle().unwrap();
        assert!(diags.is_empty());
        assert_eq!(rect.color, "#111");
        assert_eq!(rect.alpha, 0.4);
        assert_eq!(rect.stroke_color.as_deref(), Some("#111"));
        assert_eq!(rect.radius.map(|r| r.unit), Some(LengthUnit::Mm));
    }

    #[test]
    fn test_stroke_without_unit_is_dropped() {
        let styles = StyleTable::new();
        let node = Node::new("Box").prop("STROKE", "2").prop("COLOR", "#f00");
        let (el, diags) = resolve(&node, ElementKind::Rectangle, &styles);
        let rect = el.rectangle().unwrap();
        assert!(rect.stroke.is_none());
        assert!(rect.stroke_color.is_none());
        assert_eq!(diags[0].code, DiagnosticCode::InvalidUnit);
        assert!(diags[0].is_error());
    }

    #[test]
    fn test_text_gets_builtin_style() {
        let styles = StyleTable::new();
        let node = Node::new("Title").line("Hello").prop("FLOW", "bottom-up");
        let (el, diags) = resolve(&node, ElementKind::Header, &styles);
        assert!(diags.is_empty());
        assert_eq!(el.style.as_ref().map(|s| s.name.as_str()), Some("header"));
        assert_eq!(el.valign, Some(VAlign::Bottom));
        assert_eq!(el.z, 10);
    }

    #[test]
    fn test_unknown_style_falls_back() {
        let styles = StyleTable::new();
        let node = Node::new("T").prop("STYLE", "fancy");
        let (el, diags) = resolve(&node, ElementKind::Body, &styles);
        assert_eq!(el.style.unwrap().name, "body");
        assert_eq!(diags[0].code, DiagnosticCode::UnknownStyle);
    }

    #[test]
    fn test_figure_source_from_link() {
        let styles = StyleTable::new();
        let node = Node::new("Photo")
            .line("Some intro")
            .line("[[file:img/cat.png]]")
            .prop("FIT", "fill")
            .prop("CAPTION", "A cat");
        let (el, _) = resolve(&node, ElementKind::Figure, &styles);
        match el.payload {
            Payload::Figure(fig) => {
                assert_eq!(fig.src.as_deref(), Some("img/cat.png"));
                assert_eq!(fig.fit, FitMode::Cover);
                assert_eq!(fig.caption.as_deref(), Some("A cat"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(el.align, Some(HAlign::Left));
    }

    #[test]
    fn test_pdf_scale_ignored() {
        let styles = StyleTable::new();
        let node = Node::new("Doc")
            .prop("PDF", "a.pdf")
            .prop("PAGE", "3")
            .prop("SCALE", "0.5")
            .prop("SCALE_MODE", "cover");
        let (el, diags) = resolve(&node, ElementKind::Pdf, &styles);
        match el.payload {
            Payload::Pdf(pdf) => {
                assert_eq!(pdf.page, 3);
                assert_eq!(pdf.scale_mode, ScaleMode::Cover);
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::IgnoredOverride);
    }

    #[test]
    fn test_pdf_page_out_of_range() {
        let styles = StyleTable::new();
        for raw in ["0", "-2", "4294967296"] {
            let node = Node::new("Doc").prop("PDF", "a.pdf").prop("PAGE", raw);
            let (el, diags) = resolve(&node, ElementKind::Pdf, &styles);
            match el.payload {
                Payload::Pdf(pdf) => assert_eq!(pdf.page, 1),
                other => panic!("unexpected payload {other:?}"),
            }
            assert_eq!(diags.len(), 1, "PAGE {raw}");
            assert_eq!(diags[0].code, DiagnosticCode::OutOfRange);
        }
    }

    #[test]
    fn test_invalid_tokens_warn() {
        let styles = StyleTable::new();
        let node = Node::new("T")
            .prop("ALIGN", "middle")
            .prop("Z", "high")
            .prop("JUSTIFY", "maybe");
        let (el, diags) = resolve(&node, ElementKind::Body, &styles);
        assert_eq!(el.align, None);
        assert_eq!(el.z, 10);
        assert_eq!(el.justify, Some(true));
        assert_eq!(diags.len(), 3);
        assert!(diags.iter().all(|d| d.code == DiagnosticCode::InvalidValue));
    }
}
