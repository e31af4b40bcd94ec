//! Page and element types.

use super::{Length, ResolvedStyle};
use crate::layout::{Flow, GridGeometry, GridRect, HAlign, Padding, VAlign};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A renderable page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Identifier, unique across the document
    pub id: String,

    /// Headline text
    pub title: String,

    /// Master applied to this page (explicit or the document default)
    pub master: Option<String>,

    /// Page size, content grid and margins
    pub geometry: GridGeometry,

    /// Excluded from tables of contents
    #[serde(default)]
    pub toc_ignore: bool,

    /// Elements in declaration order
    pub elements: Vec<Element>,
}

impl Page {
    /// Create an empty page.
    pub fn new(id: impl Into<String>, title: impl Into<String>, geometry: GridGeometry) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            master: None,
            geometry,
            toc_ignore: false,
            elements: Vec::new(),
        }
    }

    /// Add an element.
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Find an element by id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Check if the page has no elements of its own.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Element kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Page heading
    Header,
    /// Secondary heading
    Subheader,
    /// Body text
    Body,
    /// Raster image
    Figure,
    /// Embedded PDF page
    Pdf,
    /// Embedded SVG
    Svg,
    /// Filled rectangle
    Rectangle,
    /// Table of contents
    Toc,
    /// Unrecognized type, kept for downstream tooling
    Unknown(String),
}

impl ElementKind {
    /// Parse a `TYPE` value. Returns `None` for an absent/`none` type, which
    /// means the node contributes no element.
    pub fn parse(raw: &str) -> Option<Self> {
        let kind = match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => return None,
            "header" => ElementKind::Header,
            "subheader" => ElementKind::Subheader,
            "body" => ElementKind::Body,
            "figure" => ElementKind::Figure,
            "pdf" => ElementKind::Pdf,
            "svg" => ElementKind::Svg,
            "rectangle" => ElementKind::Rectangle,
            "toc" => ElementKind::Toc,
            other => ElementKind::Unknown(other.to_string()),
        };
        Some(kind)
    }

    /// Type name as written in markup.
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Header => "header",
            ElementKind::Subheader => "subheader",
            ElementKind::Body => "body",
            ElementKind::Figure => "figure",
            ElementKind::Pdf => "pdf",
            ElementKind::Svg => "svg",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Toc => "toc",
            ElementKind::Unknown(name) => name,
        }
    }

    /// Text kinds carry text content and a typography style.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ElementKind::Header | ElementKind::Subheader | ElementKind::Body
        )
    }

    /// Kinds whose content can be anchored vertically by `FLOW`.
    pub fn is_flowable(&self) -> bool {
        self.is_text() || matches!(self, ElementKind::Toc)
    }

    /// Kinds that reference an external asset.
    pub fn is_asset(&self) -> bool {
        matches!(self, ElementKind::Figure | ElementKind::Pdf | ElementKind::Svg)
    }

    /// Whether the kind is one of the recognized types.
    pub fn is_known(&self) -> bool {
        !matches!(self, ElementKind::Unknown(_))
    }

    /// Horizontal alignment used when the element sets none.
    pub fn default_align(&self) -> Option<HAlign> {
        if self.is_asset() {
            Some(HAlign::Left)
        } else {
            None
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Identifier, unique across the document
    pub id: String,

    /// Headline text
    pub title: String,

    /// Element kind
    pub kind: ElementKind,

    /// Rectangle in total-grid space
    pub area: GridRect,

    /// Stacking order (lower paints first)
    pub z: i32,

    /// Accumulated padding in mm; `None` when no level declared any
    pub padding: Option<Padding>,

    /// Horizontal alignment
    pub align: Option<HAlign>,

    /// Vertical alignment
    pub valign: Option<VAlign>,

    /// Content flow
    pub flow: Flow,

    /// Element-level justify override
    pub justify: Option<bool>,

    /// Effective style
    pub style: Option<ResolvedStyle>,

    /// Kind-specific payload
    pub payload: Payload,
}

impl Element {
    /// Create an element with defaults for everything but identity and area.
    pub fn new(id: impl Into<String>, kind: ElementKind, area: GridRect) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            kind,
            area,
            z: 10,
            padding: None,
            align: None,
            valign: None,
            flow: Flow::Normal,
            justify: None,
            style: None,
            payload: Payload::None,
        }
    }

    /// Set the z-order.
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Whether generation must use a padding-aware placement.
    pub fn has_explicit_padding(&self) -> bool {
        self.padding.is_some()
    }

    /// Source path of an asset element.
    pub fn asset_src(&self) -> Option<&str> {
        match &self.payload {
            Payload::Figure(f) => f.src.as_deref(),
            Payload::Pdf(p) => p.src.as_deref(),
            Payload::Svg(s) => s.src.as_deref(),
            _ => None,
        }
    }

    /// Rectangle payload, if any.
    pub fn rectangle(&self) -> Option<&RectangleContent> {
        match &self.payload {
            Payload::Rectangle(r) => Some(r),
            _ => None,
        }
    }
}

/// Kind-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// No payload (unknown kinds)
    None,
    /// Text content
    Text(TextContent),
    /// Raster image
    Figure(FigureContent),
    /// Embedded PDF page
    Pdf(PdfContent),
    /// Embedded SVG
    Svg(SvgContent),
    /// Filled rectangle
    Rectangle(RectangleContent),
    /// Table of contents
    Toc(TocContent),
}

/// Text of a header, subheader or body element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// Body lines joined and trimmed
    pub content: String,
    /// Paragraphs split on blank lines and `---` / `:::` separators
    pub paragraphs: Vec<String>,
}

impl TextContent {
    /// Build text content from body lines.
    pub fn from_lines(lines: &[String]) -> Self {
        let content = lines.join("\n").trim().to_string();
        let mut paragraphs = Vec::new();
        let mut buf: Vec<&str> = Vec::new();

        let mut flush = |buf: &mut Vec<&str>| {
            let para = buf.join("\n").trim().to_string();
            if !para.is_empty() {
                paragraphs.push(para);
            }
            buf.clear();
        };

        // Empty entries are breaks; `str::lines` yields nothing for them.
        let split = lines
            .iter()
            .flat_map(|l| l.split('\n'))
            .map(|l| l.strip_suffix('\r').unwrap_or(l));
        for line in split {
            let stripped = line.trim();
            if stripped.is_empty() || stripped == "---" || stripped == ":::" {
                flush(&mut buf);
            } else {
                buf.push(line);
            }
        }
        flush(&mut buf);

        Self {
            content,
            paragraphs,
        }
    }

    /// Check if there is no text.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// How an image fills its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Scale to fit entirely inside the frame
    #[default]
    Contain,
    /// Scale to cover the frame, cropping overflow
    Cover,
    /// Distort to the frame's aspect ratio
    Stretch,
}

impl FitMode {
    /// Parse a fit token (`fill` is an alias of `cover`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "contain" => Some(FitMode::Contain),
            "cover" | "fill" => Some(FitMode::Cover),
            "stretch" => Some(FitMode::Stretch),
            _ => None,
        }
    }
}

/// Raster image payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigureContent {
    /// Image path
    pub src: Option<String>,
    /// Caption text
    pub caption: Option<String>,
    /// Fit mode
    pub fit: FitMode,
}

/// Scaling strategy for embedded PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Largest scale that fits inside the frame
    #[default]
    Contain,
    /// Smallest scale that covers the frame (may crop)
    Cover,
}

impl ScaleMode {
    /// Parse a scale-mode token.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "contain" => Some(ScaleMode::Contain),
            "cover" => Some(ScaleMode::Cover),
            _ => None,
        }
    }
}

/// Embedded PDF payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfContent {
    /// PDF path
    pub src: Option<String>,
    /// 1-based page number to embed
    pub page: u32,
    /// Scaling strategy
    pub scale_mode: ScaleMode,
}

impl Default for PdfContent {
    fn default() -> Self {
        Self {
            src: None,
            page: 1,
            scale_mode: ScaleMode::Contain,
        }
    }
}

/// Embedded SVG payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SvgContent {
    /// SVG path
    pub src: Option<String>,
}

/// Default rectangle fill.
pub const DEFAULT_RECT_COLOR: &str = "#3498db";

/// Filled rectangle payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleContent {
    /// Fill colour
    pub color: String,
    /// Fill opacity in [0.0, 1.0]
    pub alpha: f64,
    /// Stroke width
    pub stroke: Option<Length>,
    /// Stroke colour (defaults to the fill when a stroke is set)
    pub stroke_color: Option<String>,
    /// Corner radius
    pub radius: Option<Length>,
}

impl Default for RectangleContent {
    fn default() -> Self {
        Self {
            color: DEFAULT_RECT_COLOR.to_string(),
            alpha: 1.0,
            stroke: None,
            stroke_color: None,
            radius: None,
        }
    }
}

/// Table of contents payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TocContent {
    /// One entry per listed page
    pub entries: Vec<TocEntry>,
}

/// A table of contents line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Page title
    pub title: String,
    /// 1-based position among renderable pages
    pub page: u32,
}
