//! Per-page render contexts and JSON output.
//!
//! A render context is the transient, merged view of one renderable page:
//! master and page elements in paint order, each placed in physical page
//! space. Contexts borrow from the [`Document`] and are never stored in it.

mod json;

pub use json::{to_json, to_json_value, JsonFormat};

use crate::assets::AssetProbe;
use crate::layout::{GridGeometry, Padding, PhysicalRect, TrackLayout};
use crate::master::{Layered, Origin};
use crate::model::{Document, Element, Page, Payload, ScaleMode};
use serde::Serialize;

/// Merged, placed view of one renderable page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPage<'a> {
    /// The page being rendered
    #[serde(skip)]
    pub page: &'a Page,

    /// Page identifier
    pub id: &'a str,

    /// 1-based position among renderable pages
    pub number: u32,

    /// Applied master, when registered
    pub master: Option<&'a str>,

    /// Elements in paint order
    pub elements: Vec<RenderElement<'a>>,
}

/// One placed element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderElement<'a> {
    /// The element
    pub element: &'a Element,

    /// Where it came from
    pub origin: Origin,

    /// Physical frame in mm
    pub frame: PhysicalRect,

    /// Frame reduced by the element's padding
    pub content_box: PhysicalRect,

    /// Containment scale for embedded PDF pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// Build the render context of every renderable page.
///
/// `assets` is asked for the intrinsic size of embedded PDFs; a failed
/// probe falls back to a scale of 1.0.
pub fn render_pages<'a>(doc: &'a Document, assets: &dyn AssetProbe) -> Vec<RenderPage<'a>> {
    doc.pages
        .iter()
        .enumerate()
        .map(|(i, page)| render_page(doc, page, i as u32 + 1, assets))
        .collect()
}

/// Build the render context of a single page.
pub fn render_page<'a>(
    doc: &'a Document,
    page: &'a Page,
    number: u32,
    assets: &dyn AssetProbe,
) -> RenderPage<'a> {
    let master = page
        .master
        .as_deref()
        .filter(|name| doc.masters.contains(name));
    let tracks = page.geometry.tracks();
    let elements = doc
        .masters
        .merge(master, &page.elements)
        .into_iter()
        .map(|layer| place(layer, &page.geometry, &tracks, assets))
        .collect();

    RenderPage {
        page,
        id: &page.id,
        number,
        master,
        elements,
    }
}

fn place<'a>(
    layer: Layered<'a>,
    geometry: &GridGeometry,
    tracks: &TrackLayout,
    assets: &dyn AssetProbe,
) -> RenderElement<'a> {
    let element = layer.element;
    let frame = tracks.physical_rect(&element.area);
    let content_box = frame.inset(&element.padding.unwrap_or_default());
    if !geometry.contains(&element.area) {
        log::debug!("element '{}' extends past the page grid", element.id);
    }

    let scale = match &element.payload {
        Payload::Pdf(pdf) => Some(pdf_scale(pdf.src.as_deref(), pdf.scale_mode, &content_box, assets)),
        _ => None,
    };

    RenderElement {
        element,
        origin: layer.origin,
        frame,
        content_box,
        scale,
    }
}

fn pdf_scale(src: Option<&str>, mode: ScaleMode, frame: &PhysicalRect, assets: &dyn AssetProbe) -> f64 {
    let Some(src) = src else {
        return 1.0;
    };
    match assets.probe_size(src) {
        Ok(intrinsic) => containment_scale(frame, intrinsic, mode),
        Err(e) => {
            log::warn!("cannot measure '{}': {}", src, e);
            1.0
        }
    }
}

/// Scale that fits an `(width, height)` intrinsic size into `frame`.
///
/// `Contain` keeps the whole page visible, `Cover` fills the frame and may
/// crop. Degenerate sizes give 1.0.
pub fn containment_scale(frame: &PhysicalRect, intrinsic: (f64, f64), mode: ScaleMode) -> f64 {
    let (iw, ih) = intrinsic;
    if iw <= 0.0 || ih <= 0.0 || !iw.is_finite() || !ih.is_finite() {
        return 1.0;
    }
    let sx = frame.width / iw;
    let sy = frame.height / ih;
    let scale = match mode {
        ScaleMode::Contain => sx.min(sy),
        ScaleMode::Cover => sx.max(sy),
    };
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

impl RenderPage<'_> {
    /// Element ids in paint order.
    pub fn paint_order(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.element.id.as_str()).collect()
    }
}

impl RenderElement<'_> {
    /// Padding actually applied to the content box.
    pub fn padding(&self) -> Padding {
        self.element.padding.unwrap_or_default()
    }
}
