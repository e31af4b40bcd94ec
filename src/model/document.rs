//! Document-level types.

use super::Page;
use crate::layout::{GridDims, GridGeometry, Margins, Padding};
use crate::master::MasterRegistry;
use crate::style::StyleTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Paper size
    pub page_size: PageSize,

    /// Page orientation
    pub orientation: Orientation,

    /// Content grid
    pub grid: GridDims,

    /// Document margins, when declared
    pub margins: Option<Margins>,

    /// Master applied to pages that name none
    pub default_master: Option<String>,

    /// Global font override
    pub font: Option<String>,

    /// Document-level padding contribution
    pub padding: Option<Padding>,

    /// Built-in and declared styles
    pub styles: StyleTable,

    /// Renderable pages in declaration order
    pub pages: Vec<Page>,

    /// Master definitions
    pub masters: MasterRegistry,
}

impl Document {
    /// Create an empty document with the given paper.
    pub fn new(page_size: PageSize, orientation: Orientation, grid: GridDims) -> Self {
        Self {
            page_size,
            orientation,
            grid,
            margins: None,
            default_master: None,
            font: None,
            padding: None,
            styles: StyleTable::new(),
            pages: Vec::new(),
            masters: MasterRegistry::new(),
        }
    }

    /// Physical page width and height in mm after orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        self.page_size.oriented(self.orientation)
    }

    /// Geometry for a page using the document defaults.
    pub fn geometry(&self) -> GridGeometry {
        let (w, h) = self.dimensions();
        GridGeometry::new(w, h, self.grid, self.margins)
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Find a page by id.
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total element count across renderable pages (masters excluded).
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(PageSize::A4, Orientation::default(), GridDims::default())
    }
}

/// Paper size in portrait millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Short width in mm
    pub width_mm: f64,
    /// Long height in mm
    pub height_mm: f64,
}

impl PageSize {
    /// ISO A1
    pub const A1: PageSize = PageSize::new(594.0, 841.0);
    /// ISO A2
    pub const A2: PageSize = PageSize::new(420.0, 594.0);
    /// ISO A3
    pub const A3: PageSize = PageSize::new(297.0, 420.0);
    /// ISO A4
    pub const A4: PageSize = PageSize::new(210.0, 297.0);
    /// ISO A5
    pub const A5: PageSize = PageSize::new(148.0, 210.0);
    /// US Letter
    pub const LETTER: PageSize = PageSize::new(215.9, 279.4);
    /// US Legal
    pub const LEGAL: PageSize = PageSize::new(215.9, 355.6);

    /// Create a page size.
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Look up a named paper size (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "A1" => Some(Self::A1),
            "A2" => Some(Self::A2),
            "A3" => Some(Self::A3),
            "A4" => Some(Self::A4),
            "A5" => Some(Self::A5),
            "LETTER" => Some(Self::LETTER),
            "LEGAL" => Some(Self::LEGAL),
            _ => None,
        }
    }

    /// `(width, height)` after applying the orientation.
    pub fn oriented(&self, orientation: Orientation) -> (f64, f64) {
        let (short, long) = if self.width_mm <= self.height_mm {
            (self.width_mm, self.height_mm)
        } else {
            (self.height_mm, self.width_mm)
        };
        match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide
    Portrait,
    /// Wider than tall
    #[default]
    Landscape,
}

impl Orientation {
    /// Parse an orientation token.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "portrait" => Some(Orientation::Portrait),
            "landscape" => Some(Orientation::Landscape),
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("portrait"),
            Orientation::Landscape => f.write_str("landscape"),
        }
    }
}
