//! Build options and configuration.

use crate::layout::GridDims;
use crate::model::{Orientation, PageSize};

/// Default stacking order for elements that declare no `Z`.
pub const DEFAULT_Z: i32 = 10;

/// Options for building a document.
///
/// Values here are fallbacks; document meta properties (`PAGESIZE`,
/// `ORIENTATION`, `GRID`) take precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Paper size when the document declares none
    pub page_size: PageSize,

    /// Orientation when the document declares none
    pub orientation: Orientation,

    /// Content grid when the document declares none
    pub grid: GridDims,

    /// Z-order for elements without `Z`
    pub default_z: i32,

    /// Check style fonts against the font catalog
    pub check_fonts: bool,

    /// Check relative asset paths against the asset probe
    pub check_assets: bool,
}

impl BuildOptions {
    /// Create new build options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback paper size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the fallback orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the fallback grid.
    pub fn with_grid(mut self, grid: GridDims) -> Self {
        self.grid = grid;
        self
    }

    /// Set the default z-order.
    pub fn with_default_z(mut self, z: i32) -> Self {
        self.default_z = z;
        self
    }

    /// Enable or disable font checks.
    pub fn with_font_check(mut self, check: bool) -> Self {
        self.check_fonts = check;
        self
    }

    /// Enable or disable asset checks.
    pub fn with_asset_check(mut self, check: bool) -> Self {
        self.check_assets = check;
        self
    }

    /// Skip every collaborator check.
    pub fn offline(mut self) -> Self {
        self.check_fonts = false;
        self.check_assets = false;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Landscape,
            grid: GridDims::default(),
            default_z: DEFAULT_Z,
            check_fonts: true,
            check_assets: true,
        }
    }
}
