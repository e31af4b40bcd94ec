//! Grid geometry and physical track placement.
//!
//! A page is divided into a content grid of `cols` x `rows` tracks. When
//! margins are declared, one extra margin track is added on each side; its
//! physical size is the declared margin, while content tracks share the
//! remaining space evenly. Without margins every track is a content track.

use super::{GridRect, Padding};
use serde::{Deserialize, Serialize};

/// Largest accepted track count per axis.
pub const MAX_TRACKS: u32 = 1024;

/// Content grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    /// Content columns
    pub cols: u32,
    /// Content rows
    pub rows: u32,
}

impl GridDims {
    /// Create grid dimensions.
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// Parse `COLSxROWS` (e.g. `12x8`). Both parts must be in
    /// `1..=MAX_TRACKS`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (c, r) = raw.trim().to_ascii_lowercase().split_once('x').map(|(c, r)| {
            (c.trim().parse::<u32>(), r.trim().parse::<u32>())
        })?;
        let bounded = |n: u32| (1..=MAX_TRACKS).contains(&n);
        match (c, r) {
            (Ok(cols), Ok(rows)) if bounded(cols) && bounded(rows) => Some(Self { cols, rows }),
            _ => None,
        }
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::new(12, 8)
    }
}

/// Absolute margin sizes in millimetres (CSS order: top, right, bottom, left).
pub type Margins = Padding;

/// A rectangle in physical page space (millimetres, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl PhysicalRect {
    /// Shrink by padding, clamping the size at zero.
    pub fn inset(&self, padding: &Padding) -> PhysicalRect {
        PhysicalRect {
            x: self.x + padding.left,
            y: self.y + padding.top,
            width: (self.width - padding.left - padding.right).max(0.0),
            height: (self.height - padding.top - padding.bottom).max(0.0),
        }
    }
}

/// Page size, content grid and optional margins for one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Page width in mm
    pub page_width: f64,
    /// Page height in mm
    pub page_height: f64,
    /// Content grid
    pub grid: GridDims,
    /// Declared margins; `None` means no margin tracks
    pub margins: Option<Margins>,
}

impl GridGeometry {
    /// Create geometry for a page.
    pub fn new(page_width: f64, page_height: f64, grid: GridDims, margins: Option<Margins>) -> Self {
        Self {
            page_width,
            page_height,
            grid,
            margins,
        }
    }

    /// Whether margin tracks are present.
    pub fn has_margins(&self) -> bool {
        self.margins.is_some()
    }

    /// Columns of the addressable (total) grid.
    pub fn total_cols(&self) -> u32 {
        self.grid.cols.saturating_add(self.margin_tracks())
    }

    /// Rows of the addressable (total) grid.
    pub fn total_rows(&self) -> u32 {
        self.grid.rows.saturating_add(self.margin_tracks())
    }

    fn margin_tracks(&self) -> u32 {
        if self.has_margins() {
            2
        } else {
            0
        }
    }

    /// Check if `rect` lies within the grid that applies to this page.
    pub fn contains(&self, rect: &GridRect) -> bool {
        rect.fits_within(self.total_cols(), self.total_rows())
    }

    /// The default area for an element that declares none: the first
    /// content row across all content columns.
    pub fn default_area(&self) -> GridRect {
        GridRect {
            x: 1,
            y: 1,
            width: self.grid.cols.max(1),
            height: 1,
        }
    }

    /// Compute the per-axis track offsets for this page. Content track
    /// counts are capped at [`MAX_TRACKS`].
    pub fn tracks(&self) -> TrackLayout {
        let (lead_x, trail_x, lead_y, trail_y) = match self.margins {
            Some(m) => (Some(m.left), Some(m.right), Some(m.top), Some(m.bottom)),
            None => (None, None, None, None),
        };
        TrackLayout {
            columns: Axis::new(self.page_width, self.grid.cols, lead_x, trail_x),
            rows: Axis::new(self.page_height, self.grid.rows, lead_y, trail_y),
        }
    }
}

/// Prefix sums of track sizes along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// `offsets[i]` is the physical start of track `i + 1`; the last entry
    /// is the total extent.
    offsets: Vec<f64>,
    /// Size of one content track
    content_size: f64,
}

impl Axis {
    fn new(extent: f64, count: u32, leading: Option<f64>, trailing: Option<f64>) -> Self {
        let count = count.clamp(1, MAX_TRACKS);
        let margin_total = leading.unwrap_or(0.0) + trailing.unwrap_or(0.0);
        let content_size = (extent - margin_total) / count as f64;

        let mut sizes = Vec::with_capacity(count as usize + 2);
        if let Some(lead) = leading {
            sizes.push(lead);
        }
        sizes.extend(std::iter::repeat(content_size).take(count as usize));
        if let Some(trail) = trailing {
            sizes.push(trail);
        }

        let mut offsets = Vec::with_capacity(sizes.len() + 1);
        let mut acc = 0.0;
        offsets.push(acc);
        for size in sizes {
            acc += size;
            offsets.push(acc);
        }
        Self {
            offsets,
            content_size,
        }
    }

    /// Number of tracks on this axis.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Check if the axis has no tracks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one content track.
    pub fn content_size(&self) -> f64 {
        self.content_size
    }

    /// Physical size of the 1-based track `index`.
    pub fn track_size(&self, index: u32) -> f64 {
        self.offset(index) - self.offset(index.saturating_sub(1))
    }

    /// Physical offset of the boundary after `n` tracks. Tracks past the
    /// end of the grid are treated as content tracks.
    fn offset(&self, n: u32) -> f64 {
        let n = n as usize;
        let last = self.len();
        if n <= last {
            self.offsets[n]
        } else {
            self.offsets[last] + (n - last) as f64 * self.content_size
        }
    }

    /// Start and length of the span `start..start + span` (1-based).
    pub fn span(&self, start: u32, span: u32) -> (f64, f64) {
        let begin = self.offset(start.saturating_sub(1));
        let end = self.offset(start.saturating_sub(1).saturating_add(span));
        (begin, end - begin)
    }
}

/// Column and row track layouts for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    /// Horizontal tracks
    pub columns: Axis,
    /// Vertical tracks
    pub rows: Axis,
}

impl TrackLayout {
    /// Physical placement of a grid rectangle.
    pub fn physical_rect(&self, rect: &GridRect) -> PhysicalRect {
        let (x, width) = self.columns.span(rect.x, rect.width);
        let (y, height) = self.rows.span(rect.y, rect.height);
        PhysicalRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Physical placement of `rect` for the given page geometry.
pub fn physical_rect(rect: &GridRect, geometry: &GridGeometry) -> PhysicalRect {
    geometry.tracks().physical_rect(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_grid_dims_parse() {
        assert_eq!(GridDims::parse("12x8"), Some(GridDims::new(12, 8)));
        assert_eq!(GridDims::parse(" 3X4 "), Some(GridDims::new(3, 4)));
        assert_eq!(GridDims::parse("0x4"), None);
        assert_eq!(GridDims::parse("twelve"), None);
        assert_eq!(GridDims::parse("1024x1"), Some(GridDims::new(1024, 1)));
        assert_eq!(GridDims::parse("1025x1"), None);
        assert_eq!(GridDims::parse("4294967295x1"), None);
    }

    #[test]
    fn test_uniform_tracks_without_margins() {
        let geo = GridGeometry::new(120.0, 60.0, GridDims::new(6, 3), None);
        let tracks = geo.tracks();
        assert_eq!(geo.total_cols(), 6);
        assert!(approx(tracks.columns.content_size(), 20.0));

        let r = tracks.physical_rect(&GridRect::new(2, 2, 3, 2).unwrap());
        assert!(approx(r.x, 20.0));
        assert!(approx(r.y, 20.0));
        assert!(approx(r.width, 60.0));
        assert!(approx(r.height, 40.0));
    }

    #[test]
    fn test_margin_tracks_have_declared_size() {
        let margins = Padding::new(5.0, 0.0, 0.0, 5.0);
        let geo = GridGeometry::new(100.0, 100.0, GridDims::new(3, 3), Some(margins));
        let tracks = geo.tracks();

        assert_eq!(geo.total_cols(), 5);
        assert!(approx(tracks.columns.content_size(), 95.0 / 3.0));
        assert!(approx(tracks.columns.track_size(1), 5.0));
        assert!(approx(tracks.columns.track_size(5), 0.0));

        let corner = tracks.physical_rect(&GridRect::cell(1, 1).unwrap());
        assert_eq!(corner, PhysicalRect { x: 0.0, y: 0.0, width: 5.0, height: 5.0 });

        let first_content = tracks.physical_rect(&GridRect::cell(2, 2).unwrap());
        assert!(approx(first_content.x, 5.0));
        assert!(approx(first_content.width, 95.0 / 3.0));
    }

    #[test]
    fn test_full_span_covers_page() {
        let margins = Padding::new(10.0, 15.0, 20.0, 25.0);
        let geo = GridGeometry::new(297.0, 210.0, GridDims::new(4, 4), Some(margins));
        let r = physical_rect(&GridRect::new(1, 1, 6, 6).unwrap(), &geo);
        assert!(approx(r.width, 297.0));
        assert!(approx(r.height, 210.0));
    }

    #[test]
    fn test_out_of_grid_tracks_extend_as_content() {
        let geo = GridGeometry::new(100.0, 100.0, GridDims::new(4, 4), None);
        let r = physical_rect(&GridRect::new(4, 1, 2, 1).unwrap(), &geo);
        assert!(approx(r.x, 75.0));
        assert!(approx(r.width, 50.0));
        assert!(!geo.contains(&GridRect::new(4, 1, 2, 1).unwrap()));
    }

    #[test]
    fn test_oversized_grid_saturates() {
        let margins = Padding::uniform(5.0);
        let geo = GridGeometry::new(100.0, 100.0, GridDims::new(u32::MAX, 1), Some(margins));
        assert_eq!(geo.total_cols(), u32::MAX);
        assert_eq!(geo.total_rows(), 3);
        assert!(geo.contains(&GridRect::new(u32::MAX, 1, 1, 1).unwrap()));

        let tracks = geo.tracks();
        assert_eq!(tracks.columns.len(), MAX_TRACKS as usize + 2);
        let (_, width) = tracks.columns.span(u32::MAX, u32::MAX);
        assert!(width.is_finite());
    }

    #[test]
    fn test_inset_clamps() {
        let r = PhysicalRect { x: 0.0, y: 0.0, width: 10.0, height: 4.0 };
        let inner = r.inset(&Padding::new(3.0, 2.0, 3.0, 2.0));
        assert!(approx(inner.width, 6.0));
        assert_eq!(inner.height, 0.0);
    }
}
