//! Grid coordinates, physical track placement, padding and alignment.

mod align;
mod coords;
mod padding;
mod tracks;

pub use align::{resolve_alignment, Flow, HAlign, VAlign};
pub use coords::{parse_area, row_index, GridRect};
pub use padding::{resolve_padding, Padding, PaddingCascade};
pub use tracks::{
    physical_rect, Axis, GridDims, GridGeometry, Margins, PhysicalRect, TrackLayout, MAX_TRACKS,
};
