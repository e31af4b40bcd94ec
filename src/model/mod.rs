//! Document IR types.
//!
//! The model is what the builder hands to downstream code generation:
//! pages with fully resolved elements, the style table, the master
//! registry and the diagnostics collected along the way.

mod diagnostic;
mod document;
mod page;
mod style;

pub use diagnostic::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use document::{Document, Orientation, PageSize};
pub use page::{
    Element, ElementKind, FigureContent, FitMode, Page, Payload, PdfContent, RectangleContent,
    ScaleMode, SvgContent, TextContent, TocContent, TocEntry, DEFAULT_RECT_COLOR,
};
pub use style::{
    Length, LengthUnit, ParagraphOptions, ResolvedStyle, ShapeOptions, Style, StyleProperties,
};
