//! # pageir
//!
//! Grid-based document IR builder for slide-like page layouts.
//!
//! A parsed node tree (pages, nested sections and their properties) is
//! turned into a fully resolved document: every element carries its grid
//! rectangle, accumulated padding, alignment, effective style and typed
//! payload. Master pages are merged into renderable pages in z-order and
//! the result is validated. Problems never abort the build; they are
//! returned as diagnostics next to the document.
//!
//! ## Quick Start
//!
//! ```
//! use pageir::{build, Node, SourceTree};
//!
//! let tree = SourceTree::new()
//!     .with_meta("GRID", "12x8")
//!     .with_page(
//!         Node::new("Welcome").child(
//!             Node::new("Title")
//!                 .prop("TYPE", "header")
//!                 .prop("AREA", "A1,A12"),
//!         ),
//!     );
//!
//! let output = build(&tree);
//! assert!(!output.has_errors());
//! assert_eq!(output.document.pages[0].elements[0].id, "title");
//! ```
//!
//! ## Features
//!
//! - **Grid coordinates**: cell ranges (`A1,C2`) or explicit `x,y,w,h`
//! - **Margin tracks**: absolute margins become addressable tracks
//! - **Cumulative padding**: document, page, section and element levels add up
//! - **Style cascade**: built-in styles, declarations and a font override
//! - **Master pages**: shared elements merged by stable z-order
//! - **Parallel batches**: independent documents built with Rayon

pub mod assets;
pub mod builder;
pub mod error;
pub mod layout;
pub mod master;
pub mod model;
pub mod render;
pub mod style;
pub mod tree;

// Re-export commonly used types
pub use assets::{AnyFont, AssetProbe, FontCatalog, FsAssets, KnownFonts, NullAssets};
pub use builder::{slugify, validate, BuildOptions, BuildOutput, DocumentBuilder, DEFAULT_Z};
pub use error::{Error, Result};
pub use layout::{
    parse_area, physical_rect, resolve_padding, Flow, GridDims, GridGeometry, GridRect, HAlign,
    Padding, PhysicalRect, VAlign,
};
pub use master::{merge_layers, Master, MasterRegistry, Origin};
pub use model::{
    Diagnostic, DiagnosticCode, Diagnostics, Document, Element, ElementKind, Orientation, Page,
    PageSize, Payload, Severity,
};
pub use render::{render_pages, to_json, JsonFormat, RenderElement, RenderPage};
pub use style::StyleTable;
pub use tree::{Node, Properties, SourceTree};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Build a document with default options and no-I/O collaborators.
pub fn build(tree: &SourceTree) -> BuildOutput {
    DocumentBuilder::default().build(tree)
}

/// Build a document with custom options.
///
/// # Example
///
/// ```
/// use pageir::{build_with_options, BuildOptions, GridDims, SourceTree};
///
/// let options = BuildOptions::new().with_grid(GridDims::new(6, 4)).offline();
/// let output = build_with_options(&SourceTree::new(), &options);
/// assert_eq!(output.document.grid, GridDims::new(6, 4));
/// ```
pub fn build_with_options(tree: &SourceTree, options: &BuildOptions) -> BuildOutput {
    DocumentBuilder::new(options.clone()).build(tree)
}

/// Build a document from a JSON-encoded node tree.
pub fn build_json(json: &str) -> Result<BuildOutput> {
    let tree = SourceTree::from_json(json)?;
    Ok(build(&tree))
}

/// Build independent documents, in parallel when the `parallel` feature
/// is enabled. Outputs keep the input order.
pub fn build_all(trees: &[SourceTree], options: &BuildOptions) -> Vec<BuildOutput> {
    #[cfg(feature = "parallel")]
    {
        trees
            .par_iter()
            .map(|tree| build_with_options(tree, options))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        trees
            .iter()
            .map(|tree| build_with_options(tree, options))
            .collect()
    }
}
