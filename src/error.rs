//! Error types for pageir library.

use std::io;
use thiserror::Error;

/// Result type alias for pageir operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while resolving a document.
#[derive(Error, Debug)]
pub enum Error {
    /// A coordinate reference could not be parsed or has a non-positive span.
    #[error("Invalid area '{0}'")]
    InvalidArea(String),

    /// A page or element identifier was declared more than once.
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId {
        /// "page" or "element"
        kind: &'static str,
        /// The repeated identifier
        id: String,
    },

    /// A value lies outside its permitted range.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// A length is missing its unit or uses an unrecognized one.
    #[error("{property} length '{value}' must carry a unit (pt, mm, cm, in, em, %)")]
    InvalidUnit {
        /// Property name (e.g. "Stroke")
        property: String,
        /// Offending raw value
        value: String,
    },

    /// Element type is not one of the known kinds.
    #[error("Unknown element type '{0}'")]
    UnknownType(String),

    /// A property value could not be interpreted.
    #[error("Invalid value for {property}: '{value}'")]
    InvalidValue {
        /// Property key
        property: String,
        /// Offending raw value
        value: String,
    },

    /// I/O error when reading trees or assets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An asset could not be probed for its intrinsic size.
    #[error("Asset probe failed: {0}")]
    AssetProbe(String),

    /// Error while rendering output.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidValue`].
    pub fn invalid_value(property: impl Into<String>, value: impl Into<String>) -> Self {
        Error::InvalidValue {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Shorthand for [`Error::InvalidUnit`].
    pub fn invalid_unit(property: impl Into<String>, value: impl Into<String>) -> Self {
        Error::InvalidUnit {
            property: property.into(),
            value: value.into(),
        }
    }
}
