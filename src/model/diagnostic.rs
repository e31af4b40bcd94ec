//! Build diagnostics.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recoverable; a safe default was used
    Warning,
    /// Breaks a document-wide invariant
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Machine-readable diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// Malformed or non-positive coordinate reference
    InvalidArea,
    /// Page or element id declared twice
    DuplicateId,
    /// Alpha or area outside its permitted range
    OutOfRange,
    /// Length without a recognized unit
    InvalidUnit,
    /// Unrecognized element type
    UnknownType,
    /// Malformed property value
    InvalidValue,
    /// Style name with no definition
    UnknownStyle,
    /// Unrecognized key in a style declaration
    UnknownStyleKey,
    /// Asset element without a source path
    MissingSource,
    /// Relative asset path the probe cannot find
    MissingAsset,
    /// Font referenced by a style that the catalog does not know
    MissingFont,
    /// Master reference with no registered master
    UnknownMaster,
    /// Per-page override that is not supported
    IgnoredOverride,
    /// I/O, JSON or probe failures surfaced as diagnostics
    Internal,
}

impl DiagnosticCode {
    /// Code for an error value.
    pub fn of(error: &Error) -> Self {
        match error {
            Error::InvalidArea(_) => DiagnosticCode::InvalidArea,
            Error::DuplicateId { .. } => DiagnosticCode::DuplicateId,
            Error::OutOfRange(_) => DiagnosticCode::OutOfRange,
            Error::InvalidUnit { .. } => DiagnosticCode::InvalidUnit,
            Error::UnknownType(_) => DiagnosticCode::UnknownType,
            Error::InvalidValue { .. } => DiagnosticCode::InvalidValue,
            Error::Io(_) | Error::Json(_) | Error::AssetProbe(_) | Error::Render(_) => {
                DiagnosticCode::Internal
            }
        }
    }

    /// Codes that describe missing external assets.
    pub fn is_asset(self) -> bool {
        matches!(self, DiagnosticCode::MissingAsset | DiagnosticCode::MissingFont)
    }
}

/// A single finding of the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,

    /// Category
    pub code: DiagnosticCode,

    /// Human-readable message
    pub message: String,

    /// Page (or master) the finding belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    /// Element the finding belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl Diagnostic {
    /// Create a warning.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            page: None,
            element: None,
        }
    }

    /// Create an error.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::warning(code, message)
        }
    }

    /// Wrap an error value at the given severity.
    pub fn from_error(error: &Error, severity: Severity) -> Self {
        Self {
            severity,
            ..Self::warning(DiagnosticCode::of(error), error.to_string())
        }
    }

    /// Attach a page id.
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Attach an element id.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Check if this is an error-level entry.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Whether a caller applying the given policy should fail the build.
    /// Missing assets and fonts only block in strict mode.
    pub fn is_blocking(&self, strict_assets: bool) -> bool {
        self.is_error() || (strict_assets && self.code.is_asset())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        match (&self.page, &self.element) {
            (Some(page), Some(element)) => write!(f, " [{page}/{element}]"),
            (Some(page), None) => write!(f, " [{page}]"),
            (None, Some(element)) => write!(f, " [{element}]"),
            (None, None) => Ok(()),
        }
    }
}

/// Ordered diagnostic collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic, mirroring it to the log.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Error => log::error!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    /// Record every diagnostic from an iterator.
    pub fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for d in iter {
            self.push(d);
        }
    }

    /// Iterate in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check for any error-level entry.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    /// Error-level entries.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    /// Warning-level entries.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| !d.is_error())
    }

    /// Entries with the given code.
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.code == code)
    }

    /// Consume into a vector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
