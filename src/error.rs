//! Error types for relayout.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for relayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The extraction input could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A degenerate rectangle or an empty block.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The page-extraction layer or the layout-model service failed.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Processing of a single page failed.
    #[error("Page {page}: {source}")]
    Page {
        /// 1-indexed page number
        page: u32,
        /// Underlying cause
        source: Box<Error>,
    },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error during rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Wrap an error with the page it occurred on.
    pub fn on_page(self, page: u32) -> Self {
        match self {
            Error::Page { .. } => self,
            other => Error::Page {
                page,
                source: Box::new(other),
            },
        }
    }
}

/// Kind of a non-fatal condition recorded while processing a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An element was skipped because its geometry was unusable.
    MalformedInput,
    /// Block metrics fell back to zero.
    MissingMetrics,
    /// Reconciliation thresholds were inconclusive.
    RegionMergeAmbiguous,
    /// A single element could not be obtained from a collaborator.
    CollaboratorFailure,
}

/// A non-fatal condition attached to a page's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::MalformedInput("block has no lines".to_string()).on_page(3);
        assert_eq!(err.to_string(), "Page 3: Malformed input: block has no lines");
    }

    #[test]
    fn test_on_page_does_not_nest() {
        let err = Error::Collaborator("x".into()).on_page(1).on_page(2);
        assert!(matches!(err, Error::Page { page: 1, .. }));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(DiagnosticKind::MissingMetrics, "block 2");
        assert_eq!(d.to_string(), "MissingMetrics: block 2");
    }
}
