//! JSON rendering for reconstructed documents.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::{Document, Page};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write a document as JSON.
pub fn to_writer<W: Write>(doc: &Document, writer: W, format: JsonFormat) -> Result<()> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_writer_pretty(writer, doc),
        JsonFormat::Compact => serde_json::to_writer(writer, doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert one page to a single line of JSON.
pub fn page_to_json(page: &Page) -> Result<String> {
    serde_json::to_string(page).map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
