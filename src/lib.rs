//! # relayout
//!
//! Reading order and logical structure reconstruction for extracted
//! document pages.
//!
//! A page-extraction layer reports text blocks, image placements and vector
//! drawings as unordered rectangles. This library turns them into
//! paragraphs, figures and tables in a single reading order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use relayout::{analyze_file, render};
//!
//! fn main() -> relayout::Result<()> {
//!     // Extraction output serialized as JSON
//!     let doc = analyze_file("extracted.json")?;
//!
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reading order**: occlusion-depth sort that reads column by column
//! - **Figure regions**: vector drawings merged into figure candidates
//! - **Paragraphs**: typographic segmentation of text blocks
//! - **Headers and footers**: detected from recurrence across pages
//! - **Layout-model input**: titles, tables and equations from a detector
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod classify;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use classify::{classify_document, Classification, DocumentKind};
pub use error::{Diagnostic, DiagnosticKind, Error, Result};
pub use geometry::Rect;
pub use layout::{
    ErrorMode, JsonSource, LayoutOptions, LayoutPipeline, PageEvent, PageSelection, PageSource,
};
pub use model::{
    Block, BlockStatus, ContentItem, Document, DocumentInput, ImageKind, Page, PageFailure,
    PageInput, Paragraph, Payload,
};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Analyze extraction output stored as a JSON file.
///
/// # Example
///
/// ```no_run
/// use relayout::analyze_file;
///
/// let doc = analyze_file("extracted.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    analyze_file_with_options(path, LayoutOptions::default())
}

/// Analyze a JSON file with custom options.
///
/// # Example
///
/// ```no_run
/// use relayout::{analyze_file_with_options, LayoutOptions, PageSelection};
///
/// let options = LayoutOptions::new()
///     .strict()
///     .with_pages(PageSelection::Range(1..=10));
/// let doc = analyze_file_with_options("extracted.json", options).unwrap();
/// ```
pub fn analyze_file_with_options<P: AsRef<Path>>(
    path: P,
    options: LayoutOptions,
) -> Result<Document> {
    let source = JsonSource::open(path)?;
    LayoutPipeline::new(options).process_source(&source)
}

/// Analyze extraction output from JSON bytes.
pub fn analyze_bytes(data: &[u8]) -> Result<Document> {
    let source = JsonSource::from_slice(data)?;
    LayoutPipeline::default().process_source(&source)
}

/// Analyze extraction output from a reader.
pub fn analyze_reader<R: Read>(reader: R) -> Result<Document> {
    let source = JsonSource::from_reader(reader)?;
    LayoutPipeline::default().process_source(&source)
}

/// Analyze already-decoded pages.
pub fn analyze_pages(pages: Vec<PageInput>, options: LayoutOptions) -> Result<Document> {
    let input = DocumentInput { name: None, pages };
    LayoutPipeline::new(options).process(input)
}

/// Extract plain text in reading order from a JSON file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(analyze_file(path)?.plain_text())
}

/// Builder for analyzing documents.
///
/// # Example
///
/// ```no_run
/// use relayout::Relayout;
///
/// let json = Relayout::new()
///     .sequential()
///     .keep_headers_footers()
///     .analyze("extracted.json")?
///     .to_json(relayout::JsonFormat::Compact)?;
/// # Ok::<(), relayout::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Relayout {
    options: LayoutOptions,
}

impl Relayout {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first page error.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Keep header and footer paragraphs in the output items.
    pub fn keep_headers_footers(mut self) -> Self {
        self.options = self.options.with_drop_headers_footers(false);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Analyze a JSON file.
    pub fn analyze<P: AsRef<Path>>(self, path: P) -> Result<RelayoutResult> {
        let source = JsonSource::open(path)?;
        self.analyze_source(&source)
    }

    /// Analyze JSON bytes.
    pub fn analyze_bytes(self, data: &[u8]) -> Result<RelayoutResult> {
        let source = JsonSource::from_slice(data)?;
        self.analyze_source(&source)
    }

    /// Analyze pages from any source.
    pub fn analyze_source<S: PageSource + Sync>(self, source: &S) -> Result<RelayoutResult> {
        let document = LayoutPipeline::new(self.options).process_source(source)?;
        Ok(RelayoutResult { document })
    }
}

/// Result of analyzing a document.
#[derive(Debug, Clone)]
pub struct RelayoutResult {
    /// The reconstructed document
    pub document: Document,
}

impl RelayoutResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get plain text in reading order.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
