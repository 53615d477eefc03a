//! Document model types.
//!
//! Two trees live here. The input tree (`DocumentInput` → `PageInput` →
//! `SourceBlock` → `SourceLine` → `SourceSpan`) is what the page-extraction
//! layer hands over. The output tree (`Document` → `Page` → `Block` →
//! `Paragraph`, plus ordered `ContentItem`s) is what layout reconstruction
//! produces. Both are addressed by position and serialize with serde.

mod content;
mod document;
mod input;
mod page;
mod paragraph;

pub use content::{ContentItem, ImageKind, Payload};
pub use document::{Document, PageFailure};
pub use input::{
    Detection, DocumentInput, ImagePlacement, ModelDetections, PageInput, SourceBlock, SourceLine,
    SourceSpan,
};
pub use page::{Block, BlockStatus, Page};
pub use paragraph::{BlockMetrics, Paragraph, RawLine};
