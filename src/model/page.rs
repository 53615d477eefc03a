//! Page-level output types.

use serde::{Deserialize, Serialize};

use super::{BlockMetrics, ContentItem, Paragraph};
use crate::error::Diagnostic;
use crate::geometry::Rect;

/// A reconstructed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// The page's artwork bounds
    pub artbox: Rect,

    /// Text blocks with their paragraphs and header/footer flags
    pub blocks: Vec<Block>,

    /// Content items in reading order
    pub items: Vec<ContentItem>,

    /// Non-fatal conditions met while processing the page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Page {
    /// Create an empty page.
    pub fn new(number: u32, artbox: Rect) -> Self {
        Self {
            number,
            artbox,
            blocks: Vec::new(),
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Get plain text content of the page in reading order.
    pub fn plain_text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| item.text_content())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page has no content items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of blocks flagged as header.
    pub fn header_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_header).count()
    }

    /// Number of blocks flagged as footer.
    pub fn footer_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_footer).count()
    }
}

/// How a block's text was treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    /// Segmented into paragraphs
    #[default]
    Text,
    /// Overlaps an image, table, header or footer region and is not emitted as text
    Overlap,
}

/// A text block after segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Bounding box of the block
    pub rect: Rect,

    /// Segmentation status
    pub status: BlockStatus,

    /// Recurs at the top of many pages
    pub is_header: bool,

    /// Recurs at the bottom of many pages
    pub is_footer: bool,

    /// Measurements used for segmentation
    pub metrics: BlockMetrics,

    /// Paragraphs covering every logical line, in order
    pub paragraphs: Vec<Paragraph>,
}

impl Block {
    /// Create an unflagged text block.
    pub fn new(rect: Rect, metrics: BlockMetrics, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            rect,
            status: BlockStatus::Text,
            is_header: false,
            is_footer: false,
            metrics,
            paragraphs,
        }
    }

    /// Whether the block is excluded from the text flow.
    pub fn is_excluded(&self) -> bool {
        self.status == BlockStatus::Overlap || self.is_header || self.is_footer
    }

    /// Total number of logical lines across all paragraphs.
    pub fn line_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.line_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageKind, RawLine};

    #[test]
    fn test_page_plain_text_skips_images() {
        let mut page = Page::new(1, Rect::new(0.0, 0.0, 600.0, 800.0));
        let r = Rect::new(0.0, 0.0, 100.0, 10.0);
        page.items.push(ContentItem::text(Paragraph::from_lines(
            &[RawLine::new(r, "one")],
            0,
            true,
        )));
        page.items.push(ContentItem::image(r, "img_1_0", ImageKind::Embedded));
        page.items.push(ContentItem::text(Paragraph::from_lines(
            &[RawLine::new(r, "two")],
            0,
            true,
        )));
        assert_eq!(page.plain_text(), "one\n\ntwo");
        assert!(!page.is_empty());
    }

    #[test]
    fn test_block_exclusion() {
        let mut block = Block::new(Rect::new(0.0, 0.0, 1.0, 1.0), BlockMetrics::default(), vec![]);
        assert!(!block.is_excluded());
        block.is_footer = true;
        assert!(block.is_excluded());
    }
}
