//! Line and paragraph types produced by paragraph segmentation.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A logical text line: one or more extracted lines sharing a vertical extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    /// Bounding box
    pub rect: Rect,
    /// Concatenated text
    pub text: String,
}

impl RawLine {
    /// Create a line.
    pub fn new(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
        }
    }

    /// Number of characters that are not whitespace.
    pub fn visible_chars(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// A paragraph of a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Union of the paragraph's line rectangles
    pub rect: Rect,

    /// Paragraph text
    pub text: String,

    /// False when the lines were not captured by a recognized paragraph
    /// boundary and were emitted as a fallback span
    pub matched: bool,

    /// Whether the layout model marked this paragraph as a title
    #[serde(default)]
    pub is_title: bool,

    /// Index of the first logical line of the block in this paragraph
    pub first_line: usize,

    /// Number of logical lines in this paragraph
    pub line_count: usize,
}

impl Paragraph {
    /// Build a paragraph from a contiguous run of lines.
    ///
    /// `lines` must not be empty.
    pub fn from_lines(lines: &[RawLine], first_line: usize, matched: bool) -> Self {
        let rect = crate::geometry::union_all(lines.iter().map(|l| &l.rect))
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let text = crate::layout::normalize_text(
            &lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        Self {
            rect,
            text,
            matched,
            is_title: false,
            first_line,
            line_count: lines.len(),
        }
    }

    /// Index one past the last line of this paragraph.
    pub fn end_line(&self) -> usize {
        self.first_line + self.line_count
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Typographic measurements of one block.
///
/// All zero when the block has too few lines to measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMetrics {
    /// Median left edge of interior lines
    pub left: f32,
    /// Median right edge of interior lines
    pub right: f32,
    /// Mean width of a visible character
    pub avg_char_width: f32,
    /// Mean half line pitch
    pub avg_char_height: f32,
}

impl BlockMetrics {
    /// Whether the measurements are usable for segmentation.
    pub fn is_measured(&self) -> bool {
        self.avg_char_width > 0.0
    }
}
