//! Page geometry as delivered by the page-extraction layer.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Extracted geometry for a whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Optional document name, carried through to the output
    #[serde(default)]
    pub name: Option<String>,

    /// Pages in document order
    #[serde(default)]
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    /// Create an empty document input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    pub fn add_page(&mut self, page: PageInput) {
        self.pages.push(page);
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// Extracted geometry for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInput {
    /// Page number (1-indexed)
    pub number: u32,

    /// The page's artwork bounds
    pub artbox: Rect,

    /// Text content as block → line → span
    #[serde(default)]
    pub blocks: Vec<SourceBlock>,

    /// Placements of embedded raster images
    #[serde(default)]
    pub images: Vec<ImagePlacement>,

    /// Bounding rectangles of vector drawing paths
    #[serde(default)]
    pub drawings: Vec<Rect>,

    /// Candidates proposed by the layout model, if it was run
    #[serde(default)]
    pub detections: Option<ModelDetections>,
}

impl PageInput {
    /// Create an empty page with the given artwork bounds.
    pub fn new(number: u32, artbox: Rect) -> Self {
        Self {
            number,
            artbox,
            blocks: Vec::new(),
            images: Vec::new(),
            drawings: Vec::new(),
            detections: None,
        }
    }

    /// Add a text block.
    pub fn with_block(mut self, block: SourceBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Add an embedded image placement.
    pub fn with_image(mut self, image: ImagePlacement) -> Self {
        self.images.push(image);
        self
    }

    /// Add vector drawing rectangles.
    pub fn with_drawings(mut self, drawings: impl IntoIterator<Item = Rect>) -> Self {
        self.drawings.extend(drawings);
        self
    }

    /// Attach layout-model detections.
    pub fn with_detections(mut self, detections: ModelDetections) -> Self {
        self.detections = Some(detections);
        self
    }

    /// Rectangles of every text span on the page, normalized.
    pub fn text_line_rects(&self) -> Vec<Rect> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.spans.iter())
            .map(|s| s.rect.normalized())
            .collect()
    }

    /// Total number of characters of text on the page.
    pub fn text_len(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.spans.iter())
            .map(|s| s.text.chars().count())
            .sum()
    }
}

/// A text block: a group of lines the extraction layer kept together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBlock {
    /// Bounding box of the block
    pub rect: Rect,

    /// Lines in extraction order
    #[serde(default)]
    pub lines: Vec<SourceLine>,
}

impl SourceBlock {
    /// Create a block from lines, computing its rectangle from them.
    pub fn from_lines(lines: Vec<SourceLine>) -> Self {
        let rect = crate::geometry::union_all(lines.iter().map(|l| &l.rect))
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        Self { rect, lines }
    }
}

/// A line of text within a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLine {
    /// Bounding box of the line
    pub rect: Rect,

    /// Spans in reading order
    #[serde(default)]
    pub spans: Vec<SourceSpan>,
}

impl SourceLine {
    /// Create a line holding a single span covering the whole line.
    pub fn simple(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            spans: vec![SourceSpan {
                rect,
                text: text.into(),
            }],
        }
    }

    /// Text of all spans joined by single spaces.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A run of text with a single bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Bounding box of the span
    pub rect: Rect,
    /// The text content
    pub text: String,
}

/// Where an embedded raster image is drawn on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// Placement rectangle
    pub rect: Rect,

    /// Opaque reference (object id or name) supplied by the extraction layer
    #[serde(default)]
    pub reference: Option<String>,
}

impl ImagePlacement {
    /// Create a placement without a reference.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            reference: None,
        }
    }

    /// Create a placement with a reference.
    pub fn with_reference(rect: Rect, reference: impl Into<String>) -> Self {
        Self {
            rect,
            reference: Some(reference.into()),
        }
    }
}

/// Output of the layout-model service for one page, in the model's pixel space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDetections {
    /// Width of the image the model saw
    pub width: f32,
    /// Height of the image the model saw
    pub height: f32,
    /// Scored candidates
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// A single scored candidate from the layout model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Numeric category assigned by the model
    pub category_id: u32,
    /// Confidence in `[0, 1]`
    pub score: f32,
    /// Polygon corners `[x0, y0, x1, y1, x2, y2, x3, y3]`, clockwise from top-left
    pub poly: Vec<f32>,
}

impl Detection {
    /// Create an axis-aligned detection from a rectangle in model space.
    pub fn from_rect(category_id: u32, score: f32, rect: Rect) -> Self {
        Self {
            category_id,
            score,
            poly: vec![
                rect.x0, rect.y0, rect.x1, rect.y0, rect.x1, rect.y1, rect.x0, rect.y1,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_text_joins_spans() {
        let line = SourceLine {
            rect: Rect::new(0.0, 0.0, 100.0, 10.0),
            spans: vec![
                SourceSpan {
                    rect: Rect::new(0.0, 0.0, 40.0, 10.0),
                    text: "Hello".to_string(),
                },
                SourceSpan {
                    rect: Rect::new(45.0, 0.0, 100.0, 10.0),
                    text: "world".to_string(),
                },
            ],
        };
        assert_eq!(line.text(), "Hello world");
    }

    #[test]
    fn test_page_text_stats() {
        let page = PageInput::new(1, Rect::new(0.0, 0.0, 600.0, 800.0)).with_block(
            SourceBlock::from_lines(vec![
                SourceLine::simple(Rect::new(10.0, 10.0, 100.0, 20.0), "abc"),
                SourceLine::simple(Rect::new(10.0, 22.0, 90.0, 32.0), "de"),
            ]),
        );
        assert_eq!(page.text_len(), 5);
        assert_eq!(page.text_line_rects().len(), 2);
        assert_eq!(page.blocks[0].rect, Rect::new(10.0, 10.0, 100.0, 32.0));
    }

    #[test]
    fn test_deserialize_minimal_page() {
        let json = r#"{"number": 2, "artbox": {"x0": 0, "y0": 0, "x1": 612, "y1": 792}}"#;
        let page: PageInput = serde_json::from_str(json).unwrap();
        assert_eq!(page.number, 2);
        assert!(page.blocks.is_empty());
        assert!(page.detections.is_none());
    }

    #[test]
    fn test_detection_from_rect() {
        let d = Detection::from_rect(1, 0.9, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(d.poly, vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 1.0, 4.0]);
    }
}
