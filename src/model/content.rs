//! Typed content items: the unit of reading order.

use serde::{Deserialize, Serialize};

use super::Paragraph;
use crate::geometry::Rect;

/// Origin of an image item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    /// A raster image placed by the document
    Embedded,
    /// A region merged from vector drawing paths
    Vector,
    /// A figure proposed only by the layout model
    Detected,
    /// An interline equation region
    Equation,
}

/// What a content item carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// A paragraph of text
    Text {
        /// The paragraph, with its own unclamped rectangle
        paragraph: Paragraph,
    },

    /// An image region
    Image {
        /// Opaque reference for the materialization layer
        reference: String,
        /// Where the region came from
        kind: ImageKind,
    },

    /// A table region
    Table {
        /// Opaque reference for the materialization layer
        reference: String,
    },
}

/// A positioned, typed element of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Bounding box in page space
    pub rect: Rect,

    /// Content
    #[serde(flatten)]
    pub payload: Payload,

    /// `(idx_x, idx_y)` occlusion ranks, set once by the reading-order sort
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_key: Option<(u32, u32)>,
}

impl ContentItem {
    /// Create a text item from a paragraph.
    pub fn text(paragraph: Paragraph) -> Self {
        Self {
            rect: paragraph.rect,
            payload: Payload::Text { paragraph },
            order_key: None,
        }
    }

    /// Create an image item.
    pub fn image(rect: Rect, reference: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            rect,
            payload: Payload::Image {
                reference: reference.into(),
                kind,
            },
            order_key: None,
        }
    }

    /// Create a table item.
    pub fn table(rect: Rect, reference: impl Into<String>) -> Self {
        Self {
            rect,
            payload: Payload::Table {
                reference: reference.into(),
            },
            order_key: None,
        }
    }

    /// Check if this item is text.
    pub fn is_text(&self) -> bool {
        matches!(self.payload, Payload::Text { .. })
    }

    /// Check if this item is an image.
    pub fn is_image(&self) -> bool {
        matches!(self.payload, Payload::Image { .. })
    }

    /// Check if this item is a table.
    pub fn is_table(&self) -> bool {
        matches!(self.payload, Payload::Table { .. })
    }

    /// The paragraph text, if this is a text item.
    pub fn text_content(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text { paragraph } => Some(paragraph.text.as_str()),
            _ => None,
        }
    }

    /// The materialization reference, if this is an image or table item.
    pub fn reference(&self) -> Option<&str> {
        match &self.payload {
            Payload::Image { reference, .. } | Payload::Table { reference } => {
                Some(reference.as_str())
            }
            Payload::Text { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawLine;

    #[test]
    fn test_item_kinds() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let img = ContentItem::image(r, "img_1_0", ImageKind::Embedded);
        assert!(img.is_image());
        assert_eq!(img.reference(), Some("img_1_0"));
        assert_eq!(img.text_content(), None);

        let table = ContentItem::table(r, "table_1_0");
        assert!(table.is_table());

        let p = Paragraph::from_lines(&[RawLine::new(r, "hi")], 0, true);
        let text = ContentItem::text(p);
        assert!(text.is_text());
        assert_eq!(text.text_content(), Some("hi"));
        assert_eq!(text.rect, r);
    }

    #[test]
    fn test_item_serialization_is_tagged() {
        let item = ContentItem::image(Rect::new(0.0, 0.0, 1.0, 1.0), "svg_2_0", ImageKind::Vector);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["kind"], "vector");
        assert!(json.get("order_key").is_none());
    }

    #[test]
    fn test_text_item_round_trips() {
        let p = Paragraph::from_lines(&[RawLine::new(Rect::new(0.0, 0.0, 10.0, 5.0), "hi")], 0, true);
        let mut item = ContentItem::text(p);
        item.order_key = Some((0, 2));
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        let back: ContentItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
