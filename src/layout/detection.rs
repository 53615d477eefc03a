//! Layout-model candidate adapter.
//!
//! The model reports scored polygons in the pixel space of the image it saw.
//! This module maps them into page space and sorts them by category, keeping
//! only candidates at or above the per-category score threshold.

use serde::{Deserialize, Serialize};

use super::options::DetectionConfig;
use crate::error::{Diagnostic, DiagnosticKind, Error, Result};
use crate::geometry::Rect;
use crate::model::ModelDetections;

/// Region category assigned by the layout model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Title or heading
    Title,
    /// Figure
    Figure,
    /// Body text
    PlainText,
    /// Running header
    Header,
    /// Page number
    PageNumber,
    /// Footnote
    Footnote,
    /// Running footer
    Footer,
    /// Table
    Table,
    /// Table caption
    TableCaption,
    /// Figure caption
    FigureCaption,
    /// Display equation (legacy id)
    Equation,
    /// Full-width column
    FullColumn,
    /// Sub column
    SubColumn,
    /// Equation inside a text line
    InlineEquation,
    /// Equation set on its own line
    InterlineEquation,
}

impl Category {
    /// Map a numeric model category id.
    pub fn from_id(id: u32) -> Option<Self> {
        let category = match id {
            0 => Category::Title,
            1 => Category::Figure,
            2 => Category::PlainText,
            3 => Category::Header,
            4 => Category::PageNumber,
            5 => Category::Footnote,
            6 => Category::Footer,
            7 => Category::Table,
            8 => Category::TableCaption,
            9 => Category::FigureCaption,
            10 => Category::Equation,
            11 => Category::FullColumn,
            12 => Category::SubColumn,
            13 => Category::InlineEquation,
            14 => Category::InterlineEquation,
            _ => return None,
        };
        Some(category)
    }

    /// The numeric model category id.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Score threshold for this category, or `None` if the pipeline does not use it.
    fn threshold(self, config: &DetectionConfig) -> Option<f32> {
        match self {
            Category::Title => Some(config.title),
            Category::Figure => Some(config.figure),
            Category::Table => Some(config.table),
            Category::Equation | Category::InlineEquation | Category::InterlineEquation => {
                Some(config.equation)
            }
            Category::Header | Category::PageNumber | Category::Footer => {
                Some(config.header_footer)
            }
            _ => None,
        }
    }
}

/// A model candidate in page space.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Category
    pub category: Category,
    /// Confidence
    pub score: f32,
    /// Rectangle in page space
    pub rect: Rect,
}

/// Accepted candidates of one page, grouped by how the pipeline uses them.
#[derive(Debug, Clone, Default)]
pub struct PageDetections {
    /// Title regions
    pub titles: Vec<Rect>,
    /// Figure regions
    pub figures: Vec<Rect>,
    /// Table regions
    pub tables: Vec<Rect>,
    /// Inline equation regions
    pub inline_equations: Vec<Rect>,
    /// Interline equation regions
    pub interline_equations: Vec<Rect>,
    /// Header, footer and page-number regions
    pub header_footer: Vec<Rect>,
}

impl PageDetections {
    /// Check if no candidate was accepted.
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
            && self.figures.is_empty()
            && self.tables.is_empty()
            && self.inline_equations.is_empty()
            && self.interline_equations.is_empty()
            && self.header_footer.is_empty()
    }
}

/// Map model detections into page space.
///
/// Fails when the model's image size or the artwork bounds are unusable.
/// Individual malformed polygons are dropped and reported through `diagnostics`.
pub fn to_page_space(
    detections: &ModelDetections,
    artbox: &Rect,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Candidate>> {
    if !(detections.width > 0.0 && detections.height > 0.0) || artbox.is_degenerate() {
        return Err(Error::Collaborator(format!(
            "unusable model image size {}x{} for artbox {:?}",
            detections.width, detections.height, artbox
        )));
    }

    let scale_x = detections.width / artbox.width();
    let scale_y = detections.height / artbox.height();

    let mut candidates = Vec::with_capacity(detections.detections.len());
    for (i, det) in detections.detections.iter().enumerate() {
        let Some(category) = Category::from_id(det.category_id) else {
            log::debug!("Detection {}: unknown category {}", i, det.category_id);
            continue;
        };

        if det.poly.len() < 4 || det.poly.len() % 2 != 0 {
            log::warn!("Detection {}: polygon has {} coordinates", i, det.poly.len());
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedInput,
                format!("detection {} has a malformed polygon", i),
            ));
            continue;
        }

        let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for point in det.poly.chunks_exact(2) {
            let x = point[0] / scale_x + artbox.x0;
            let y = point[1] / scale_y + artbox.y0;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }

        let rect = Rect::new(x0, y0, x1, y1);
        if rect.is_degenerate() {
            log::warn!("Detection {}: degenerate rectangle {:?}", i, rect);
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedInput,
                format!("detection {} maps to a degenerate rectangle", i),
            ));
            continue;
        }

        candidates.push(Candidate {
            category,
            score: det.score,
            rect,
        });
    }

    Ok(candidates)
}

/// Keep candidates that reach their category threshold and group them.
pub fn select(candidates: &[Candidate], config: &DetectionConfig) -> PageDetections {
    let mut out = PageDetections::default();
    for c in candidates {
        let Some(threshold) = c.category.threshold(config) else {
            continue;
        };
        if c.score < threshold {
            log::debug!(
                "Dropping {:?} candidate with score {:.2} < {:.2}",
                c.category,
                c.score,
                threshold
            );
            continue;
        }
        let bucket = match c.category {
            Category::Title => &mut out.titles,
            Category::Figure => &mut out.figures,
            Category::Table => &mut out.tables,
            Category::InlineEquation => &mut out.inline_equations,
            Category::Equation | Category::InterlineEquation => &mut out.interline_equations,
            _ => &mut out.header_footer,
        };
        bucket.push(c.rect);
    }
    out
}
