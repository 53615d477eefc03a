//! Text-based versus scanned document classification.
//!
//! Two independent votes are taken from per-page statistics: one from how
//! much of each page its images cover, one from how much text sampled pages
//! carry. When they disagree the document is treated as scanned.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::model::{DocumentInput, ImagePlacement, PageInput};

/// Characters above which a page counts as carrying real text.
pub const TEXT_CHARS: usize = 200;
/// Minimum number of pages an image must appear on to count as a repeated layer.
pub const REPEATED_MIN_PAGES: usize = 2;
/// Page coverage of a repeated image that marks a watermark over text.
pub const WATERMARK_COVERAGE: f32 = 0.9;
/// Page coverage above which a page's largest image looks like a scan.
pub const SCAN_IMAGE_COVERAGE: f32 = 0.6;
/// Fraction of scan-like pages that makes the document scanned.
pub const SCAN_PAGE_RATIO: f32 = 0.8;
/// Documents with fewer pages than this have every page sampled.
pub const SAMPLE_ALL_BELOW: usize = 50;
/// Larger documents have one page in this many sampled.
pub const SAMPLE_EVERY: usize = 10;

/// Kind of document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Text is extractable
    Text,
    /// Pages are images of text
    Scanned,
}

/// Per-page statistics used for classification.
#[derive(Debug, Clone)]
pub struct PageStats {
    /// Page bounds
    pub artbox: Rect,
    /// Number of text characters on the page
    pub text_len: usize,
    /// Image placements; the reference identifies the image object
    pub images: Vec<ImagePlacement>,
}

impl PageStats {
    /// Collect statistics from an extracted page.
    pub fn from_page(page: &PageInput) -> Self {
        Self {
            artbox: page.artbox.normalized(),
            text_len: page.text_len(),
            images: page.images.clone(),
        }
    }

    fn coverage(&self, image: &ImagePlacement) -> f32 {
        let page = self.artbox.area();
        if page <= 0.0 {
            return 0.0;
        }
        image.rect.normalized().clamp_to(&self.artbox).area().max(0.0) / page
    }
}

/// Outcome of a classification, with both votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Final decision
    pub kind: DocumentKind,
    /// Vote from image coverage
    pub by_area: DocumentKind,
    /// Vote from text length
    pub by_text_len: DocumentKind,
}

impl Classification {
    /// Check if both votes agree.
    pub fn is_unanimous(&self) -> bool {
        self.by_area == self.by_text_len
    }
}

/// Classify an extracted document.
pub fn classify_document(document: &DocumentInput) -> Classification {
    let stats: Vec<PageStats> = document.pages.iter().map(PageStats::from_page).collect();
    classify(&stats)
}

/// Classify from per-page statistics.
pub fn classify(pages: &[PageStats]) -> Classification {
    let by_area = classify_by_area(pages);
    let by_text_len = classify_by_text_len(pages);
    let kind = if by_area == by_text_len {
        by_area
    } else {
        log::warn!(
            "Classification votes disagree (area: {:?}, text length: {:?}); treating as scanned",
            by_area,
            by_text_len
        );
        DocumentKind::Scanned
    };
    Classification {
        kind,
        by_area,
        by_text_len,
    }
}

/// Vote from how much of each page its images cover.
pub fn classify_by_area(pages: &[PageStats]) -> DocumentKind {
    if pages.is_empty() {
        return DocumentKind::Text;
    }
    if pages.iter().any(|p| p.images.is_empty() && p.text_len > 0) {
        return DocumentKind::Text;
    }

    // Distinct pages each image object appears on
    let mut pages_per_object: HashMap<&str, usize> = HashMap::new();
    for page in pages {
        let ids: HashSet<&str> = page
            .images
            .iter()
            .filter_map(|i| i.reference.as_deref())
            .collect();
        for id in ids {
            *pages_per_object.entry(id).or_insert(0) += 1;
        }
    }
    let min_pages = REPEATED_MIN_PAGES.min(pages.len());
    let repeated: HashSet<&str> = pages_per_object
        .into_iter()
        .filter(|(_, n)| *n >= min_pages)
        .map(|(id, _)| id)
        .collect();
    let is_repeated = |image: &ImagePlacement| {
        image
            .reference
            .as_deref()
            .is_some_and(|id| repeated.contains(id))
    };

    for page in pages {
        let watermark = page
            .images
            .iter()
            .any(|i| is_repeated(i) && page.coverage(i) >= WATERMARK_COVERAGE);
        if watermark && page.text_len > TEXT_CHARS {
            log::debug!("Full-page repeated image over text; treating as a watermark");
            return DocumentKind::Text;
        }
    }

    let scan_like = pages
        .iter()
        .filter(|page| {
            page.images
                .iter()
                .filter(|i| !is_repeated(i))
                .map(|i| page.coverage(i))
                .fold(0.0f32, f32::max)
                > SCAN_IMAGE_COVERAGE
        })
        .count();
    if scan_like as f32 >= SCAN_PAGE_RATIO * pages.len() as f32 {
        DocumentKind::Scanned
    } else {
        DocumentKind::Text
    }
}

/// Vote from the text carried by sampled pages.
pub fn classify_by_text_len(pages: &[PageStats]) -> DocumentKind {
    let has_text = sample_pages(pages.len())
        .into_iter()
        .any(|i| pages[i].text_len > TEXT_CHARS);
    if has_text {
        DocumentKind::Text
    } else {
        DocumentKind::Scanned
    }
}

/// Deterministic, evenly strided page sample.
fn sample_pages(total: usize) -> Vec<usize> {
    if total < SAMPLE_ALL_BELOW {
        return (0..total).collect();
    }
    let count = total.div_ceil(SAMPLE_EVERY);
    let stride = total / count;
    (0..count).map(|i| i * stride).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Rect = Rect::new(0.0, 0.0, 600.0, 800.0);

    fn page(text_len: usize, images: Vec<ImagePlacement>) -> PageStats {
        PageStats {
            artbox: PAGE,
            text_len,
            images,
        }
    }

    fn full_page_image(id: &str) -> ImagePlacement {
        ImagePlacement::with_reference(Rect::new(0.0, 0.0, 600.0, 800.0), id)
    }

    #[test]
    fn test_text_document() {
        let pages = vec![page(1200, vec![]), page(900, vec![])];
        let c = classify(&pages);
        assert_eq!(c.kind, DocumentKind::Text);
        assert!(c.is_unanimous());
    }

    #[test]
    fn test_scanned_document() {
        let pages: Vec<PageStats> = (0..5)
            .map(|i| page(0, vec![full_page_image(&format!("scan{}", i))]))
            .collect();
        let c = classify(&pages);
        assert_eq!(c.kind, DocumentKind::Scanned);
        assert!(c.is_unanimous());
    }

    #[test]
    fn test_watermark_over_text() {
        let pages: Vec<PageStats> = (0..3)
            .map(|_| page(1500, vec![full_page_image("watermark")]))
            .collect();
        assert_eq!(classify_by_area(&pages), DocumentKind::Text);
        assert_eq!(classify(&pages).kind, DocumentKind::Text);
    }

    #[test]
    fn test_disagreement_is_scanned() {
        // Full-page scans with an invisible text layer
        let pages: Vec<PageStats> = (0..4)
            .map(|i| page(800, vec![full_page_image(&format!("scan{}", i))]))
            .collect();
        let c = classify(&pages);
        assert_eq!(c.by_area, DocumentKind::Scanned);
        assert_eq!(c.by_text_len, DocumentKind::Text);
        assert_eq!(c.kind, DocumentKind::Scanned);
    }

    #[test]
    fn test_sample_pages() {
        assert_eq!(sample_pages(3), vec![0, 1, 2]);
        let sample = sample_pages(200);
        assert_eq!(sample.len(), 20);
        assert_eq!(sample[1], 10);
        assert!(sample.iter().all(|&i| i < 200));
    }
}
