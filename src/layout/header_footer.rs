//! Cross-page header and footer detection.
//!
//! Runs once per document, after every page has been segmented. Blocks that
//! recur with the same rectangle near the top or bottom of the page on
//! several pages are running headers or footers.

use std::collections::HashMap;

use super::options::HeaderFooterConfig;
use crate::geometry::Rect;
use crate::model::Block;

/// A rectangle recurring across pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonBBox {
    /// The recurring rectangle
    pub rect: Rect,
    /// Number of blocks with exactly this rectangle
    pub frequency: usize,
}

/// Canonical header and footer rectangles of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canonical {
    /// Rectangles recurring in the top zone
    pub headers: Vec<CommonBBox>,
    /// Rectangles recurring in the bottom zone
    pub footers: Vec<CommonBBox>,
}

/// Flags recurring top and bottom blocks.
pub struct HeaderFooterDetector<'a> {
    config: &'a HeaderFooterConfig,
}

impl<'a> HeaderFooterDetector<'a> {
    /// Create a detector with the given thresholds.
    pub fn new(config: &'a HeaderFooterConfig) -> Self {
        Self { config }
    }

    /// Find the canonical header and footer rectangles over all blocks of a
    /// document.
    ///
    /// Returns `None` when detection is skipped: no blocks, or a document
    /// where more than half of the blocks are single lines.
    pub fn analyze(&self, blocks: &[&Block]) -> Option<Canonical> {
        if blocks.is_empty() {
            return None;
        }

        let (acw, ach) = document_metrics(blocks);
        let single_lines = blocks
            .iter()
            .filter(|b| {
                b.rect.height() <= self.config.single_line_height * ach
                    && b.rect.width() > self.config.single_line_width * acw
            })
            .count();
        if single_lines * 2 > blocks.len() {
            log::debug!(
                "Skipping header/footer detection: {} of {} blocks are single lines",
                single_lines,
                blocks.len()
            );
            return None;
        }

        let page_height = blocks
            .iter()
            .map(|b| b.rect.y1)
            .fold(f32::MIN, f32::max);
        let top_limit = self.config.top_zone * page_height;
        let bottom_limit = self.config.bottom_zone * page_height;

        let headers = self.recurring(blocks.iter().copied().filter(|b| b.rect.y0 < top_limit));
        let footers =
            self.recurring(blocks.iter().copied().filter(|b| b.rect.y1 > bottom_limit));
        log::debug!(
            "Canonical rectangles: {} header, {} footer",
            headers.len(),
            footers.len()
        );

        Some(Canonical { headers, footers })
    }

    /// Flag blocks matching a canonical rectangle.
    pub fn mark(&self, canonical: &Canonical, blocks: &mut [Block]) {
        let tol = self.config.match_tolerance;
        for block in blocks {
            block.is_header = canonical
                .headers
                .iter()
                .any(|c| block.rect.approx_eq(&c.rect, tol));
            block.is_footer = canonical
                .footers
                .iter()
                .any(|c| block.rect.approx_eq(&c.rect, tol));
        }
    }

    /// Analyze and flag the blocks of every page in one call.
    pub fn detect(&self, pages: &mut [Vec<Block>]) -> Option<Canonical> {
        let all: Vec<&Block> = pages.iter().flatten().collect();
        let canonical = self.analyze(&all)?;
        for blocks in pages.iter_mut() {
            self.mark(&canonical, blocks);
        }
        Some(canonical)
    }

    /// Up to `max_canonical` rectangles occurring at least `min_frequency`
    /// times, most frequent first, ties in order of first occurrence.
    fn recurring<'b>(&self, blocks: impl Iterator<Item = &'b Block>) -> Vec<CommonBBox> {
        let mut counts: HashMap<[u32; 4], (usize, usize, Rect)> = HashMap::new();
        for (order, block) in blocks.enumerate() {
            counts
                .entry(block.rect.key())
                .or_insert((0, order, block.rect))
                .0 += 1;
        }

        let mut frequent: Vec<(usize, usize, Rect)> = counts
            .into_values()
            .filter(|(count, _, _)| *count >= self.config.min_frequency)
            .collect();
        frequent.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        frequent
            .into_iter()
            .take(self.config.max_canonical)
            .map(|(frequency, _, rect)| CommonBBox { rect, frequency })
            .collect()
    }
}

/// Mean character width and height over blocks that could be measured.
fn document_metrics(blocks: &[&Block]) -> (f32, f32) {
    let mean = |values: Vec<f32>| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f32>() / values.len() as f32
        }
    };
    let widths = blocks
        .iter()
        .map(|b| b.metrics.avg_char_width)
        .filter(|w| *w > 0.0)
        .collect();
    let heights = blocks
        .iter()
        .map(|b| b.metrics.avg_char_height)
        .filter(|h| *h > 0.0)
        .collect();
    (mean(widths), mean(heights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockMetrics;

    fn block(rect: Rect) -> Block {
        Block::new(rect, BlockMetrics::default(), vec![])
    }

    fn body(y0: f32) -> Block {
        Block::new(
            Rect::new(50.0, y0, 550.0, y0 + 300.0),
            BlockMetrics {
                left: 50.0,
                right: 550.0,
                avg_char_width: 5.0,
                avg_char_height: 7.0,
            },
            vec![],
        )
    }

    fn document() -> Vec<Vec<Block>> {
        (0..10)
            .map(|i| {
                let shift = 2.0 * i as f32;
                let mut page = vec![
                    block(Rect::new(0.0, 0.0, 200.0, 20.0)),
                    body(100.0 + shift),
                    body(420.0 + shift),
                ];
                if i == 3 {
                    page.push(block(Rect::new(300.0, 10.0, 500.0, 30.0)));
                }
                page.push(block(Rect::new(280.0, 760.0, 320.0, 780.0)));
                page
            })
            .collect()
    }

    #[test]
    fn test_recurring_header_flagged_on_every_page() {
        let config = HeaderFooterConfig::default();
        let mut pages = document();
        let canonical = HeaderFooterDetector::new(&config).detect(&mut pages).unwrap();

        assert_eq!(canonical.headers.len(), 1);
        assert_eq!(canonical.headers[0].frequency, 10);
        for page in &pages {
            assert!(page[0].is_header);
            assert!(!page[1].is_header && !page[1].is_footer);
            assert!(page.last().unwrap().is_footer);
        }
    }

    #[test]
    fn test_one_off_top_block_not_flagged() {
        let config = HeaderFooterConfig::default();
        let mut pages = document();
        HeaderFooterDetector::new(&config).detect(&mut pages);
        assert!(!pages[3][3].is_header);
    }

    #[test]
    fn test_near_match_within_tolerance() {
        let config = HeaderFooterConfig::default();
        let mut pages = document();
        pages[5][0].rect = Rect::new(0.5, 0.0, 200.8, 20.0);
        HeaderFooterDetector::new(&config).detect(&mut pages);
        assert!(pages[5][0].is_header);
    }

    #[test]
    fn test_dense_single_line_document_skipped() {
        let config = HeaderFooterConfig::default();
        // Each page: one measured body block and three wide single lines
        let mut pages: Vec<Vec<Block>> = (0..5)
            .map(|p| {
                vec![
                    body(100.0 + 2.0 * p as f32),
                    block(Rect::new(0.0, 0.0, 200.0, 8.0)),
                    block(Rect::new(0.0, 450.0, 200.0, 458.0)),
                    block(Rect::new(0.0, 700.0, 200.0, 708.0)),
                ]
            })
            .collect();
        assert!(HeaderFooterDetector::new(&config).detect(&mut pages).is_none());
        assert!(pages.iter().flatten().all(|b| !b.is_header && !b.is_footer));
    }

    #[test]
    fn test_at_most_three_canonical() {
        let config = HeaderFooterConfig::default();
        let mut pages: Vec<Vec<Block>> = (0..4)
            .map(|p| {
                let mut page: Vec<Block> = (0..5)
                    .map(|i| block(Rect::new(i as f32 * 100.0, 0.0, i as f32 * 100.0 + 50.0, 20.0)))
                    .collect();
                page.push(body(200.0 + 2.0 * p as f32));
                page.push(body(440.0 + 2.0 * p as f32));
                page
            })
            .collect();
        let canonical = HeaderFooterDetector::new(&config).detect(&mut pages).unwrap();
        assert_eq!(canonical.headers.len(), 3);
        assert!(pages[0][0].is_header && pages[0][2].is_header);
        assert!(!pages[0][3].is_header);
    }
}
