//! Vector-drawing region merging.
//!
//! Drawing paths of one figure arrive as many small rectangles. They are
//! clustered through a containment graph and an overlap graph, then the
//! surviving clusters are joined when one contains the other or when they
//! sit side by side with a small gap.

use std::collections::{HashSet, VecDeque};

use super::options::RegionConfig;
use crate::geometry::{span_overlap_ratio, Rect};

/// A deduplicated drawing rectangle with its graph edges.
#[derive(Debug, Clone)]
pub struct RegionCandidate {
    /// The drawing rectangle
    pub rect: Rect,
    /// Indices of candidates this one contains
    pub children: Vec<usize>,
    /// Indices of candidates containing this one
    pub parents: Vec<usize>,
    /// Indices of candidates this one overlaps without containing
    pub overlaps: Vec<usize>,
    /// How strongly the rectangle behaves like a page background (0..=4)
    pub exceeds_page: u8,
}

/// Score how much a rectangle reaches the page bounds.
///
/// A rectangle strictly inside the page scores 4 when it covers at least
/// `coverage` of the page and 0 otherwise. Any other rectangle scores one
/// point per page edge it touches or crosses.
pub fn exceeds_page(rect: &Rect, page: &Rect, coverage: f32) -> u8 {
    let inside = page.x0 < rect.x0
        && rect.x1 < page.x1
        && page.y0 < rect.y0
        && rect.y1 < page.y1;
    if inside {
        let (_, page_ratio) = rect.overlap_ratio(page);
        return if page_ratio >= coverage { 4 } else { 0 };
    }
    [
        rect.x0 <= page.x0,
        page.x1 <= rect.x1,
        rect.y0 <= page.y0,
        page.y1 <= rect.y1,
    ]
    .iter()
    .filter(|&&hit| hit)
    .count() as u8
}

/// Clusters drawing rectangles into figure regions.
pub struct RegionMerger<'a> {
    config: &'a RegionConfig,
}

impl<'a> RegionMerger<'a> {
    /// Create a merger with the given thresholds.
    pub fn new(config: &'a RegionConfig) -> Self {
        Self { config }
    }

    /// Deduplicate drawings and build the containment and overlap graphs.
    pub fn build_candidates(&self, drawings: &[Rect], page: &Rect) -> Vec<RegionCandidate> {
        let mut seen = HashSet::new();
        let mut candidates: Vec<RegionCandidate> = drawings
            .iter()
            .filter(|r| seen.insert(r.key()))
            .map(|r| RegionCandidate {
                rect: *r,
                children: Vec::new(),
                parents: Vec::new(),
                overlaps: Vec::new(),
                exceeds_page: exceeds_page(r, page, self.config.page_coverage),
            })
            .collect();

        let n = candidates.len();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (a, b) = (candidates[i].rect, candidates[j].rect);
                if a.contains(&b) {
                    candidates[i].children.push(j);
                    candidates[j].parents.push(i);
                } else if a.overlaps(&b) {
                    candidates[i].overlaps.push(j);
                }
            }
        }
        candidates
    }

    /// Merge a page's drawing rectangles into figure regions.
    ///
    /// `text_lines` bounds false positives: a region swallowing many text
    /// lines is a page frame, not a figure. The returned rectangles carry no
    /// padding.
    pub fn merge(&self, drawings: &[Rect], page: &Rect, text_lines: &[Rect]) -> Vec<Rect> {
        let candidates = self.build_candidates(drawings, page);
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let text_lines: Vec<Rect> = text_lines
            .iter()
            .filter(|r| seen.insert(r.key()))
            .copied()
            .collect();

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            candidates[b]
                .rect
                .area()
                .total_cmp(&candidates[a].rect.area())
        });

        let mut visited = vec![false; candidates.len()];
        let mut regions: Vec<Rect> = Vec::new();

        for i in order {
            if visited[i] {
                continue;
            }
            let cand = &candidates[i];
            if cand.rect.is_line() {
                continue;
            }
            visited[i] = true;
            if !cand.parents.is_empty() {
                continue;
            }

            let mut count = cand.children.len();
            let rect = match cand.exceeds_page {
                0 => {
                    if regions.iter().any(|r| r.contains(&cand.rect)) {
                        continue;
                    }
                    let (rect, absorbed) = flood_fill(&candidates, i, &mut visited);
                    count += absorbed;
                    rect
                }
                1 | 2 => {
                    if regions.iter().any(|r| r.contains(&cand.rect)) {
                        continue;
                    }
                    // Probable frame: only the content inside it counts
                    let mut union: Option<Rect> = None;
                    for &j in &cand.children {
                        if visited[j] {
                            continue;
                        }
                        visited[j] = true;
                        let child = candidates[j].rect;
                        union = Some(union.map_or(child, |u| u.union(&child)));
                        count += 1;
                    }
                    match union {
                        Some(u) => u,
                        None => {
                            log::debug!("Frame {:?} has no free children", cand.rect);
                            continue;
                        }
                    }
                }
                _ => cand.rect,
            };

            if rect.is_line() {
                log::debug!("Rejecting line-like region {:?}", rect);
                continue;
            }
            if count < self.config.min_elements {
                log::debug!("Rejecting region {:?} with {} elements", rect, count);
                continue;
            }
            let text_count = text_lines.iter().filter(|t| rect.contains(t)).count();
            if text_count >= self.config.max_text_lines {
                log::debug!(
                    "Rejecting region {:?} containing {} text lines",
                    rect,
                    text_count
                );
                continue;
            }

            regions.push(rect);
        }

        self.join(regions)
    }

    /// Join regions that contain each other, overlap heavily or sit side by
    /// side. Passes repeat until nothing changes, since a grown region may
    /// reach neighbours it missed before.
    pub fn join(&self, mut regions: Vec<Rect>) -> Vec<Rect> {
        regions.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));

        loop {
            let mut absorbed = vec![false; regions.len()];
            let mut changed = false;

            for i in 0..regions.len() {
                if absorbed[i] {
                    continue;
                }
                for j in (i + 1)..regions.len() {
                    if absorbed[j] || !self.should_join(&regions[i], &regions[j]) {
                        continue;
                    }
                    regions[i] = regions[i].union(&regions[j]);
                    absorbed[j] = true;
                    changed = true;
                }
            }

            regions = regions
                .into_iter()
                .zip(absorbed)
                .filter(|(_, gone)| !gone)
                .map(|(r, _)| r)
                .collect();
            if !changed {
                return regions;
            }
        }
    }

    fn should_join(&self, a: &Rect, b: &Rect) -> bool {
        let threshold = self.config.adjacency_overlap;
        if a.contains(b) || b.contains(a) {
            return true;
        }
        let (ra, rb) = a.overlap_ratio(b);
        if ra >= threshold || rb >= threshold {
            return true;
        }

        // Negative when the spans overlap
        let x_gap = a.x0.max(b.x0) - a.x1.min(b.x1);
        let y_gap = a.y0.max(b.y0) - a.y1.min(b.y1);
        let gap = self.config.adjacency_gap;

        let (h1, h2) = span_overlap_ratio(a.y0, a.y1, b.y0, b.y1);
        if h1 >= threshold && h2 >= threshold && x_gap < gap {
            return true;
        }
        let (v1, v2) = span_overlap_ratio(a.x0, a.x1, b.x0, b.x1);
        v1 >= threshold && v2 >= threshold && y_gap < gap
    }
}

/// Breadth-first walk of the overlap graph from `start`, skipping nodes that
/// reach the page edges. Returns the union rectangle and the number of
/// elements absorbed.
fn flood_fill(candidates: &[RegionCandidate], start: usize, visited: &mut [bool]) -> (Rect, usize) {
    let mut rect = candidates[start].rect;
    let mut count = 0;
    let mut queue = VecDeque::new();

    let enqueue = |j: usize, visited: &mut [bool], queue: &mut VecDeque<usize>| {
        if !visited[j] && candidates[j].exceeds_page == 0 {
            visited[j] = true;
            queue.push_back(j);
        }
    };

    for &j in &candidates[start].overlaps {
        enqueue(j, visited, &mut queue);
    }
    while let Some(j) = queue.pop_front() {
        rect = rect.union(&candidates[j].rect);
        count += 1 + candidates[j].children.len();
        for &k in &candidates[j].overlaps {
            enqueue(k, visited, &mut queue);
        }
    }
    (rect, count)
}
