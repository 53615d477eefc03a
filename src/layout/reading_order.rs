//! Occlusion-depth reading order.
//!
//! Each item gets two ranks: `idx_x`, the length of the longest chain of
//! items lying entirely to its left, and `idx_y`, the same for items lying
//! entirely above it. Items sort by `idx_x * base + idx_y`, so content reads
//! column by column and top to bottom inside a column.
//!
//! Ranks are computed over an arena addressed by index, with an explicit
//! stack instead of recursion.

use super::options::ReadingOrderConfig;
use crate::geometry::Rect;
use crate::model::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Longest-chain rank of every rectangle under the `before` relation.
fn axis_ranks(rects: &[Rect], before: impl Fn(&Rect, &Rect) -> bool) -> Vec<u32> {
    let n = rects.len();

    // preds[b] holds every a with before(a, b)
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    for b in 0..n {
        for a in 0..n {
            if a != b && before(&rects[a], &rects[b]) {
                preds[b].push(a);
            }
        }
    }

    // Zero-extent rectangles at the same coordinate precede each other.
    // Keep only the edge leaving the top-left-most one.
    for b in 0..n {
        let mut i = 0;
        while i < preds[b].len() {
            let a = preds[b][i];
            if preds[a].contains(&b) && !top_left_first(rects, a, b) {
                preds[b].swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    let mut state = vec![Visit::Unvisited; n];
    let mut rank = vec![0u32; n];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if state[root] != Visit::Unvisited {
            continue;
        }
        state[root] = Visit::InProgress;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            if top.1 < preds[node].len() {
                let p = preds[node][top.1];
                top.1 += 1;
                match state[p] {
                    Visit::Unvisited => {
                        state[p] = Visit::InProgress;
                        stack.push((p, 0));
                    }
                    Visit::InProgress => {
                        log::warn!("Ignoring ordering cycle between items {} and {}", p, node);
                    }
                    Visit::Done => {}
                }
            } else {
                rank[node] = preds[node]
                    .iter()
                    .filter(|&&p| state[p] == Visit::Done)
                    .map(|&p| rank[p] + 1)
                    .max()
                    .unwrap_or(0);
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }

    rank
}

/// Whether `a` comes before `b` by top-left coordinate, then by index.
fn top_left_first(rects: &[Rect], a: usize, b: usize) -> bool {
    let (ra, rb) = (&rects[a], &rects[b]);
    ra.y0
        .total_cmp(&rb.y0)
        .then(ra.x0.total_cmp(&rb.x0))
        .then(a.cmp(&b))
        .is_lt()
}

/// `(idx_x, idx_y)` occlusion ranks of every rectangle.
pub fn occlusion_ranks(rects: &[Rect]) -> Vec<(u32, u32)> {
    let xs = axis_ranks(rects, |a, b| a.is_left_of(b));
    let ys = axis_ranks(rects, |a, b| a.is_above(b));
    xs.into_iter().zip(ys).collect()
}

/// Orders a page's content items for reading.
pub struct ReadingOrderSorter<'a> {
    config: &'a ReadingOrderConfig,
}

impl<'a> ReadingOrderSorter<'a> {
    /// Create a sorter.
    pub fn new(config: &'a ReadingOrderConfig) -> Self {
        Self { config }
    }

    /// Indices of `rects` in reading order. Equal keys keep input order.
    pub fn order(&self, rects: &[Rect]) -> Vec<usize> {
        let ranks = occlusion_ranks(rects);
        let base = self.key_base(&ranks);
        let mut order: Vec<usize> = (0..rects.len()).collect();
        order.sort_by_key(|&i| ranks[i].0 as u64 * base + ranks[i].1 as u64);
        order
    }

    /// Assign `order_key` to every item and sort the items.
    pub fn sort(&self, items: &mut [ContentItem]) {
        let rects: Vec<Rect> = items.iter().map(|i| i.rect).collect();
        let ranks = occlusion_ranks(&rects);
        let base = self.key_base(&ranks);
        for (item, &(x, y)) in items.iter_mut().zip(&ranks) {
            item.order_key = Some((x, y));
        }
        items.sort_by_key(|item| {
            let (x, y) = item.order_key.unwrap_or((0, 0));
            x as u64 * base + y as u64
        });
    }

    fn key_base(&self, ranks: &[(u32, u32)]) -> u64 {
        let max_y = ranks.iter().map(|r| r.1 as u64).max().unwrap_or(0);
        self.config.key_base.max(max_y + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorter_order(rects: &[Rect]) -> Vec<usize> {
        let config = ReadingOrderConfig::default();
        ReadingOrderSorter::new(&config).order(rects)
    }

    #[test]
    fn test_row_of_items() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(20.0, 0.0, 30.0, 10.0),
            Rect::new(40.0, 0.0, 50.0, 10.0),
        ];
        let ranks = occlusion_ranks(&rects);
        assert_eq!(ranks, vec![(0, 0), (1, 0), (2, 0)]);
        assert_eq!(sorter_order(&rects), vec![0, 1, 2]);
    }

    #[test]
    fn test_two_columns() {
        let rects = [
            Rect::new(0.0, 0.0, 50.0, 10.0),
            Rect::new(0.0, 20.0, 50.0, 30.0),
            Rect::new(60.0, 0.0, 110.0, 10.0),
        ];
        assert_eq!(occlusion_ranks(&rects), vec![(0, 0), (0, 1), (1, 0)]);
        assert_eq!(sorter_order(&rects), vec![0, 1, 2]);

        // Same layout given in scrambled order
        let scrambled = [rects[2], rects[1], rects[0]];
        assert_eq!(sorter_order(&scrambled), vec![2, 1, 0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 5.0, 15.0, 15.0),
            Rect::new(2.0, 2.0, 12.0, 12.0),
        ];
        assert_eq!(sorter_order(&rects), vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_width_cycle_is_broken() {
        // Two zero-width rectangles at the same x precede each other
        let rects = [
            Rect::new(10.0, 20.0, 10.0, 30.0),
            Rect::new(10.0, 0.0, 10.0, 10.0),
        ];
        let ranks = occlusion_ranks(&rects);
        assert_eq!(ranks[1].0, 0);
        assert_eq!(ranks[0].0, 1);
        assert_eq!(sorter_order(&rects), vec![1, 0]);
    }

    #[test]
    fn test_empty() {
        assert!(sorter_order(&[]).is_empty());
    }

    #[test]
    fn test_sort_sets_order_keys_and_is_idempotent() {
        let config = ReadingOrderConfig::default();
        let sorter = ReadingOrderSorter::new(&config);
        let mut items = vec![
            ContentItem::table(Rect::new(60.0, 0.0, 110.0, 10.0), "table_1_0"),
            ContentItem::table(Rect::new(0.0, 20.0, 50.0, 30.0), "table_1_1"),
            ContentItem::table(Rect::new(0.0, 0.0, 50.0, 10.0), "table_1_2"),
        ];
        sorter.sort(&mut items);
        let refs: Vec<_> = items.iter().filter_map(|i| i.reference()).collect();
        assert_eq!(refs, vec!["table_1_2", "table_1_1", "table_1_0"]);
        assert_eq!(items[2].order_key, Some((1, 0)));

        let before = items.clone();
        sorter.sort(&mut items);
        assert_eq!(items, before);
    }
}
