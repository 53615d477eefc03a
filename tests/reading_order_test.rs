//! Property tests for the occlusion-depth reading order.

use relayout::layout::{occlusion_ranks, ReadingOrderConfig, ReadingOrderSorter};
use relayout::{ContentItem, Rect};

/// Deterministic pseudo-random rectangles with positive extent.
fn scattered(count: usize, seed: u64) -> Vec<Rect> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % 1000) as f32 / 1000.0
    };
    (0..count)
        .map(|_| {
            let x0 = next() * 500.0;
            let y0 = next() * 700.0;
            Rect::new(x0, y0, x0 + 5.0 + next() * 95.0, y0 + 5.0 + next() * 95.0)
        })
        .collect()
}

fn order(rects: &[Rect]) -> Vec<usize> {
    let config = ReadingOrderConfig::default();
    ReadingOrderSorter::new(&config).order(rects)
}

#[test]
fn test_order_is_a_permutation() {
    for seed in 0..20 {
        let rects = scattered(40, seed);
        let mut sorted = order(&rects);
        sorted.sort_unstable();
        assert_eq!(sorted, (0..rects.len()).collect::<Vec<_>>());
    }
}

#[test]
fn test_left_of_always_reads_first() {
    for seed in 0..20 {
        let rects = scattered(40, seed);
        let order = order(&rects);
        let mut position = vec![0; rects.len()];
        for (pos, &i) in order.iter().enumerate() {
            position[i] = pos;
        }
        for a in 0..rects.len() {
            for b in 0..rects.len() {
                if rects[a].is_left_of(&rects[b]) {
                    assert!(position[a] < position[b], "seed {}: {} before {}", seed, a, b);
                }
            }
        }
    }
}

#[test]
fn test_ranks_are_longest_chains() {
    // Staircase: each box is left of and above the next
    let rects: Vec<Rect> = (0..5)
        .map(|i| {
            let o = i as f32 * 20.0;
            Rect::new(o, o, o + 10.0, o + 10.0)
        })
        .collect();
    let ranks = occlusion_ranks(&rects);
    for (i, &(x, y)) in ranks.iter().enumerate() {
        assert_eq!((x, y), (i as u32, i as u32));
    }
}

#[test]
fn test_sort_is_deterministic_and_idempotent() {
    let config = ReadingOrderConfig::default();
    let sorter = ReadingOrderSorter::new(&config);
    let items: Vec<ContentItem> = scattered(30, 7)
        .into_iter()
        .enumerate()
        .map(|(i, r)| ContentItem::table(r, format!("table_1_{}", i)))
        .collect();

    let mut first = items.clone();
    sorter.sort(&mut first);
    let mut second = items;
    sorter.sort(&mut second);
    assert_eq!(first, second);

    let mut again = first.clone();
    sorter.sort(&mut again);
    assert_eq!(again, first);
    assert!(first.iter().all(|i| i.order_key.is_some()));
}

#[test]
fn test_degenerate_rects_terminate() {
    let mut rects = vec![Rect::new(10.0, 10.0, 10.0, 10.0); 8];
    rects.push(Rect::new(0.0, 0.0, 5.0, 5.0));
    let order = order(&rects);
    assert_eq!(order.len(), 9);
    assert_eq!(order[0], 8);
}
