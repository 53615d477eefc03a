//! Benchmarks for layout reconstruction.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic pages of scattered rectangles.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use relayout::layout::{ReadingOrderConfig, ReadingOrderSorter, RegionConfig, RegionMerger};
use relayout::model::{SourceBlock, SourceLine};
use relayout::{DocumentInput, LayoutOptions, LayoutPipeline, PageInput, Rect};

const ARTBOX: Rect = Rect::new(0.0, 0.0, 612.0, 792.0);

/// Deterministic scattered rectangles.
fn scattered(count: usize) -> Vec<Rect> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 10_000) as f32 / 10_000.0
    };
    (0..count)
        .map(|_| {
            let x0 = next() * 550.0;
            let y0 = next() * 730.0;
            Rect::new(x0, y0, x0 + 4.0 + next() * 60.0, y0 + 4.0 + next() * 60.0)
        })
        .collect()
}

/// A page with a two-column body and a cluster of drawings.
fn synthetic_page(number: u32) -> PageInput {
    let mut page = PageInput::new(number, ARTBOX);
    for (col, x0) in [(0, 50.0f32), (1, 320.0)] {
        let lines = (0..40)
            .map(|i| {
                let y = 80.0 + 15.0 * i as f32;
                let indent = if i % 8 == 0 { 15.0 } else { 0.0 };
                SourceLine::simple(
                    Rect::new(x0 + indent, y, x0 + 240.0, y + 11.0),
                    format!("column {} line {} {}", col, i, "lorem ipsum ".repeat(3)),
                )
            })
            .collect();
        page = page.with_block(SourceBlock::from_lines(lines));
    }
    page.with_drawings(scattered(200))
}

/// Benchmark the occlusion sort at various item counts.
fn bench_reading_order(c: &mut Criterion) {
    let config = ReadingOrderConfig::default();
    let sorter = ReadingOrderSorter::new(&config);
    let mut group = c.benchmark_group("reading_order");

    for count in [10, 100, 400].iter() {
        let rects = scattered(*count);
        group.bench_function(format!("{}_items", count), |b| {
            b.iter(|| sorter.order(black_box(&rects)));
        });
    }

    group.finish();
}

/// Benchmark vector region merging.
fn bench_region_merging(c: &mut Criterion) {
    let config = RegionConfig::default();
    let merger = RegionMerger::new(&config);
    let drawings = scattered(500);

    c.bench_function("region_merge_500", |b| {
        b.iter(|| merger.merge(black_box(&drawings), &ARTBOX, &[]));
    });
}

/// Benchmark the whole pipeline over a multi-page document.
fn bench_pipeline(c: &mut Criterion) {
    let mut input = DocumentInput::new();
    for n in 1..=20 {
        input.add_page(synthetic_page(n));
    }

    let mut group = c.benchmark_group("pipeline");
    group.bench_function("20_pages_parallel", |b| {
        let pipeline = LayoutPipeline::default();
        b.iter(|| pipeline.process(black_box(input.clone())));
    });
    group.bench_function("20_pages_sequential", |b| {
        let pipeline = LayoutPipeline::new(LayoutOptions::new().sequential());
        b.iter(|| pipeline.process(black_box(input.clone())));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_reading_order,
    bench_region_merging,
    bench_pipeline,
);
criterion_main!(benches);
