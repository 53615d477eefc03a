//! Integration tests for the layout pipeline.

use std::io::Write;

use relayout::model::{ImagePlacement, SourceBlock, SourceLine};
use relayout::{
    analyze_file, BlockStatus, DocumentInput, Error, ImageKind, JsonSource, LayoutOptions,
    LayoutPipeline, PageInput, PageSelection, Payload, Rect,
};

const ARTBOX: Rect = Rect::new(0.0, 0.0, 600.0, 800.0);

/// A line of `tag` padded to one visible character per 5 units of width.
fn line(tag: &str, x0: f32, y0: f32, x1: f32) -> SourceLine {
    let chars = ((x1 - x0) / 5.0).round() as usize;
    let text = format!("{}{}", tag, "a".repeat(chars.saturating_sub(tag.len())));
    SourceLine::simple(Rect::new(x0, y0, x1, y0 + 10.0), text)
}

/// Eight lines forming three indented paragraphs.
fn column(tag: &str, x0: f32, x1: f32, y0: f32) -> SourceBlock {
    let mid = x0 + (x1 - x0) * 0.5;
    let short = x0 + (x1 - x0) * 0.6;
    let rows = [
        (x0 + 20.0, x1),
        (x0, x1),
        (x0, mid),
        (x0 + 20.0, x1),
        (x0, x1),
        (x0, short),
        (x0 + 20.0, x1),
        (x0, x1),
    ];
    let lines = rows
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| {
            let tag = if i == 0 || i == 3 || i == 6 {
                format!("{}{} ", tag, i)
            } else {
                String::new()
            };
            line(&tag, a, y0 + 14.0 * i as f32, b)
        })
        .collect();
    SourceBlock::from_lines(lines)
}

fn header() -> SourceBlock {
    SourceBlock::from_lines(vec![SourceLine::simple(
        Rect::new(50.0, 20.0, 550.0, 32.0),
        "Journal of Layout Studies",
    )])
}

fn footer(n: u32) -> SourceBlock {
    SourceBlock::from_lines(vec![SourceLine::simple(
        Rect::new(280.0, 760.0, 320.0, 772.0),
        n.to_string(),
    )])
}

fn two_column_page(n: u32) -> PageInput {
    let shift = 2.0 * n as f32;
    PageInput::new(n, ARTBOX)
        .with_block(header())
        // Right column first: extraction order must not matter
        .with_block(column("R", 310.0, 550.0, 100.0 + shift))
        .with_block(column("L", 50.0, 290.0, 100.0 + shift))
        .with_block(footer(n))
}

fn document(pages: u32) -> DocumentInput {
    let mut input = DocumentInput::new();
    for n in 1..=pages {
        input.add_page(two_column_page(n));
    }
    input
}

fn paragraph_tags(page: &relayout::Page) -> Vec<String> {
    page.items
        .iter()
        .filter_map(|i| i.text_content())
        .map(|t| t.split_whitespace().next().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_two_columns_read_left_then_right() {
    let doc = LayoutPipeline::default().process(document(4)).unwrap();
    assert_eq!(doc.page_count(), 4);
    assert!(doc.is_complete());

    for page in &doc.pages {
        assert_eq!(paragraph_tags(page), vec!["L0", "L3", "L6", "R0", "R3", "R6"]);
    }
}

#[test]
fn test_running_header_and_footer_removed() {
    let doc = LayoutPipeline::default().process(document(4)).unwrap();
    for page in &doc.pages {
        assert_eq!(page.header_count(), 1);
        assert_eq!(page.footer_count(), 1);
        assert!(!page.plain_text().contains("Journal"));
    }
}

#[test]
fn test_keep_headers_footers() {
    let options = LayoutOptions::new().with_drop_headers_footers(false);
    let doc = LayoutPipeline::new(options).process(document(3)).unwrap();
    let page = &doc.pages[0];
    assert_eq!(page.items.first().and_then(|i| i.text_content()), Some("Journal of Layout Studies"));
    assert!(page.blocks.iter().any(|b| b.is_header));
}

#[test]
fn test_single_page_has_no_recurrence() {
    let page = LayoutPipeline::default()
        .process_page(&two_column_page(1))
        .unwrap();
    assert_eq!(page.header_count(), 0);
    assert!(page.plain_text().starts_with("Journal"));
}

#[test]
fn test_vector_figure_between_text() {
    let drawings = vec![
        Rect::new(100.0, 200.0, 200.0, 300.0),
        Rect::new(190.0, 250.0, 300.0, 350.0),
        Rect::new(290.0, 300.0, 400.0, 400.0),
        Rect::new(390.0, 350.0, 450.0, 420.0),
    ];
    let page = PageInput::new(1, ARTBOX)
        .with_block(SourceBlock::from_lines(vec![line("Intro ", 50.0, 100.0, 550.0)]))
        .with_block(SourceBlock::from_lines(vec![line("Caption ", 100.0, 440.0, 450.0)]))
        .with_drawings(drawings);

    let out = LayoutPipeline::default().process_page(&page).unwrap();
    assert_eq!(out.items.len(), 3);
    assert!(out.items[0].text_content().unwrap().starts_with("Intro"));
    assert_eq!(out.items[1].reference(), Some("svg_1_0"));
    assert_eq!(out.items[1].rect, Rect::new(90.0, 195.0, 460.0, 425.0));
    assert!(out.items[2].text_content().unwrap().starts_with("Caption"));
}

#[test]
fn test_embedded_image_keeps_supplied_reference() {
    let page = PageInput::new(1, ARTBOX)
        .with_image(ImagePlacement::with_reference(
            Rect::new(100.0, 100.0, 300.0, 300.0),
            "xref_12",
        ))
        .with_block(SourceBlock::from_lines(vec![line("In ", 150.0, 150.0, 250.0)]));
    let out = LayoutPipeline::default().process_page(&page).unwrap();

    assert_eq!(out.items.len(), 1);
    assert!(matches!(
        &out.items[0].payload,
        Payload::Image { reference, kind: ImageKind::Embedded } if reference == "xref_12"
    ));
    assert_eq!(out.blocks[0].status, BlockStatus::Overlap);
}

#[test]
fn test_page_failures_are_isolated() {
    let mut input = document(3);
    input.pages[1].artbox = Rect::new(0.0, 0.0, 0.0, 800.0);

    let doc = LayoutPipeline::default().process(input.clone()).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.failures.len(), 1);
    assert_eq!(doc.failures[0].page, 2);
    assert!(doc.failures[0].error.starts_with("Page 2"));

    let strict = LayoutPipeline::new(LayoutOptions::new().strict());
    assert!(matches!(strict.process(input), Err(Error::Page { page: 2, .. })));
}

#[test]
fn test_sequential_matches_parallel() {
    let parallel = LayoutPipeline::default().process(document(6)).unwrap();
    let sequential = LayoutPipeline::new(LayoutOptions::new().sequential())
        .process(document(6))
        .unwrap();
    assert_eq!(parallel.plain_text(), sequential.plain_text());
}

#[test]
fn test_analyze_file_from_disk() {
    let mut input = document(2);
    input.name = Some("paper".to_string());
    let json = serde_json::to_string(&input).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let doc = analyze_file(file.path()).unwrap();
    assert_eq!(doc.name.as_deref(), Some("paper"));
    assert_eq!(doc.page_count(), 2);

    let source = JsonSource::open(file.path()).unwrap();
    let options = LayoutOptions::new().with_pages(PageSelection::Single(2));
    let doc = LayoutPipeline::new(options).process_source(&source).unwrap();
    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.pages[0].number, 2);
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        analyze_file("/nonexistent/extracted.json"),
        Err(Error::Io(_))
    ));
}
