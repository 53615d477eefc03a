//! Per-page and per-document orchestration.
//!
//! A document runs in two phases separated by a barrier:
//!
//! 1. Every page independently validates its input, maps layout-model
//!    detections, merges vector regions, reconciles figures and segments its
//!    text blocks.
//! 2. Header and footer detection runs over the blocks of all pages.
//! 3. Every page independently builds its content items and sorts them.
//!
//! Pages run on the rayon pool unless the options ask for sequential
//! processing. A failing page never affects another page.

use std::collections::HashSet;

use rayon::prelude::*;

use super::detection::{self, PageDetections};
use super::header_footer::HeaderFooterDetector;
use super::options::{ErrorMode, LayoutOptions};
use super::paragraph::{BlockContext, ParagraphSegmenter};
use super::reading_order::ReadingOrderSorter;
use super::reconcile::FigureReconciler;
use super::region::RegionMerger;
use super::source::PageSource;
use crate::error::{Diagnostic, DiagnosticKind, Error, Result};
use crate::geometry::Rect;
use crate::model::{
    Block, BlockStatus, ContentItem, Document, DocumentInput, ImageKind, Page, PageFailure,
    PageInput,
};

/// Page state between the two phases.
#[derive(Debug)]
pub(crate) struct PageDraft {
    number: u32,
    artbox: Rect,
    images: Vec<(Rect, Option<String>)>,
    vector_regions: Vec<Rect>,
    detected_figures: Vec<Rect>,
    tables: Vec<Rect>,
    equations: Vec<Rect>,
    blocks: Vec<Block>,
    diagnostics: Vec<Diagnostic>,
}

/// Reconstructs reading order and structure for documents.
#[derive(Debug, Clone, Default)]
pub struct LayoutPipeline {
    options: LayoutOptions,
}

impl LayoutPipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// The pipeline's options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Process an extracted document.
    pub fn process(&self, input: DocumentInput) -> Result<Document> {
        let pages = self.select(input.pages);
        self.run(input.name, pages)
    }

    /// Process every selected page a source provides.
    ///
    /// A page the source fails to deliver is reported like any other page
    /// failure.
    pub fn process_source<S: PageSource + Sync>(&self, source: &S) -> Result<Document> {
        let numbers: Vec<u32> = source
            .page_numbers()
            .into_iter()
            .filter(|n| self.options.pages.includes(*n))
            .collect();
        let pages = self.map_pages(numbers, |n| {
            let page = source
                .page(n)
                .map_err(|e| Error::Collaborator(format!("page extraction failed: {}", e)));
            (n, page)
        });
        self.run(source.name().map(String::from), pages)
    }

    /// Process a single page in isolation.
    ///
    /// Without other pages there is no recurrence to detect, so only
    /// header and footer regions proposed by the layout model are excluded.
    pub fn process_page(&self, page: &PageInput) -> Result<Page> {
        let draft = self.draft(page).map_err(|e| e.on_page(page.number))?;
        Ok(self.finish(draft))
    }

    fn run(&self, name: Option<String>, pages: Vec<(u32, Result<PageInput>)>) -> Result<Document> {
        log::debug!("Processing {} pages", pages.len());
        let mut document = Document {
            name,
            ..Document::default()
        };

        for (number, outcome) in self.outcomes(pages) {
            match outcome {
                Ok(page) => document.pages.push(page),
                Err(e) => {
                    let e = e.on_page(number);
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("{}", e);
                    document.failures.push(PageFailure {
                        page: number,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(document)
    }

    pub(crate) fn select(&self, pages: Vec<PageInput>) -> Vec<(u32, Result<PageInput>)> {
        pages
            .into_iter()
            .filter(|p| self.options.pages.includes(p.number))
            .map(|p| (p.number, Ok(p)))
            .collect()
    }

    fn outcomes(&self, pages: Vec<(u32, Result<PageInput>)>) -> Vec<(u32, Result<Page>)> {
        let mut drafts = self.drafts(pages);
        self.mark_headers_footers(&mut drafts);
        self.map_pages(drafts, |(n, draft)| (n, draft.map(|d| self.finish(d))))
    }

    fn map_pages<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync + Send,
    {
        if self.options.parallel {
            items.into_par_iter().map(f).collect()
        } else {
            items.into_iter().map(f).collect()
        }
    }

    /// Phase one for every page.
    pub(crate) fn drafts(
        &self,
        pages: Vec<(u32, Result<PageInput>)>,
    ) -> Vec<(u32, Result<PageDraft>)> {
        self.map_pages(pages, |(n, page)| (n, page.and_then(|p| self.draft(&p))))
    }

    /// The barrier: flag recurring blocks across every successful page.
    pub(crate) fn mark_headers_footers(&self, drafts: &mut [(u32, Result<PageDraft>)]) {
        let detector = HeaderFooterDetector::new(&self.options.header_footer);
        let canonical = {
            let all: Vec<&Block> = drafts
                .iter()
                .filter_map(|(_, d)| d.as_ref().ok())
                .flat_map(|d| d.blocks.iter())
                .collect();
            detector.analyze(&all)
        };
        if let Some(canonical) = canonical {
            for (_, draft) in drafts.iter_mut() {
                if let Ok(draft) = draft {
                    detector.mark(&canonical, &mut draft.blocks);
                }
            }
        }
    }

    /// Phase one for a single page.
    pub(crate) fn draft(&self, input: &PageInput) -> Result<PageDraft> {
        let number = input.number;
        let artbox = input.artbox.normalized();
        if artbox.is_degenerate() {
            return Err(Error::MalformedInput(format!(
                "degenerate artwork bounds {:?}",
                input.artbox
            )));
        }

        let opts = &self.options;
        let mut diagnostics = Vec::new();

        let detections = match &input.detections {
            Some(model) => match detection::to_page_space(model, &artbox, &mut diagnostics) {
                Ok(candidates) => detection::select(&candidates, &opts.detection),
                Err(e) => {
                    log::warn!("Page {}: ignoring layout-model output: {}", number, e);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::CollaboratorFailure,
                        e.to_string(),
                    ));
                    PageDetections::default()
                }
            },
            None => PageDetections::default(),
        };

        let images = valid_images(input, &mut diagnostics);
        let drawings = valid_drawings(input, &mut diagnostics);

        let vector_regions =
            RegionMerger::new(&opts.region).merge(&drawings, &artbox, &input.text_line_rects());
        log::debug!(
            "Page {}: {} drawings merged into {} regions",
            number,
            drawings.len(),
            vector_regions.len()
        );

        let mut exclusions: Vec<Rect> = images
            .iter()
            .map(|(r, _)| *r)
            .chain(vector_regions.iter().copied())
            .collect();
        let detected_figures = FigureReconciler::new(&opts.reconcile).reconcile(
            &detections.figures,
            &exclusions,
            &mut diagnostics,
        );
        exclusions.extend(detected_figures.iter().copied());
        exclusions.extend(detections.tables.iter().copied());
        exclusions.extend(detections.header_footer.iter().copied());

        let ctx = BlockContext {
            exclusions: &exclusions,
            inline_equations: &detections.inline_equations,
            interline_equations: &detections.interline_equations,
            titles: &detections.titles,
            title_coverage: opts.detection.title_coverage,
        };
        let segmenter = ParagraphSegmenter::new(&opts.paragraph);
        let mut blocks = Vec::with_capacity(input.blocks.len());
        for (i, block) in input.blocks.iter().enumerate() {
            match segmenter.segment_block(block, &ctx, &mut diagnostics) {
                Ok(b) => blocks.push(b),
                Err(e) => {
                    log::warn!("Page {}: skipping block {}: {}", number, i, e);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::MalformedInput,
                        format!("block {}: {}", i, e),
                    ));
                }
            }
        }

        Ok(PageDraft {
            number,
            artbox,
            images,
            vector_regions,
            detected_figures,
            tables: detections.tables,
            equations: detections.interline_equations,
            blocks,
            diagnostics,
        })
    }

    /// Phase two: build content items and sort them.
    pub(crate) fn finish(&self, draft: PageDraft) -> Page {
        let PageDraft {
            number,
            artbox,
            images,
            vector_regions,
            detected_figures,
            tables,
            equations,
            blocks,
            mut diagnostics,
        } = draft;
        let opts = &self.options;
        let mut items = Vec::new();

        for block in &blocks {
            if block.status == BlockStatus::Overlap {
                continue;
            }
            if opts.drop_headers_footers && (block.is_header || block.is_footer) {
                continue;
            }
            for paragraph in block.paragraphs.iter().filter(|p| !p.is_empty()) {
                let item = ContentItem::text(paragraph.clone());
                place(item, &artbox, &mut items, &mut diagnostics);
            }
        }

        for (i, (rect, reference)) in images.into_iter().enumerate() {
            let reference = reference.unwrap_or_else(|| format!("img_{}_{}", number, i));
            let item = ContentItem::image(rect, reference, ImageKind::Embedded);
            place(item, &artbox, &mut items, &mut diagnostics);
        }

        let (pad_x, pad_y) = opts.region.padding;
        for (i, rect) in vector_regions.iter().enumerate() {
            let item = ContentItem::image(
                rect.expand(pad_x, pad_y),
                format!("svg_{}_{}", number, i),
                ImageKind::Vector,
            );
            place(item, &artbox, &mut items, &mut diagnostics);
        }

        for (i, rect) in detected_figures.iter().enumerate() {
            let item = ContentItem::image(
                *rect,
                format!("figure_only_{}_{}", number, i),
                ImageKind::Detected,
            );
            place(item, &artbox, &mut items, &mut diagnostics);
        }

        for (i, rect) in tables.iter().enumerate() {
            let item = ContentItem::table(*rect, format!("table_{}_{}", number, i));
            place(item, &artbox, &mut items, &mut diagnostics);
        }

        for (i, rect) in equations.iter().enumerate() {
            let item = ContentItem::image(
                *rect,
                format!("equation_{}_{}", number, i),
                ImageKind::Equation,
            );
            place(item, &artbox, &mut items, &mut diagnostics);
        }

        ReadingOrderSorter::new(&opts.reading_order).sort(&mut items);

        Page {
            number,
            artbox,
            blocks,
            items,
            diagnostics,
        }
    }
}

/// Clamp an item to the artwork bounds and keep it unless nothing remains.
fn place(
    mut item: ContentItem,
    artbox: &Rect,
    items: &mut Vec<ContentItem>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let clamped = item.rect.clamp_to(artbox);
    if clamped.is_degenerate() {
        log::warn!("Dropping item outside the artwork bounds: {:?}", item.rect);
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::MalformedInput,
            format!("item {:?} lies outside the artwork bounds", item.rect),
        ));
        return;
    }
    item.rect = clamped;
    items.push(item);
}

/// Normalized, non-degenerate, deduplicated image placements.
fn valid_images(
    input: &PageInput,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<(Rect, Option<String>)> {
    let mut seen = HashSet::new();
    let mut images = Vec::with_capacity(input.images.len());
    for (i, image) in input.images.iter().enumerate() {
        let rect = image.rect.normalized();
        if rect.is_degenerate() {
            log::warn!("Page {}: skipping degenerate image {}", input.number, i);
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedInput,
                format!("image {} has a degenerate rectangle {:?}", i, image.rect),
            ));
            continue;
        }
        if !seen.insert(rect.key()) {
            log::debug!("Page {}: duplicate image placement {:?}", input.number, rect);
            continue;
        }
        images.push((rect, image.reference.clone()));
    }
    images
}

/// Normalized drawing rectangles. Hairline strokes are kept since they
/// connect the parts of a figure; points are not.
fn valid_drawings(input: &PageInput, diagnostics: &mut Vec<Diagnostic>) -> Vec<Rect> {
    let mut drawings = Vec::with_capacity(input.drawings.len());
    for (i, drawing) in input.drawings.iter().enumerate() {
        if !drawing.is_finite() {
            log::warn!("Page {}: skipping non-finite drawing {}", input.number, i);
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedInput,
                format!("drawing {} has non-finite coordinates", i),
            ));
            continue;
        }
        let rect = drawing.normalized();
        if rect.width() == 0.0 && rect.height() == 0.0 {
            continue;
        }
        drawings.push(rect);
    }
    drawings
}
