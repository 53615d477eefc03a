//! Paragraph segmentation of text blocks.
//!
//! Lines are first combined when they share a vertical extent, then measured
//! (median left and right edges, character width, half line pitch) and
//! scanned with a two-state machine. All thresholds scale with the block's
//! own measurements, so the result does not depend on resolution or font size.

use super::options::ParagraphConfig;
use crate::error::{Diagnostic, DiagnosticKind, Error, Result};
use crate::geometry::Rect;
use crate::model::{Block, BlockMetrics, BlockStatus, Paragraph, RawLine, SourceBlock};

/// Text substituted for spans covered by an inline equation.
pub const INLINE_EQUATION_PLACEHOLDER: &str = "$equation_inline$";

/// Text substituted for spans covered by an interline equation.
pub const INTERLINE_EQUATION_PLACEHOLDER: &str = "$equation_interline$";

/// Page regions that affect how a block is segmented.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    /// Image, table, header and footer regions; an overlapping block is not segmented
    pub exclusions: &'a [Rect],
    /// Inline equation regions
    pub inline_equations: &'a [Rect],
    /// Interline equation regions
    pub interline_equations: &'a [Rect],
    /// Title regions
    pub titles: &'a [Rect],
    /// Share of a paragraph's area a title must cover
    pub title_coverage: f32,
}

impl Default for BlockContext<'_> {
    fn default() -> Self {
        Self {
            exclusions: &[],
            inline_equations: &[],
            interline_equations: &[],
            titles: &[],
            title_coverage: super::options::TITLE_COVERAGE_RATIO,
        }
    }
}

/// Median with the two middle values averaged for even lengths.
fn median(values: &mut [f32]) -> f32 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Measure a block from its interior lines (all but the first and last).
///
/// Returns `None` when the block has too few lines or no visible characters.
pub fn block_metrics(lines: &[RawLine]) -> Option<BlockMetrics> {
    if lines.len() <= 2 {
        return None;
    }

    let mut lefts = Vec::new();
    let mut rights = Vec::new();
    let mut char_widths = Vec::new();
    let mut char_heights = Vec::new();

    for i in 1..lines.len() - 1 {
        let r = &lines[i].rect;
        lefts.push(r.x0);
        rights.push(r.x1);

        let visible = lines[i].visible_chars();
        if visible > 0 {
            char_widths.push(r.width() / visible as f32);
        }

        if i > 1 {
            let prev = &lines[i - 1].rect;
            char_heights.push(((r.y0 - prev.y0) / 2.0).max((prev.y1 - r.y1) / 2.0));
        }
    }

    let metrics = BlockMetrics {
        left: median(&mut lefts),
        right: median(&mut rights),
        avg_char_width: mean(&char_widths),
        avg_char_height: mean(&char_heights),
    };
    metrics.is_measured().then_some(metrics)
}

/// Splits text blocks into paragraphs.
pub struct ParagraphSegmenter<'a> {
    config: &'a ParagraphConfig,
}

impl<'a> ParagraphSegmenter<'a> {
    /// Create a segmenter with the given thresholds.
    pub fn new(config: &'a ParagraphConfig) -> Self {
        Self { config }
    }

    /// Turn a block's source lines into raw lines, substituting equation
    /// placeholders for spans covered by equation regions.
    ///
    /// Lines with non-finite coordinates are dropped and reported.
    pub fn raw_lines(
        &self,
        block: &SourceBlock,
        ctx: &BlockContext<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<RawLine> {
        let mut out = Vec::with_capacity(block.lines.len());
        for (i, line) in block.lines.iter().enumerate() {
            if !line.rect.is_finite() {
                log::warn!("Skipping line {} with non-finite rectangle", i);
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MalformedInput,
                    format!("line {} of block {:?} has a non-finite rectangle", i, block.rect),
                ));
                continue;
            }

            let mut parts: Vec<&str> = Vec::with_capacity(line.spans.len());
            let mut last_placeholder: Option<&str> = None;
            for span in &line.spans {
                let rect = span.rect.normalized();
                let covered = |eqs: &[Rect]| eqs.iter().any(|e| rect.overlap_ratio(e).0 > 0.0);
                let placeholder = if covered(ctx.interline_equations) {
                    Some(INTERLINE_EQUATION_PLACEHOLDER)
                } else if covered(ctx.inline_equations) {
                    Some(INLINE_EQUATION_PLACEHOLDER)
                } else {
                    None
                };
                match placeholder {
                    Some(p) => {
                        if last_placeholder != Some(p) {
                            parts.push(p);
                        }
                        last_placeholder = Some(p);
                    }
                    None => {
                        parts.push(span.text.as_str());
                        last_placeholder = None;
                    }
                }
            }

            out.push(RawLine::new(line.rect.normalized(), parts.join(" ")));
        }
        out
    }

    /// Combine consecutive lines whose top and bottom edges both lie within
    /// the vertical tolerance of each other.
    pub fn combine_lines(&self, lines: Vec<RawLine>) -> Vec<RawLine> {
        let tol = self.config.line_y_tolerance;
        let mut combined: Vec<RawLine> = Vec::with_capacity(lines.len());
        for line in lines {
            if let Some(current) = combined.last_mut() {
                if (line.rect.y0 - current.rect.y0).abs() <= tol
                    && (line.rect.y1 - current.rect.y1).abs() <= tol
                {
                    current.rect = Rect::new(
                        current.rect.x0.min(line.rect.x0),
                        current.rect.y0,
                        current.rect.x1.max(line.rect.x1),
                        line.rect.y1,
                    );
                    current.text.push(' ');
                    current.text.push_str(&line.text);
                    continue;
                }
            }
            combined.push(line);
        }
        combined
    }

    /// Segment measured lines into paragraphs covering every line exactly once.
    pub fn segment_lines(&self, lines: &[RawLine], metrics: &BlockMetrics) -> Vec<Paragraph> {
        let acw = metrics.avg_char_width;
        let ach = metrics.avg_char_height;
        let indent = self.config.indent_chars * acw;
        let right_tol = self.config.right_edge_chars * acw;

        let indented = |r: &Rect| r.x0 > metrics.left + indent;
        let near_right = |r: &Rect| (r.x1 - metrics.right).abs() < right_tol;
        let gap_before = |r: &Rect, prev: Option<&Rect>| {
            ach > 0.0 && prev.is_some_and(|p| r.y0 - p.y1 > self.config.gap_factor * ach)
        };
        let ragged_end =
            |r: &Rect| (r.x0 - metrics.left).abs() < acw && r.x1 < metrics.right - indent;

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut open: Option<usize> = None;

        for (i, line) in lines.iter().enumerate() {
            let r = &line.rect;
            let prev = i.checked_sub(1).map(|p| &lines[p].rect);

            let by_indent = indented(r) && near_right(r);
            let by_gap = gap_before(r, prev);
            let after_end = !indented(r)
                && near_right(r)
                && prev.is_some_and(|p| (p.x1 - metrics.right).abs() > acw);

            match open {
                Some(start) if by_indent || by_gap => {
                    log::debug!("Paragraph {}..={} closed by a new start at {}", start, i - 1, i);
                    ranges.push((start, i - 1));
                    open = Some(i);
                }
                Some(start) if ragged_end(r) => {
                    ranges.push((start, i));
                    open = None;
                    continue;
                }
                Some(_) => continue,
                None if by_indent || by_gap || after_end => open = Some(i),
                None => continue,
            }

            // A line that opens a paragraph and also ends raggedly stands alone
            if ragged_end(r) {
                ranges.push((i, i));
                open = None;
            }
        }
        if let Some(start) = open {
            ranges.push((start, lines.len() - 1));
        }

        let mut paragraphs = Vec::with_capacity(ranges.len() * 2 + 1);
        let mut next = 0;
        for (start, end) in ranges {
            if start > next {
                paragraphs.push(Paragraph::from_lines(&lines[next..start], next, false));
            }
            paragraphs.push(Paragraph::from_lines(&lines[start..=end], start, true));
            next = end + 1;
        }
        if next < lines.len() {
            paragraphs.push(Paragraph::from_lines(&lines[next..], next, false));
        }
        paragraphs
    }

    /// Segment one text block.
    ///
    /// Fails with [`Error::MalformedInput`] for a degenerate block rectangle or
    /// a block without usable lines; the caller skips such blocks.
    pub fn segment_block(
        &self,
        block: &SourceBlock,
        ctx: &BlockContext<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Block> {
        let rect = block.rect.normalized();
        if rect.is_degenerate() {
            return Err(Error::MalformedInput(format!(
                "degenerate block rectangle {:?}",
                block.rect
            )));
        }
        if block.lines.is_empty() {
            return Err(Error::MalformedInput(format!("block {:?} has no lines", rect)));
        }

        let lines = self.combine_lines(self.raw_lines(block, ctx, diagnostics));
        if lines.is_empty() {
            return Err(Error::MalformedInput(format!(
                "block {:?} has no usable lines",
                rect
            )));
        }

        if ctx.exclusions.iter().any(|e| rect.overlaps(e)) {
            log::debug!("Block {:?} overlaps an excluded region", rect);
            let mut excluded = Block::new(
                rect,
                BlockMetrics::default(),
                vec![Paragraph::from_lines(&lines, 0, false)],
            );
            excluded.status = BlockStatus::Overlap;
            return Ok(excluded);
        }

        let metrics = block_metrics(&lines);
        let mut paragraphs = match &metrics {
            Some(m) => self.segment_lines(&lines, m),
            None => {
                if lines.len() > 2 {
                    log::warn!("Block {:?} has no measurable text", rect);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::MissingMetrics,
                        format!("block {:?} has no visible characters to measure", rect),
                    ));
                }
                vec![Paragraph::from_lines(&lines, 0, false)]
            }
        };

        for p in &mut paragraphs {
            p.is_title = ctx
                .titles
                .iter()
                .any(|t| p.rect.overlap_ratio(t).0 >= ctx.title_coverage);
        }

        Ok(Block::new(rect, metrics.unwrap_or_default(), paragraphs))
    }
}
