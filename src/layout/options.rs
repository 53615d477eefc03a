//! Layout options and heuristic thresholds.
//!
//! Every threshold the algorithms use is a named constant here and the
//! default of a field on one of the per-stage config structs.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// A region covering at least this share of the page (while inside it) scores as full-page.
pub const PAGE_COVERAGE_RATIO: f32 = 0.7;
/// Minimum number of drawing elements in a figure region.
pub const MIN_REGION_ELEMENTS: usize = 3;
/// A region containing this many text-line rectangles is a false whole-page capture.
pub const MAX_REGION_TEXT_LINES: usize = 10;
/// Shared-axis overlap required to join adjacent regions.
pub const ADJACENCY_OVERLAP_RATIO: f32 = 0.7;
/// Maximum gap between adjacent regions that are joined.
pub const ADJACENCY_GAP: f32 = 20.0;
/// Horizontal padding added around merged vector regions.
pub const REGION_PADDING_X: f32 = 10.0;
/// Vertical padding added around merged vector regions.
pub const REGION_PADDING_Y: f32 = 5.0;

/// Overlap ratio both rectangles must reach to count as the same figure.
pub const RECONCILE_BOTH_RATIO: f32 = 0.5;
/// Overlap ratio either rectangle must reach to count as the same figure.
pub const RECONCILE_EITHER_RATIO: f32 = 0.8;
/// Lower ratio bound of the mixed reconciliation test.
pub const RECONCILE_MIN_RATIO: f32 = 0.4;
/// Upper ratio bound of the mixed reconciliation test.
pub const RECONCILE_MAX_RATIO: f32 = 0.6;
/// Accumulated overlap share at which a figure counts as covered by fragments.
pub const RECONCILE_MASS_RATIO: f32 = 0.7;

/// Vertical tolerance for combining extracted lines into one logical line.
pub const LINE_Y_TOLERANCE: f32 = 2.0;
/// Indentation, in character widths, that opens a paragraph.
pub const INDENT_CHARS: f32 = 1.0;
/// Right-edge tolerance, in character widths, for a full-width line.
pub const RIGHT_EDGE_CHARS: f32 = 1.2;
/// Vertical gap, in character heights, that opens a paragraph.
pub const GAP_FACTOR: f32 = 0.6;

/// Maximum height, in character heights, of a single-line block.
pub const SINGLE_LINE_HEIGHT: f32 = 1.5;
/// Minimum width, in character widths, of a single-line block.
pub const SINGLE_LINE_WIDTH: f32 = 10.0;
/// Header zone: blocks starting above this share of the page height.
pub const TOP_ZONE_RATIO: f32 = 0.25;
/// Footer zone: blocks ending below this share of the page height.
pub const BOTTOM_ZONE_RATIO: f32 = 0.75;
/// Minimum number of occurrences of a recurring rectangle.
pub const MIN_FREQUENCY: usize = 2;
/// Maximum number of canonical header or footer rectangles kept per zone.
pub const MAX_CANONICAL: usize = 3;
/// Per-edge tolerance when matching a block against a canonical rectangle.
pub const MATCH_TOLERANCE: f32 = 1.0;

/// Minimum base of the combined `idx_x * base + idx_y` sort key.
pub const SORT_KEY_BASE: u64 = 100_000;

/// Minimum score of a figure detection.
pub const FIGURE_THRESHOLD: f32 = 0.5;
/// Minimum score of a table detection.
pub const TABLE_THRESHOLD: f32 = 0.3;
/// Minimum score of a title detection.
pub const TITLE_THRESHOLD: f32 = 0.3;
/// Minimum score of an equation detection.
pub const EQUATION_THRESHOLD: f32 = 0.3;
/// Minimum score of a header, footer or page-number detection.
pub const HEADER_FOOTER_THRESHOLD: f32 = 0.5;
/// Share of a paragraph's area a title detection must cover.
pub const TITLE_COVERAGE_RATIO: f32 = 0.5;

/// Options for reconstructing a document.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Which pages to process
    pub pages: PageSelection,

    /// Whether header and footer blocks are left out of the content items
    pub drop_headers_footers: bool,

    /// Vector region merging
    pub region: RegionConfig,

    /// Figure reconciliation
    pub reconcile: ReconcileConfig,

    /// Paragraph segmentation
    pub paragraph: ParagraphConfig,

    /// Header and footer detection
    pub header_footer: HeaderFooterConfig,

    /// Reading-order sort
    pub reading_order: ReadingOrderConfig,

    /// Layout-model candidate filtering
    pub detection: DetectionConfig,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the whole document on the first page failure.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Keep or drop header and footer blocks from the content items.
    pub fn with_drop_headers_footers(mut self, drop: bool) -> Self {
        self.drop_headers_footers = drop;
        self
    }

    /// Set region merging config.
    pub fn with_region(mut self, config: RegionConfig) -> Self {
        self.region = config;
        self
    }

    /// Set figure reconciliation config.
    pub fn with_reconcile(mut self, config: ReconcileConfig) -> Self {
        self.reconcile = config;
        self
    }

    /// Set paragraph segmentation config.
    pub fn with_paragraph(mut self, config: ParagraphConfig) -> Self {
        self.paragraph = config;
        self
    }

    /// Set header and footer detection config.
    pub fn with_header_footer(mut self, config: HeaderFooterConfig) -> Self {
        self.header_footer = config;
        self
    }

    /// Set reading-order config.
    pub fn with_reading_order(mut self, config: ReadingOrderConfig) -> Self {
        self.reading_order = config;
        self
    }

    /// Set detection filtering config.
    pub fn with_detection(mut self, config: DetectionConfig) -> Self {
        self.detection = config;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            parallel: true,
            pages: PageSelection::All,
            drop_headers_footers: true,
            region: RegionConfig::default(),
            reconcile: ReconcileConfig::default(),
            paragraph: ParagraphConfig::default(),
            header_footer: HeaderFooterConfig::default(),
            reading_order: ReadingOrderConfig::default(),
            detection: DetectionConfig::default(),
        }
    }
}

/// What happens when a page fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Return the first page failure as the document result
    Strict,
    /// Record the failure and continue with the other pages
    #[default]
    Lenient,
}

/// Vector region merging thresholds.
#[derive(Debug, Clone)]
pub struct RegionConfig {
    /// Page share at which a region inside the page scores as full-page
    pub page_coverage: f32,
    /// Minimum number of drawing elements per region
    pub min_elements: usize,
    /// Text-line count at which a region is rejected
    pub max_text_lines: usize,
    /// Shared-axis overlap required for adjacency joins
    pub adjacency_overlap: f32,
    /// Maximum gap for adjacency joins
    pub adjacency_gap: f32,
    /// Padding `(dx, dy)` added to each finished region
    pub padding: (f32, f32),
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            page_coverage: PAGE_COVERAGE_RATIO,
            min_elements: MIN_REGION_ELEMENTS,
            max_text_lines: MAX_REGION_TEXT_LINES,
            adjacency_overlap: ADJACENCY_OVERLAP_RATIO,
            adjacency_gap: ADJACENCY_GAP,
            padding: (REGION_PADDING_X, REGION_PADDING_Y),
        }
    }
}

/// Figure reconciliation thresholds.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Ratio both sides must reach
    pub both_ratio: f32,
    /// Ratio either side must reach
    pub either_ratio: f32,
    /// Lower bound of the mixed test
    pub min_ratio: f32,
    /// Upper bound of the mixed test
    pub max_ratio: f32,
    /// Accumulated overlap share that explains a candidate
    pub mass_ratio: f32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            both_ratio: RECONCILE_BOTH_RATIO,
            either_ratio: RECONCILE_EITHER_RATIO,
            min_ratio: RECONCILE_MIN_RATIO,
            max_ratio: RECONCILE_MAX_RATIO,
            mass_ratio: RECONCILE_MASS_RATIO,
        }
    }
}

/// Paragraph segmentation thresholds, relative to block metrics.
#[derive(Debug, Clone)]
pub struct ParagraphConfig {
    /// Vertical tolerance for combining lines
    pub line_y_tolerance: f32,
    /// Indentation that opens a paragraph, in character widths
    pub indent_chars: f32,
    /// Right-edge tolerance, in character widths
    pub right_edge_chars: f32,
    /// Vertical gap that opens a paragraph, in character heights
    pub gap_factor: f32,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            line_y_tolerance: LINE_Y_TOLERANCE,
            indent_chars: INDENT_CHARS,
            right_edge_chars: RIGHT_EDGE_CHARS,
            gap_factor: GAP_FACTOR,
        }
    }
}

/// Header and footer detection thresholds.
#[derive(Debug, Clone)]
pub struct HeaderFooterConfig {
    /// Maximum single-line height, in character heights
    pub single_line_height: f32,
    /// Minimum single-line width, in character widths
    pub single_line_width: f32,
    /// Top zone as a share of page height
    pub top_zone: f32,
    /// Bottom zone as a share of page height
    pub bottom_zone: f32,
    /// Minimum recurrence count
    pub min_frequency: usize,
    /// Canonical rectangles kept per zone
    pub max_canonical: usize,
    /// Per-edge match tolerance
    pub match_tolerance: f32,
}

impl Default for HeaderFooterConfig {
    fn default() -> Self {
        Self {
            single_line_height: SINGLE_LINE_HEIGHT,
            single_line_width: SINGLE_LINE_WIDTH,
            top_zone: TOP_ZONE_RATIO,
            bottom_zone: BOTTOM_ZONE_RATIO,
            min_frequency: MIN_FREQUENCY,
            max_canonical: MAX_CANONICAL,
            match_tolerance: MATCH_TOLERANCE,
        }
    }
}

/// Reading-order sort settings.
#[derive(Debug, Clone)]
pub struct ReadingOrderConfig {
    /// Minimum base of the combined sort key
    pub key_base: u64,
}

impl Default for ReadingOrderConfig {
    fn default() -> Self {
        Self {
            key_base: SORT_KEY_BASE,
        }
    }
}

/// Per-category score thresholds for layout-model candidates.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Figures
    pub figure: f32,
    /// Tables
    pub table: f32,
    /// Titles
    pub title: f32,
    /// Inline and interline equations
    pub equation: f32,
    /// Headers, footers and page numbers
    pub header_footer: f32,
    /// Share of a paragraph's area a title must cover
    pub title_coverage: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            figure: FIGURE_THRESHOLD,
            table: TABLE_THRESHOLD,
            title: TITLE_THRESHOLD,
            equation: EQUATION_THRESHOLD,
            header_footer: HEADER_FOOTER_THRESHOLD,
            title_coverage: TITLE_COVERAGE_RATIO,
        }
    }
}

/// Page selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// One page (1-indexed)
    Single(u32),
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    List(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Single(p) => *p == page,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::List(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "3", "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());
        let number = |part: &str| -> Result<u32> {
            match part.trim().parse::<u32>() {
                Ok(0) | Err(_) => Err(invalid()),
                Ok(n) => Ok(n),
            }
        };

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let start = number(start)?;
                let end = number(end)?;
                if start > end {
                    return Err(invalid());
                }
                return Ok(PageSelection::Range(start..=end));
            }
            return Ok(PageSelection::Single(number(s)?));
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            if let Some((start, end)) = part.split_once('-') {
                let start = number(start)?;
                let end = number(end)?;
                if start > end {
                    return Err(invalid());
                }
                pages.extend(start..=end);
            } else {
                pages.push(number(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::List(pages))
    }
}
