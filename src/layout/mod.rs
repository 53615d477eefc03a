//! Layout reconstruction.
//!
//! Turns the unordered primitives of extracted pages into paragraphs,
//! figures and tables in reading order.

pub mod detection;
pub mod header_footer;
pub mod options;
pub mod paragraph;
pub mod pipeline;
pub mod reading_order;
pub mod reconcile;
pub mod region;
pub mod source;
pub mod streaming;

pub use detection::{Candidate, Category, PageDetections};
pub use header_footer::{Canonical, CommonBBox, HeaderFooterDetector};
pub use options::{
    DetectionConfig, ErrorMode, HeaderFooterConfig, LayoutOptions, PageSelection,
    ParagraphConfig, ReadingOrderConfig, ReconcileConfig, RegionConfig,
};
pub use paragraph::{
    BlockContext, ParagraphSegmenter, INLINE_EQUATION_PLACEHOLDER, INTERLINE_EQUATION_PLACEHOLDER,
};
pub use pipeline::LayoutPipeline;
pub use reading_order::{occlusion_ranks, ReadingOrderSorter};
pub use reconcile::{Coverage, FigureReconciler};
pub use region::{RegionCandidate, RegionMerger};
pub use source::{JsonSource, PageSource};
pub use streaming::PageEvent;

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();

/// NFC-normalize text and collapse runs of whitespace to a single space.
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    match WHITESPACE.get_or_init(|| Regex::new(r"\s+").ok()) {
        Some(re) => re.replace_all(composed.trim(), " ").into_owned(),
        None => composed.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  hello \n\t world  "), "hello world");
        assert_eq!(normalize_text("cafe\u{301}"), "caf\u{e9}");
        assert_eq!(normalize_text(""), "");
    }
}
