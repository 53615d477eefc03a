//! Figure reconciliation between the layout model and geometric detection.
//!
//! The model and the region merger disagree on granularity: one may see a
//! single figure where the other sees three fragments. A model figure is
//! kept as a standalone region only when the known image and vector regions
//! do not already explain it.

use super::options::ReconcileConfig;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::geometry::Rect;

/// Outcome of comparing one candidate against one reference region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coverage {
    /// The reference accounts for the candidate
    Explained,
    /// Share of the candidate's area covered by the reference
    Partial(f32),
}

/// Decides which model figures are new.
pub struct FigureReconciler<'a> {
    config: &'a ReconcileConfig,
}

impl<'a> FigureReconciler<'a> {
    /// Create a reconciler with the given thresholds.
    pub fn new(config: &'a ReconcileConfig) -> Self {
        Self { config }
    }

    /// Compare a model candidate against one reference region.
    pub fn coverage(&self, candidate: &Rect, reference: &Rect) -> Coverage {
        if candidate.same(reference) || candidate.contains(reference) || reference.contains(candidate)
        {
            return Coverage::Explained;
        }
        let (ratio_c, ratio_r) = candidate.overlap_ratio(reference);
        let (lo, hi) = (ratio_c.min(ratio_r), ratio_c.max(ratio_r));
        let c = self.config;
        if (ratio_c >= c.both_ratio && ratio_r >= c.both_ratio)
            || hi >= c.either_ratio
            || (lo >= c.min_ratio && hi >= c.max_ratio)
        {
            Coverage::Explained
        } else {
            Coverage::Partial(ratio_c)
        }
    }

    /// Return the candidates no reference region explains, in input order.
    ///
    /// A candidate overlapped by several fragments whose coverage adds up to
    /// the mass ratio counts as explained. Candidates with some but too
    /// little coverage are kept and reported as ambiguous.
    pub fn reconcile(
        &self,
        candidates: &[Rect],
        references: &[Rect],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Rect> {
        let mut unexplained = Vec::new();

        'candidates: for candidate in candidates {
            let mut mass = 0.0f32;
            for reference in references {
                match self.coverage(candidate, reference) {
                    Coverage::Explained => continue 'candidates,
                    Coverage::Partial(ratio) => mass += ratio,
                }
            }

            if mass >= self.config.mass_ratio {
                log::debug!("Figure {:?} covered by fragments ({:.2})", candidate, mass);
                continue;
            }

            if mass > 0.0 {
                log::warn!(
                    "Figure {:?} only partly covered ({:.2}); keeping it as a separate region",
                    candidate,
                    mass
                );
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::RegionMergeAmbiguous,
                    format!("figure {:?} partly overlaps known regions ({:.2})", candidate, mass),
                ));
            }
            unexplained.push(*candidate);
        }

        unexplained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconcile(candidates: &[Rect], references: &[Rect]) -> (Vec<Rect>, Vec<Diagnostic>) {
        let config = ReconcileConfig::default();
        let mut diags = Vec::new();
        let out = FigureReconciler::new(&config).reconcile(candidates, references, &mut diags);
        (out, diags)
    }

    #[test]
    fn test_identical_and_contained_are_explained() {
        let fig = Rect::new(100.0, 100.0, 300.0, 300.0);
        let (out, _) = reconcile(&[fig], &[fig]);
        assert!(out.is_empty());

        let (out, _) = reconcile(&[fig], &[Rect::new(150.0, 150.0, 160.0, 160.0)]);
        assert!(out.is_empty());

        let (out, _) = reconcile(&[fig], &[Rect::new(0.0, 0.0, 400.0, 400.0)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_overlap_thresholds() {
        let config = ReconcileConfig::default();
        let r = FigureReconciler::new(&config);
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);

        // Half of each
        assert_eq!(r.coverage(&a, &Rect::new(50.0, 0.0, 150.0, 100.0)), Coverage::Explained);
        // 0.45 of the candidate, 0.65 of the reference
        let b = Rect::new(55.0, 0.0, 124.23077, 100.0);
        assert_eq!(r.coverage(&a, &b), Coverage::Explained);
        // A quarter of each
        assert_eq!(
            r.coverage(&a, &Rect::new(50.0, 50.0, 150.0, 150.0)),
            Coverage::Partial(0.25)
        );
    }

    #[test]
    fn test_fragments_add_up() {
        let fig = Rect::new(0.0, 0.0, 100.0, 100.0);
        // Three strips each covering a quarter of the figure and sticking out
        let refs = [
            Rect::new(-100.0, 0.0, 25.0, 100.0),
            Rect::new(25.0, -300.0, 50.0, 100.0),
            Rect::new(50.0, -300.0, 75.0, 100.0),
        ];
        let (out, diags) = reconcile(&[fig], &refs);
        assert!(out.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unexplained_figure_is_kept() {
        let fig = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (out, diags) = reconcile(&[fig], &[Rect::new(500.0, 500.0, 600.0, 600.0)]);
        assert_eq!(out, vec![fig]);
        assert!(diags.is_empty());

        let (out, diags) = reconcile(&[fig], &[Rect::new(50.0, 50.0, 150.0, 150.0)]);
        assert_eq!(out, vec![fig]);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::RegionMergeAmbiguous);
    }
}
