//! Axis-aligned rectangle primitives.
//!
//! All coordinates use a top-left origin with y increasing downward. Every
//! predicate in the crate goes through this module so that containment and
//! overlap mean the same thing everywhere.

use serde::{Deserialize, Serialize};

/// Rectangles thinner than this (in either direction) are treated as lines.
pub const LINE_THICKNESS: f32 = 3.0;

/// Rectangles at least this elongated are treated as lines.
pub const LINE_ASPECT_RATIO: f32 = 30.0;

/// An axis-aligned bounding box `(x0, y0, x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from its edges, as given.
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from two arbitrary corners, swapping edges so that
    /// `x0 <= x1` and `y0 <= y1`.
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    /// Return a copy with edges swapped into canonical order.
    pub fn normalized(&self) -> Self {
        Self::from_corners(self.x0, self.y0, self.x1, self.y1)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the rectangle (zero for inverted rectangles).
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// A rectangle is degenerate when it has no interior: `x0 >= x1` or `y0 >= y1`,
    /// or any coordinate is not finite.
    pub fn is_degenerate(&self) -> bool {
        !self.is_finite() || self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Exact equality of all four edges.
    pub fn same(&self, other: &Rect) -> bool {
        self.x0 == other.x0 && self.y0 == other.y0 && self.x1 == other.x1 && self.y1 == other.y1
    }

    /// Equality of all four edges within `tolerance`.
    pub fn approx_eq(&self, other: &Rect, tolerance: f32) -> bool {
        (self.x0 - other.x0).abs() <= tolerance
            && (self.y0 - other.y0).abs() <= tolerance
            && (self.x1 - other.x1).abs() <= tolerance
            && (self.y1 - other.y1).abs() <= tolerance
    }

    /// Whether `other` lies inside this rectangle. Boundaries are inclusive.
    pub fn contains(&self, other: &Rect) -> bool {
        self.x0 <= other.x0
            && other.x0 <= other.x1
            && other.x1 <= self.x1
            && self.y0 <= other.y0
            && other.y0 <= other.y1
            && other.y1 <= self.y1
    }

    /// Whether the two rectangles share at least one point. Touching edges count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x0.max(other.x0) <= self.x1.min(other.x1)
            && self.y0.max(other.y0) <= self.y1.min(other.y1)
    }

    /// Intersection area divided by each rectangle's own area.
    ///
    /// Returns `(0.0, 0.0)` when the rectangles are disjoint or either has zero area.
    pub fn overlap_ratio(&self, other: &Rect) -> (f32, f32) {
        if !self.overlaps(other) {
            return (0.0, 0.0);
        }
        let area_a = self.area();
        let area_b = other.area();
        if area_a == 0.0 || area_b == 0.0 {
            return (0.0, 0.0);
        }
        let inter = (self.x1.min(other.x1) - self.x0.max(other.x0))
            * (self.y1.min(other.y1) - self.y0.max(other.y0));
        (inter / area_a, inter / area_b)
    }

    /// Whether the rectangle is thin or elongated enough to be a rule line.
    pub fn is_line(&self) -> bool {
        let width = self.width();
        let height = self.height();
        if width <= LINE_THICKNESS || height <= LINE_THICKNESS {
            return true;
        }
        width / height >= LINE_ASPECT_RATIO || height / width >= LINE_ASPECT_RATIO
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow the rectangle by `dx` horizontally and `dy` vertically on each side.
    pub fn expand(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x0: self.x0 - dx,
            y0: self.y0 - dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// Clamp the rectangle to `bounds`.
    pub fn clamp_to(&self, bounds: &Rect) -> Rect {
        Rect {
            x0: self.x0.max(bounds.x0),
            y0: self.y0.max(bounds.y0),
            x1: self.x1.min(bounds.x1),
            y1: self.y1.min(bounds.y1),
        }
    }

    /// Whether this rectangle lies entirely to the left of `other`.
    pub fn is_left_of(&self, other: &Rect) -> bool {
        self.x1 <= other.x0
    }

    /// Whether this rectangle lies entirely above `other`.
    pub fn is_above(&self, other: &Rect) -> bool {
        self.y1 <= other.y0
    }

    /// Bit-exact key for hashing identical rectangles.
    pub(crate) fn key(&self) -> [u32; 4] {
        [
            self.x0.to_bits(),
            self.y0.to_bits(),
            self.x1.to_bits(),
            self.y1.to_bits(),
        ]
    }
}

/// Fold a sequence of rectangles into their union. `None` for an empty input.
pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects
        .into_iter()
        .fold(None, |acc: Option<Rect>, r| match acc {
            Some(u) => Some(u.union(r)),
            None => Some(*r),
        })
}

/// Overlap of two 1-D spans `[a0, a1]` and `[b0, b1]` as a share of each span's length.
///
/// Returns `(0.0, 0.0)` when the spans are disjoint or either has zero length.
pub fn span_overlap_ratio(a0: f32, a1: f32, b0: f32, b1: f32) -> (f32, f32) {
    if a0.max(b0) > a1.min(b1) {
        return (0.0, 0.0);
    }
    if a0 == a1 || b0 == b1 {
        return (0.0, 0.0);
    }
    let overlap = a1.min(b1) - a0.max(b0);
    (overlap / (a1 - a0), overlap / (b1 - b0))
}
