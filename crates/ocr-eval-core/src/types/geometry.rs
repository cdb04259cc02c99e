//! Pixel-space line geometry.

use serde::{Deserialize, Serialize};

/// Epsilon added to the `IoU` denominator so two degenerate boxes never divide by zero.
pub const IOU_EPSILON: f64 = 1e-6;

/// Axis-aligned line bounding box in image pixel space.
///
/// Boxes are closed pixel intervals: a box of width `w` covers `w + 1` pixel
/// columns, so its area is `(w + 1) * (h + 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineBox {
    /// Left edge
    pub x: i64,
    /// Top edge
    pub y: i64,
    /// Width in pixels (non-negative)
    pub width: i64,
    /// Height in pixels (non-negative)
    pub height: i64,
}

impl LineBox {
    #[inline]
    #[must_use]
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (inclusive), saturating at `i64::MAX`.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i64 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (inclusive), saturating at `i64::MAX`.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i64 {
        self.y.saturating_add(self.height)
    }

    /// Whether both far edges fit in `i64` without saturating.
    #[inline]
    #[must_use]
    pub const fn is_addressable(&self) -> bool {
        self.x.checked_add(self.width).is_some() && self.y.checked_add(self.height).is_some()
    }

    /// Pixel area under the closed-interval convention.
    #[inline]
    #[must_use = "returns the area of the line box"]
    pub fn area(&self) -> i128 {
        (i128::from(self.width) + 1).saturating_mul(i128::from(self.height) + 1)
    }

    /// Overlapping pixel area with another box, zero when disjoint.
    #[inline]
    #[must_use = "returns the overlap area with another line box"]
    pub fn intersection_area(&self, other: &Self) -> i128 {
        let span = |start_a: i64, end_a: i64, start_b: i64, end_b: i64| {
            let start = i128::from(start_a.max(start_b));
            let end = i128::from(end_a.min(end_b));
            (end - start + 1).max(0)
        };
        let columns = span(self.x, self.right(), other.x, other.right());
        let rows = span(self.y, self.bottom(), other.y, other.bottom());
        columns.saturating_mul(rows)
    }

    /// Intersection-over-union with another box, in `[0, 1)`.
    ///
    /// Identical boxes score just under 1.0 because of [`IOU_EPSILON`].
    #[inline]
    #[must_use = "returns the IoU ratio with another line box"]
    #[allow(clippy::cast_precision_loss)] // ratio only, exactness beyond 2^52 is irrelevant
    pub fn intersection_over_union(&self, other: &Self) -> f64 {
        let overlap = self.intersection_area(other) as f64;
        let union = self.area() as f64 + other.area() as f64 - overlap;
        overlap / (union + IOU_EPSILON)
    }
}
