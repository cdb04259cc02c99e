//! Mean and median helpers for score aggregation.

use serde::Serialize;

/// Arithmetic mean, `None` for an empty slice.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Median with the two central values it was computed from.
///
/// For an odd count `low == high`; for an even count they are the two
/// central sorted values and `value` is their mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Median {
    pub value: f64,
    pub low: f64,
    pub high: f64,
}

impl Median {
    /// Median of `values`, `None` for an empty slice.
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let (low, high) = if n % 2 == 1 {
            (sorted[n / 2], sorted[n / 2])
        } else {
            (sorted[n / 2 - 1], sorted[n / 2])
        };

        Some(Self {
            value: (low + high) / 2.0,
            low,
            high,
        })
    }
}
