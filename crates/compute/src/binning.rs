use foundation::color::{GREENS, Rgb};
use formats::table::Row;
use serde::{Deserialize, Serialize};

use crate::analysis::Statistics;

/// Equal-width steps between min and max.
pub const BIN_STEPS: usize = 7;
/// Boundaries per bin set; boundary `i` opens color tier `i`.
pub const BOUNDARY_COUNT: usize = BIN_STEPS + 1;

/// Ordered boundaries over the observed range of one metric.
///
/// Invariants:
/// - `boundaries[0] == min` and `boundaries[7] == max` exactly.
/// - Boundaries are non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSet {
    boundaries: [f64; BOUNDARY_COUNT],
}

impl BinSet {
    pub fn from_range(min: f64, max: f64) -> Self {
        let steps = BIN_STEPS as f64;
        let mut step = (max - min) / steps;
        if !step.is_finite() {
            // The span overflows for ranges wider than f64::MAX.
            step = max / steps - min / steps;
        }
        let mut boundaries = [min; BOUNDARY_COUNT];
        for i in 1..BIN_STEPS {
            // An infinite endpoint turns the interpolation into NaN; `max`
            // keeps the previous boundary then.
            boundaries[i] = (min + step * i as f64)
                .max(boundaries[i - 1])
                .min(max);
        }
        boundaries[BIN_STEPS] = max;
        Self { boundaries }
    }

    pub fn boundaries(&self) -> &[f64; BOUNDARY_COUNT] {
        &self.boundaries
    }

    pub fn min(&self) -> f64 {
        self.boundaries[0]
    }

    pub fn max(&self) -> f64 {
        self.boundaries[BIN_STEPS]
    }

    /// Boundaries rounded to two decimals, for labels only.
    pub fn display_boundaries(&self) -> [f64; BOUNDARY_COUNT] {
        self.boundaries.map(round2)
    }

    /// Tier of the highest boundary `v` reaches; 0 when it reaches none.
    pub fn tier_for(&self, v: f64) -> usize {
        self.boundaries
            .iter()
            .rposition(|&b| v >= b)
            .unwrap_or(0)
    }

    pub fn color_for(&self, v: f64) -> Rgb {
        GREENS[self.tier_for(v)]
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Bins over every numeric reading of `field` in `rows`. `None` when no row
/// has a numeric value, which callers render as "no coloring".
pub fn compute_bins<'a>(rows: impl IntoIterator<Item = &'a Row>, field: &str) -> Option<BinSet> {
    let values = Statistics::numeric_values(rows, field);
    let (min, max) = Statistics::min_max(&values)?;
    tracing::debug!(field, values = values.len(), min, max, "computed bins");
    Some(BinSet::from_range(min, max))
}
