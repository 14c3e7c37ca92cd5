use crate::signal::IbiSeries;
use serde::{Deserialize, Serialize};

/// Width of one histogram bin (ms).
pub const BIN_WIDTH_MS: f64 = 10.0;

/// Fixed-width interbeat interval histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbiHistogram {
    /// Bin centers in ms, at `i * 10 + 5`.
    pub centers_ms: Vec<f64>,
    /// Interval count per bin.
    pub counts: Vec<u32>,
}

impl IbiHistogram {
    /// Bin the series into 10 ms buckets covering 0 up to the longest
    /// interval. An empty series produces an empty histogram.
    pub fn from_intervals(intervals: &IbiSeries) -> Self {
        let max = intervals
            .ms
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() || max < 0.0 {
            return Self {
                centers_ms: Vec::new(),
                counts: Vec::new(),
            };
        }

        let bins = (max / BIN_WIDTH_MS).floor() as usize + 1;
        let mut counts = vec![0u32; bins];
        for &ms in &intervals.ms {
            if ms >= 0.0 {
                let bin = ((ms / BIN_WIDTH_MS).floor() as usize).min(bins - 1);
                counts[bin] += 1;
            }
        }
        let centers_ms = (0..bins)
            .map(|i| i as f64 * BIN_WIDTH_MS + BIN_WIDTH_MS / 2.0)
            .collect();

        Self { centers_ms, counts }
    }
}
