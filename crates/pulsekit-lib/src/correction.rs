use crate::signal::{IbiSeries, PeakSeries};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative deviation from the preceding interval that marks an artifact.
pub const ARTIFACT_TOLERANCE: f64 = 0.2;

/// Flag intervals deviating from their predecessor by more than
/// [`ARTIFACT_TOLERANCE`]. Index 0 has no predecessor and is never flagged.
pub fn flag_artifacts(intervals: &IbiSeries) -> Vec<usize> {
    let mut flagged = Vec::new();
    for i in 1..intervals.ms.len() {
        if (intervals.ms[i] - intervals.ms[i - 1]).abs() > ARTIFACT_TOLERANCE * intervals.ms[i - 1]
        {
            flagged.push(i);
        }
    }
    flagged
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepairError {
    #[error("interval index {0} does not exist")]
    BadIndex(usize),
    #[error("interval index {0} has no preceding reference interval")]
    NoReference(usize),
    #[error("nothing to repair: gap fits a single beat")]
    NothingToRepair,
}

/// Plan for closing a flagged gap by equal subdivision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRepair {
    /// Time of the peak opening the flagged interval (s).
    pub start_s: f64,
    /// Length of each subdivided interval (ms).
    pub segment_ms: f64,
    /// Times of the synthetic peaks to insert (s).
    pub insert_times_s: Vec<f64>,
}

/// Subdivide the flagged interval `index` using the immediately preceding
/// interval as the presumed normal beat length.
///
/// With `n = round(gap / reference)` estimated beats across the gap, the
/// plan places `n - 1` synthetic peaks at equal spacing. `n <= 1` means the
/// gap fits a single beat and there is nothing to insert.
pub fn plan_gap_repair(peaks: &PeakSeries, index: usize) -> Result<GapRepair, RepairError> {
    let intervals = IbiSeries::from_peaks(peaks);
    if index >= intervals.len() {
        return Err(RepairError::BadIndex(index));
    }
    if index == 0 {
        return Err(RepairError::NoReference(index));
    }

    let reference = intervals.ms[index - 1];
    let gap = intervals.ms[index];
    if reference <= 0.0 {
        return Err(RepairError::NothingToRepair);
    }

    let n = (gap / reference).round();
    if n <= 1.0 {
        return Err(RepairError::NothingToRepair);
    }

    let segment_ms = gap / n;
    let start_s = peaks.times[index];
    let insert_times_s = (1..n as usize)
        .map(|j| start_s + j as f64 * segment_ms / 1000.0)
        .collect();

    Ok(GapRepair {
        start_s,
        segment_ms,
        insert_times_s,
    })
}
