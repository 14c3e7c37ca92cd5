use crate::signal::IbiSeries;
use serde::{Deserialize, Serialize};

/// Time-domain summary of an interbeat interval series (milliseconds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IbiSummary {
    pub n: usize,
    pub mean_ms: f64,
    pub sdnn_ms: f64,
    pub rmssd_ms: f64,
    pub pnn50: f64,
}

pub fn ibi_summary(intervals: &IbiSeries) -> IbiSummary {
    let n = intervals.ms.len();
    let mean_ms = if n > 0 {
        intervals.ms.iter().sum::<f64>() / n as f64
    } else {
        0.0
    };
    let sdnn_ms = if n > 1 {
        let mean = mean_ms;
        (intervals
            .ms
            .iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / (n as f64 - 1.0))
            .sqrt()
    } else {
        0.0
    };
    let rmssd_ms = if n > 1 {
        let diffs = intervals.ms.windows(2).map(|w| (w[1] - w[0]).powi(2));
        (diffs.sum::<f64>() / (n as f64 - 1.0)).sqrt()
    } else {
        0.0
    };
    let pnn50 = if n > 1 {
        let count = intervals
            .ms
            .windows(2)
            .filter(|w| (w[1] - w[0]).abs() > 50.0)
            .count();
        (count as f64) / (n as f64 - 1.0)
    } else {
        0.0
    };

    IbiSummary {
        n,
        mean_ms,
        sdnn_ms,
        rmssd_ms,
        pnn50,
    }
}
