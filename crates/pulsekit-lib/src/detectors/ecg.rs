use crate::{
    correction::flag_artifacts,
    metrics::{
        histogram::IbiHistogram,
        hrv::{ibi_summary, IbiSummary},
    },
    signal::{IbiSeries, PeakSeries, SignalBuffer},
};
use serde::{Deserialize, Serialize};

/// Configurable parameters for hysteresis R-peak detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeakDetectorConfig {
    /// Minimum fall below the running maximum (and rise above the running
    /// minimum) before an extremum counts (mV).
    pub local_threshold: f64,
    /// Amplitude a candidate maximum must exceed to be accepted (mV).
    pub global_threshold: f64,
    /// Refractory period between accepted peaks (ms).
    pub min_rr_ms: f64,
}

impl Default for PeakDetectorConfig {
    fn default() -> Self {
        Self {
            local_threshold: 200.0,
            global_threshold: 500.0,
            min_rr_ms: 270.0,
        }
    }
}

/// Which extremum the hysteresis scan is currently tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seek {
    Max,
    Min,
}

/// Single forward pass local-maximum detector with hysteresis.
///
/// A candidate maximum is confirmed once the signal falls `local_threshold`
/// below it, and accepted when it exceeds `global_threshold` and lies more
/// than `min_rr_ms` after the last accepted peak. The refractory comparison
/// is against the last accepted peak, not the last candidate, and is waived
/// while fewer than two peaks have been accepted. Peaks are emitted in time
/// order, so the result is sorted by construction.
pub fn detect_peaks(signal: &SignalBuffer, cfg: &PeakDetectorConfig) -> PeakSeries {
    if signal.is_empty() {
        return PeakSeries::new();
    }

    let min_rr_s = cfg.min_rr_ms / 1000.0;
    let mut mx = signal.data[0];
    let mut mn = signal.data[0];
    let mut mxpos = 0.0;
    let mut seek = Seek::Max;
    let mut out: Vec<f64> = Vec::new();

    for (i, &curr) in signal.data.iter().enumerate() {
        let t = signal.time_at(i);

        if curr > mx {
            mx = curr;
            mxpos = t;
        }
        if curr < mn {
            mn = curr;
        }

        match seek {
            Seek::Max => {
                if curr < mx - cfg.local_threshold {
                    let refractory_ok = match out.last() {
                        Some(&last) if out.len() >= 2 => mxpos - last > min_rr_s,
                        _ => true,
                    };
                    if mx > cfg.global_threshold && refractory_ok {
                        out.push(mxpos);
                    }
                    mn = curr;
                    seek = Seek::Min;
                }
            }
            Seek::Min => {
                if curr > mn + cfg.local_threshold {
                    mx = curr;
                    mxpos = t;
                    seek = Seek::Max;
                }
            }
        }
    }

    PeakSeries { times: out }
}

/// Combined result of detection, interval derivation, and artifact flagging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionPipelineResult {
    pub fs: f64,
    pub sample_count: usize,
    pub peaks: PeakSeries,
    pub intervals: IbiSeries,
    pub artifacts: Vec<usize>,
    pub summary: IbiSummary,
    pub histogram: IbiHistogram,
}

/// Run detection, derive intervals, flag artifacts, and summarize in one shot.
pub fn run_detection_pipeline(
    signal: &SignalBuffer,
    cfg: &PeakDetectorConfig,
) -> DetectionPipelineResult {
    let peaks = detect_peaks(signal, cfg);
    let intervals = IbiSeries::from_peaks(&peaks);
    let artifacts = flag_artifacts(&intervals);
    let summary = ibi_summary(&intervals);
    let histogram = IbiHistogram::from_intervals(&intervals);
    DetectionPipelineResult {
        fs: signal.fs,
        sample_count: signal.len(),
        peaks,
        intervals,
        artifacts,
        summary,
        histogram,
    }
}
