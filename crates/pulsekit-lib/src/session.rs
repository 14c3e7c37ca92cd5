use crate::{
    correction::{self, RepairError},
    detectors::ecg::{detect_peaks, PeakDetectorConfig},
    signal::{IbiSeries, PeakSeries, SignalBuffer},
};
use thiserror::Error;

/// Half-width of the search window used to refine a requested insertion
/// time to the nearest local maximum (seconds).
const REFINE_WINDOW_S: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no signal loaded")]
    NoSignal,
    #[error("time {0} s is outside the loaded signal")]
    OutOfRange(f64),
    #[error("a peak already exists at {0} s")]
    DuplicatePeak(f64),
    #[error(transparent)]
    Repair(#[from] RepairError),
}

/// Owns the loaded recording and its peak sequence.
///
/// The peak sequence is the only session-lifetime mutable state. All
/// operations are synchronous and single-threaded; the caller serializes
/// mutations.
#[derive(Debug, Default)]
pub struct Session {
    signal: Option<SignalBuffer>,
    peaks: PeakSeries,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a recording, replacing any previous one and dropping its peaks.
    pub fn open(&mut self, signal: SignalBuffer) {
        self.peaks.clear();
        self.signal = Some(signal);
    }

    /// Drop the recording and all peaks.
    pub fn close(&mut self) {
        self.signal = None;
        self.peaks.clear();
    }

    pub fn signal(&self) -> Option<&SignalBuffer> {
        self.signal.as_ref()
    }

    pub fn peaks(&self) -> &PeakSeries {
        &self.peaks
    }

    /// Re-detect peaks over the loaded signal. Replaces the whole sequence,
    /// manual edits included. Returns the number of detected peaks.
    pub fn detect(&mut self, cfg: &PeakDetectorConfig) -> Result<usize, SessionError> {
        let signal = self.signal.as_ref().ok_or(SessionError::NoSignal)?;
        self.peaks = detect_peaks(signal, cfg);
        Ok(self.peaks.len())
    }

    /// Insert a peak at `t`, snapped to the nearest sample boundary.
    /// Rejects times outside the recording and exact duplicates.
    /// Returns the snapped time actually inserted.
    pub fn insert_peak_at(&mut self, t: f64) -> Result<f64, SessionError> {
        let signal = self.signal.as_ref().ok_or(SessionError::NoSignal)?;
        if !signal.contains(t) {
            return Err(SessionError::OutOfRange(t));
        }
        let snapped = signal.snap_to_grid(t);
        if !self.peaks.insert(snapped) {
            return Err(SessionError::DuplicatePeak(snapped));
        }
        debug_assert!(self.peaks.is_strictly_increasing());
        Ok(snapped)
    }

    /// Insert a peak near `t`, refined to the local sample maximum within
    /// ±0.1 s. This is the programmatic half of click-insertion; mapping a
    /// screen position to a time stays with the presentation layer.
    pub fn insert_peak_near(&mut self, t: f64) -> Result<f64, SessionError> {
        let refined = {
            let signal = self.signal.as_ref().ok_or(SessionError::NoSignal)?;
            if !signal.contains(t) {
                return Err(SessionError::OutOfRange(t));
            }
            signal.local_max_near(t, REFINE_WINDOW_S).unwrap_or(t)
        };
        self.insert_peak_at(refined)
    }

    pub fn delete_peak_at(&mut self, index: usize) -> Option<f64> {
        self.peaks.remove_at(index)
    }

    pub fn delete_peaks_at(&mut self, indices: &[usize]) -> usize {
        self.peaks.remove_many_at(indices)
    }

    pub fn clear_peaks(&mut self) {
        self.peaks.clear();
    }

    /// Derive the interbeat intervals of the current peak sequence.
    pub fn intervals(&self) -> IbiSeries {
        IbiSeries::from_peaks(&self.peaks)
    }

    /// Indices of intervals flagged as artifacts.
    pub fn artifacts(&self) -> Vec<usize> {
        correction::flag_artifacts(&self.intervals())
    }

    /// Repair the flagged interval `index` by inserting synthetic peaks at
    /// equal subdivisions. Inserted times are snapped to the sample grid; a
    /// snap landing on an existing peak is skipped. Returns how many peaks
    /// were inserted. Intervals must be rederived afterwards.
    pub fn repair_gap(&mut self, index: usize) -> Result<usize, SessionError> {
        let plan = correction::plan_gap_repair(&self.peaks, index)?;
        let mut inserted = 0;
        for &t in &plan.insert_times_s {
            match self.insert_peak_at(t) {
                Ok(_) => inserted += 1,
                Err(SessionError::DuplicatePeak(_)) => {}
                Err(e) => return Err(e),
            }
        }
        debug_assert!(self.peaks.is_strictly_increasing());
        Ok(inserted)
    }
}
