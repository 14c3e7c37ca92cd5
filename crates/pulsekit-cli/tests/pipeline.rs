use assert_cmd::cargo::cargo_bin_cmd;
use pulsekit_lib::detectors::ecg::DetectionPipelineResult;
use pulsekit_lib::metrics::hrv::IbiSummary;
use pulsekit_lib::signal::PeakSeries;
use serde::Deserialize;
use std::{error::Error, fs, path::PathBuf};

#[derive(Deserialize)]
struct RepairOutput {
    inserted: usize,
    segment_ms: f64,
    peaks: PeakSeries,
}

#[test]
fn detect_reports_spike_times() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let signal = write_lines(
        dir.path().join("signal.txt"),
        &["0", "0", "0", "10", "0", "0", "0", "10", "0", "0", "0"],
    )?;

    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args([
        "detect",
        "--fs",
        "10",
        "--local-threshold",
        "5",
        "--global-threshold",
        "5",
        "--min-rr-ms",
        "0",
        "--input",
        &signal,
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let peaks: PeakSeries = serde_json::from_slice(&output)?;

    assert_eq!(peaks.times.len(), 2);
    assert_close(peaks.times[0], 0.3, 1e-9);
    assert_close(peaks.times[1], 0.7, 1e-9);

    let out = dir.path().join("peaks.txt");
    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args([
        "detect",
        "--fs",
        "10",
        "--local-threshold",
        "5",
        "--global-threshold",
        "5",
        "--min-rr-ms",
        "0",
        "--input",
        &signal,
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();
    assert_eq!(fs::read_to_string(&out)?, "0.3\n0.7\n");
    Ok(())
}

#[test]
fn intervals_export_is_one_value_per_line() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let peaks = write_lines(
        dir.path().join("peaks.txt"),
        &["0", "0.5", "1", "3", "3.5"],
    )?;
    let out = dir.path().join("recording_ibi.txt");

    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args([
        "intervals",
        "--input",
        &peaks,
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();

    assert_eq!(fs::read_to_string(&out)?, "500\n500\n2000\n500\n");
    Ok(())
}

#[test]
fn artifacts_flags_long_gap_and_recovery() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let ibi = write_lines(
        dir.path().join("ibi.txt"),
        &["800", "800", "2400", "800"],
    )?;

    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args(["artifacts", "--input", &ibi]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let flagged: Vec<usize> = serde_json::from_slice(&output)?;

    assert_eq!(flagged, vec![2, 3]);
    Ok(())
}

#[test]
fn artifacts_accepts_peak_times() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let peaks = write_lines(
        dir.path().join("peaks.txt"),
        &["0", "0.5", "1", "3", "3.5"],
    )?;

    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args(["artifacts", "--input", &peaks, "--peaks"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let flagged: Vec<usize> = serde_json::from_slice(&output)?;

    assert_eq!(flagged, vec![2, 3]);
    Ok(())
}

#[test]
fn repair_subdivides_flagged_gap() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let peaks = write_lines(
        dir.path().join("peaks.txt"),
        &["0", "0.5", "1", "3", "3.5"],
    )?;

    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args(["repair", "--input", &peaks, "--index", "2", "--fs", "2"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let repaired: RepairOutput = serde_json::from_slice(&output)?;

    assert_eq!(repaired.inserted, 3);
    assert_close(repaired.segment_ms, 500.0, 1e-9);
    assert_eq!(
        repaired.peaks.times,
        vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]
    );
    Ok(())
}

#[test]
fn repair_refuses_single_beat_gap() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let peaks = write_lines(dir.path().join("peaks.txt"), &["0", "0.5", "1.1"])?;

    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args(["repair", "--input", &peaks, "--index", "1"]);
    cmd.assert().failure();
    Ok(())
}

#[test]
fn pipeline_summarizes_detection() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let signal = write_lines(
        dir.path().join("signal.txt"),
        &["0", "0", "0", "10", "0", "0", "0", "10", "0", "0", "0"],
    )?;

    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.args([
        "pipeline",
        "--fs",
        "10",
        "--local-threshold",
        "5",
        "--global-threshold",
        "5",
        "--min-rr-ms",
        "0",
        "--input",
        &signal,
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let result: DetectionPipelineResult = serde_json::from_slice(&output)?;

    assert_close(result.fs, 10.0, 1e-12);
    assert_eq!(result.sample_count, 11);
    assert_eq!(result.peaks.times.len(), 2);
    assert_eq!(result.intervals.ms.len(), 1);
    assert_close(result.intervals.ms[0], 400.0, 1e-9);
    assert!(result.artifacts.is_empty());
    assert_eq!(result.summary.n, 1);
    assert_eq!(result.histogram.counts.iter().sum::<u32>(), 1);
    Ok(())
}

#[test]
fn summary_reads_stdin() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("pulsekit");
    cmd.arg("summary");
    cmd.write_stdin("800\n860\n920\n");
    let output = cmd.assert().success().get_output().stdout.clone();
    let summary: IbiSummary = serde_json::from_slice(&output)?;

    assert_eq!(summary.n, 3);
    assert_close(summary.mean_ms, 860.0, 1e-9);
    assert_close(summary.rmssd_ms, 60.0, 1e-9);
    assert_close(summary.pnn50, 1.0, 1e-9);
    Ok(())
}

fn assert_close(a: f64, b: f64, tol: f64) {
    let diff = (a - b).abs();
    assert!(
        diff <= tol,
        "diff {} exceeded tol {} ({} vs {})",
        diff,
        tol,
        a,
        b
    );
}

fn write_lines(path: PathBuf, lines: &[&str]) -> Result<String, Box<dyn Error>> {
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(&path, text)?;
    Ok(path.to_string_lossy().to_string())
}
