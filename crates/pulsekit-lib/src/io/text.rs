use crate::signal::{IbiSeries, PeakSeries};
use anyhow::{Context, Result};
use std::path::Path;

/// Parse newline-delimited floating point series, ignoring blank/comment lines.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not f64: {}", idx + 1, trimmed))?;
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

/// Read a newline-delimited floating point series from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

/// Read peak times in seconds, one per line.
pub fn read_peak_series(path: &Path) -> Result<PeakSeries> {
    Ok(PeakSeries::from_times(read_f64_series(path)?))
}

/// Read interbeat intervals in milliseconds, one per line.
pub fn read_ibi_series(path: &Path) -> Result<IbiSeries> {
    Ok(IbiSeries {
        ms: read_f64_series(path)?,
    })
}

/// Render one value per line. Whole values drop their fraction, so 800.0
/// serializes as `800` followed by a newline.
pub fn format_value_lines(values: &[f64]) -> String {
    let mut out = String::new();
    for v in values {
        out.push_str(&v.to_string());
        out.push('\n');
    }
    out
}

/// Export intervals in the line-per-value interchange format.
pub fn write_ibi_series(path: &Path, intervals: &IbiSeries) -> Result<()> {
    std::fs::write(path, format_value_lines(&intervals.ms))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Export peak times (seconds), one per line.
pub fn write_peak_series(path: &Path, peaks: &PeakSeries) -> Result<()> {
    std::fs::write(path, format_value_lines(&peaks.times))
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_series_skipping_blanks_and_comments() {
        let text = "# recorded at 250 Hz\n812.5\n\n790\n# trailing note\n805.25\n";
        let values = parse_f64_series(text).expect("valid series");
        assert_eq!(values, vec![812.5, 790.0, 805.25]);
    }

    #[test]
    fn rejects_non_numeric_lines_with_position() {
        let err = parse_f64_series("800\noops\n").expect_err("invalid line");
        assert!(err.to_string().contains("line 2"));
        assert!(parse_f64_series("\n# nothing\n").is_err());
    }

    #[test]
    fn export_format_is_one_trimmed_value_per_line() {
        let values = [800.0, 800.0, 2400.0, 800.0];
        assert_eq!(format_value_lines(&values), "800\n800\n2400\n800\n");
        assert_eq!(format_value_lines(&[812.5]), "812.5\n");
        assert_eq!(format_value_lines(&[]), "");
    }

    #[test]
    fn intervals_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recording_ibi.txt");
        let intervals = IbiSeries {
            ms: vec![500.0, 500.0, 2000.0, 500.0],
        };
        write_ibi_series(&path, &intervals).expect("write");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text, "500\n500\n2000\n500\n");
        let loaded = read_ibi_series(&path).expect("parse");
        assert_eq!(loaded.ms, intervals.ms);
    }

    #[test]
    fn peak_files_are_sorted_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("peaks.txt");
        std::fs::write(&path, "0.8\n0.2\n0.5\n").expect("write");
        let peaks = read_peak_series(&path).expect("parse");
        assert_eq!(peaks.times, vec![0.2, 0.5, 0.8]);
        assert!(peaks.is_strictly_increasing());
    }
}
