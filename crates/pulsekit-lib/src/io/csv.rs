use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Read one named column of a delimited file as an f64 series. The column
/// is located by case-insensitive header match.
pub fn read_column(path: &Path, column: &str, delimiter: u8) -> Result<Vec<f64>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(file);
    let headers = reader.headers().context("reading header")?.clone();

    let idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or_else(|| anyhow::anyhow!("column {:?} not found in {}", column, path.display()))?;

    let mut out = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.context("reading record")?;
        let field = record
            .get(idx)
            .ok_or_else(|| anyhow::anyhow!("row {} is missing column {:?}", row + 1, column))?;
        let value: f64 = field
            .trim()
            .parse()
            .with_context(|| format!("row {} is not f64: {}", row + 1, field))?;
        out.push(value);
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found in column {:?}", column);
    }
    Ok(out)
}
