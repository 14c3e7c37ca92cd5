use anyhow::Result;
use clap::{Parser, Subcommand};
use pulsekit_lib::{
    correction::{flag_artifacts, plan_gap_repair},
    detectors::ecg::{detect_peaks, run_detection_pipeline, PeakDetectorConfig},
    io::{csv as csv_io, text as text_io},
    metrics::{histogram::IbiHistogram, hrv::ibi_summary},
    signal::{IbiSeries, PeakSeries, SignalBuffer},
};
use serde::Serialize;
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "pulsekit",
    version,
    about = "ECG peak detection and interbeat interval tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect R-peaks from newline-delimited samples read from stdin or --input file
    Detect {
        #[arg(long, default_value_t = 250.0)]
        fs: f64,
        #[arg(long, default_value_t = 200.0)]
        local_threshold: f64,
        #[arg(long, default_value_t = 500.0)]
        global_threshold: f64,
        #[arg(long, default_value_t = 270.0)]
        min_rr_ms: f64,
        #[arg(long)]
        input: Option<PathBuf>,
        /// Read samples from this column of a delimited --input file
        #[arg(long)]
        csv_column: Option<String>,
        #[arg(long, default_value_t = ',')]
        csv_delimiter: char,
        /// Write one peak time per line to this file instead of JSON on stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Derive interbeat intervals (ms) from newline-delimited peak times (s)
    Intervals {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write one interval per line to this file instead of JSON on stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Flag intervals deviating more than 20% from their predecessor
    Artifacts {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Treat the input as peak times (s) instead of intervals (ms)
        #[arg(long, default_value_t = false)]
        peaks: bool,
    },
    /// Subdivide a flagged interval with evenly spaced synthetic peaks
    Repair {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Index of the flagged interval to repair
        #[arg(long)]
        index: usize,
        /// Snap inserted peaks to this sample rate's grid (Hz)
        #[arg(long)]
        fs: Option<f64>,
    },
    /// Run detection → intervals → artifacts → summary in one shot
    Pipeline {
        #[arg(long, default_value_t = 250.0)]
        fs: f64,
        #[arg(long, default_value_t = 200.0)]
        local_threshold: f64,
        #[arg(long, default_value_t = 500.0)]
        global_threshold: f64,
        #[arg(long, default_value_t = 270.0)]
        min_rr_ms: f64,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        csv_column: Option<String>,
        #[arg(long, default_value_t = ',')]
        csv_delimiter: char,
    },
    /// Time-domain summary of newline-delimited intervals (ms)
    Summary {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// 10 ms histogram of newline-delimited intervals (ms)
    Histogram {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect {
            fs,
            local_threshold,
            global_threshold,
            min_rr_ms,
            input,
            csv_column,
            csv_delimiter,
            out,
        } => cmd_detect(
            fs,
            local_threshold,
            global_threshold,
            min_rr_ms,
            input.as_deref(),
            csv_column.as_deref(),
            csv_delimiter,
            out.as_deref(),
        )?,
        Commands::Intervals { input, out } => cmd_intervals(input.as_deref(), out.as_deref())?,
        Commands::Artifacts { input, peaks } => cmd_artifacts(input.as_deref(), peaks)?,
        Commands::Repair { input, index, fs } => cmd_repair(input.as_deref(), index, fs)?,
        Commands::Pipeline {
            fs,
            local_threshold,
            global_threshold,
            min_rr_ms,
            input,
            csv_column,
            csv_delimiter,
        } => cmd_pipeline(
            fs,
            local_threshold,
            global_threshold,
            min_rr_ms,
            input.as_deref(),
            csv_column.as_deref(),
            csv_delimiter,
        )?,
        Commands::Summary { input } => cmd_summary(input.as_deref())?,
        Commands::Histogram { input } => cmd_histogram(input.as_deref())?,
    }
    Ok(())
}

fn read_samples(input: Option<&Path>) -> Result<Vec<f64>> {
    match input {
        Some(path) => text_io::read_f64_series(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_f64_series(&buf)
        }
    }
}

fn read_peaks(input: Option<&Path>) -> Result<PeakSeries> {
    Ok(PeakSeries::from_times(read_samples(input)?))
}

fn read_intervals(input: Option<&Path>) -> Result<IbiSeries> {
    Ok(IbiSeries {
        ms: read_samples(input)?,
    })
}

fn load_signal(
    fs: f64,
    input: Option<&Path>,
    csv_column: Option<&str>,
    csv_delimiter: char,
) -> Result<SignalBuffer> {
    let data = match (csv_column, input) {
        (Some(column), Some(path)) => csv_io::read_column(path, column, csv_delimiter as u8)?,
        (Some(_), None) => anyhow::bail!("--csv-column requires --input"),
        (None, _) => read_samples(input)?,
    };
    Ok(SignalBuffer::new(fs, data))
}

#[allow(clippy::too_many_arguments)]
fn cmd_detect(
    fs: f64,
    local_threshold: f64,
    global_threshold: f64,
    min_rr_ms: f64,
    input: Option<&Path>,
    csv_column: Option<&str>,
    csv_delimiter: char,
    out: Option<&Path>,
) -> Result<()> {
    let signal = load_signal(fs, input, csv_column, csv_delimiter)?;
    let cfg = PeakDetectorConfig {
        local_threshold,
        global_threshold,
        min_rr_ms,
    };
    let peaks = detect_peaks(&signal, &cfg);
    log::info!(
        "detected {} peaks over {:.1} s of signal",
        peaks.len(),
        signal.duration()
    );
    match out {
        Some(path) => text_io::write_peak_series(path, &peaks)?,
        None => println!("{}", serde_json::to_string(&peaks)?),
    }
    Ok(())
}

fn cmd_intervals(input: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let peaks = read_peaks(input)?;
    let intervals = IbiSeries::from_peaks(&peaks);
    match out {
        Some(path) => text_io::write_ibi_series(path, &intervals)?,
        None => println!("{}", serde_json::to_string(&intervals)?),
    }
    Ok(())
}

fn cmd_artifacts(input: Option<&Path>, peaks: bool) -> Result<()> {
    let intervals = if peaks {
        IbiSeries::from_peaks(&read_peaks(input)?)
    } else {
        read_intervals(input)?
    };
    let flagged = flag_artifacts(&intervals);
    println!("{}", serde_json::to_string(&flagged)?);
    Ok(())
}

#[derive(Serialize)]
struct RepairOutput {
    inserted: usize,
    segment_ms: f64,
    peaks: PeakSeries,
}

fn cmd_repair(input: Option<&Path>, index: usize, fs: Option<f64>) -> Result<()> {
    let mut peaks = read_peaks(input)?;
    let plan = plan_gap_repair(&peaks, index)?;
    let mut inserted = 0;
    for &t in &plan.insert_times_s {
        let t = match fs {
            Some(fs) => (t * fs).round() / fs,
            None => t,
        };
        if peaks.insert(t) {
            inserted += 1;
        }
    }
    log::debug!("gap {} subdivided into {:.1} ms beats", index, plan.segment_ms);
    let output = RepairOutput {
        inserted,
        segment_ms: plan.segment_ms,
        peaks,
    };
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn cmd_pipeline(
    fs: f64,
    local_threshold: f64,
    global_threshold: f64,
    min_rr_ms: f64,
    input: Option<&Path>,
    csv_column: Option<&str>,
    csv_delimiter: char,
) -> Result<()> {
    let signal = load_signal(fs, input, csv_column, csv_delimiter)?;
    let cfg = PeakDetectorConfig {
        local_threshold,
        global_threshold,
        min_rr_ms,
    };
    let result = run_detection_pipeline(&signal, &cfg);
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn cmd_summary(input: Option<&Path>) -> Result<()> {
    let intervals = read_intervals(input)?;
    let summary = ibi_summary(&intervals);
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn cmd_histogram(input: Option<&Path>) -> Result<()> {
    let intervals = read_intervals(input)?;
    let hist = IbiHistogram::from_intervals(&intervals);
    println!("{}", serde_json::to_string(&hist)?);
    Ok(())
}
