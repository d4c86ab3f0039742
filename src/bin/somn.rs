//! Somn CLI - Command-line interface for Synheart Somn
//!
//! Commands:
//! - resample: Align raw accelerometer and label recordings onto a uniform grid
//! - track: Run the sleep/wake tracker over a resampled stimulus file
//! - config: Print the default tracker configuration as JSON
//!
//! Stimulus files are whitespace-delimited rows `TIME X Y Z [TRUTH]`, one row
//! per sample; raw recordings are `TIME X Y Z` (accelerometer) and
//! `TIME LABEL` (ground truth). Lines starting with `#` are skipped.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use synheart_somn::pipeline::track_trace;
use synheart_somn::report::Reporter;
use synheart_somn::resample::resample;
use synheart_somn::types::{AccelSample, LabelSample, UniformSample, UniformTrace};
use synheart_somn::{FilterKind, TrackError, TrackerConfig};

/// Somn - On-device sleep/wake estimation from wrist accelerometer streams
#[derive(Parser)]
#[command(name = "somn")]
#[command(author = "Synheart AI Inc")]
#[command(version = synheart_somn::SOMN_VERSION)]
#[command(about = "Estimate sleep/wake state from wrist acceleration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align raw accelerometer and label recordings onto a uniform grid
    Resample {
        /// Accelerometer recording (`TIME X Y Z` rows, use - for stdin)
        #[arg(long)]
        accel: PathBuf,

        /// Ground-truth label recording (`TIME LABEL` rows)
        #[arg(long)]
        labels: PathBuf,

        /// Target sample rate (Hz)
        #[arg(long, default_value = "10")]
        fs: u32,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Run the sleep/wake tracker over a resampled stimulus file
    Track {
        /// Stimulus file (`TIME X Y Z [TRUTH]` rows, use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,

        /// Tracker configuration file (JSON); missing fields take defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override: sample rate (Hz)
        #[arg(long)]
        fs: Option<u32>,

        /// Override: filter decay factor
        #[arg(long)]
        eta: Option<f64>,

        /// Override: classification window length (seconds)
        #[arg(long)]
        window_seconds: Option<u32>,

        /// Override: hysteresis history length (windows)
        #[arg(long)]
        hist_size: Option<usize>,

        /// Override: arm angle change threshold (degrees)
        #[arg(long)]
        threshold: Option<f64>,

        /// Override: smoothing strategy
        #[arg(long)]
        filter: Option<FilterArg>,
    },

    /// Print the default tracker configuration as JSON
    Config,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Whitespace rows `TIME STATE`, one per event
    Text,
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// Full run report as JSON
    Json,
    /// Full run report as pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum FilterArg {
    Ema,
    SteppedMedian,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Ema => FilterKind::Ema,
            FilterArg::SteppedMedian => FilterKind::SteppedMedian,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SomnCliError> {
    match cli.command {
        Commands::Resample {
            accel,
            labels,
            fs,
            output,
        } => cmd_resample(&accel, &labels, fs, &output),

        Commands::Track {
            input,
            output,
            output_format,
            config,
            fs,
            eta,
            window_seconds,
            hist_size,
            threshold,
            filter,
        } => {
            let mut tracker_config = match config {
                Some(path) => TrackerConfig::from_json(&fs::read_to_string(path)?)?,
                None => TrackerConfig::default(),
            };
            if let Some(fs) = fs {
                tracker_config.fs = fs;
            }
            if let Some(eta) = eta {
                tracker_config.eta = eta;
            }
            if let Some(window_seconds) = window_seconds {
                tracker_config.window_seconds = window_seconds;
            }
            if let Some(hist_size) = hist_size {
                tracker_config.classification_hist_size = hist_size;
            }
            if let Some(threshold) = threshold {
                tracker_config.angle_threshold = threshold;
            }
            if let Some(filter) = filter {
                tracker_config.filter = filter.into();
            }

            cmd_track(&input, &output, output_format, tracker_config)
        }

        Commands::Config => {
            println!(
                "{}",
                serde_json::to_string_pretty(&TrackerConfig::default())?
            );
            Ok(())
        }
    }
}

fn cmd_resample(
    accel_path: &Path,
    labels_path: &Path,
    fs: u32,
    output: &Path,
) -> Result<(), SomnCliError> {
    let accel = parse_accel(&read_input(accel_path)?)?;
    let labels = parse_labels(&read_input(labels_path)?)?;

    let trace = resample(&accel, &labels, fs)?;

    let mut rows = String::new();
    for s in &trace.samples {
        rows.push_str(&format!(
            "{:.6} {:.6} {:.6} {:.6} {}\n",
            s.t, s.ax, s.ay, s.az, s.label
        ));
    }
    write_output(output, &rows)
}

fn cmd_track(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    config: TrackerConfig,
) -> Result<(), SomnCliError> {
    if input.to_string_lossy() == "-" && atty::is(atty::Stream::Stdin) {
        eprintln!("reading stimulus from terminal; pipe a file or pass --input PATH");
    }

    let samples = parse_stimulus(&read_input(input)?)?;
    if samples.is_empty() {
        return Err(SomnCliError::NoSamples);
    }

    let trace = UniformTrace {
        fs: config.fs,
        samples,
    };
    let events = track_trace(&trace, &config)?;

    let data = match output_format {
        OutputFormat::Text => {
            let mut rows = String::new();
            for event in &events {
                rows.push_str(&format!("{} {}\n", event.t, event.state.as_code()));
            }
            rows
        }
        OutputFormat::Ndjson => {
            let mut rows = String::new();
            for event in &events {
                rows.push_str(&serde_json::to_string(event)?);
                rows.push('\n');
            }
            rows
        }
        OutputFormat::Json => {
            let report = Reporter::new().report(&config, trace.len(), events);
            serde_json::to_string(&report)?
        }
        OutputFormat::JsonPretty => Reporter::new().encode_to_json(&config, trace.len(), events)?,
    };

    write_output(output, &data)
}

// Helper functions

fn read_input(path: &Path) -> Result<String, SomnCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: &Path, data: &str) -> Result<(), SomnCliError> {
    if path.to_string_lossy() == "-" {
        print!("{}", data);
        Ok(())
    } else {
        Ok(fs::write(path, data)?)
    }
}

/// Parse whitespace-delimited numeric fields from one line
fn parse_fields(line: &str, lineno: usize, expected: usize) -> Result<Vec<f64>, SomnCliError> {
    let fields: Result<Vec<f64>, _> = line.split_whitespace().map(|f| f.parse()).collect();
    match fields {
        Ok(fields) if fields.len() >= expected => Ok(fields),
        Ok(fields) => Err(SomnCliError::Parse(format!(
            "line {}: expected {} fields, got {}",
            lineno,
            expected,
            fields.len()
        ))),
        Err(e) => Err(SomnCliError::Parse(format!("line {}: {}", lineno, e))),
    }
}

fn data_lines(data: &str) -> impl Iterator<Item = (usize, &str)> {
    data.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_accel(data: &str) -> Result<Vec<AccelSample>, SomnCliError> {
    let mut samples = Vec::new();
    for (lineno, line) in data_lines(data) {
        let f = parse_fields(line, lineno, 4)?;
        samples.push(AccelSample::new(f[0], f[1], f[2], f[3]));
    }
    Ok(samples)
}

fn parse_labels(data: &str) -> Result<Vec<LabelSample>, SomnCliError> {
    let mut samples = Vec::new();
    for (lineno, line) in data_lines(data) {
        let f = parse_fields(line, lineno, 2)?;
        samples.push(LabelSample::new(f[0], f[1] as i64));
    }
    Ok(samples)
}

fn parse_stimulus(data: &str) -> Result<Vec<UniformSample>, SomnCliError> {
    let mut samples = Vec::new();
    for (lineno, line) in data_lines(data) {
        let f = parse_fields(line, lineno, 4)?;
        let label = f.get(4).map(|v| *v as i64).unwrap_or(0);
        samples.push(UniformSample {
            t: f[0],
            ax: f[1],
            ay: f[2],
            az: f[3],
            label,
        });
    }
    Ok(samples)
}

// Error handling

enum SomnCliError {
    Io(io::Error),
    Track(TrackError),
    Json(serde_json::Error),
    Parse(String),
    NoSamples,
}

impl From<io::Error> for SomnCliError {
    fn from(e: io::Error) -> Self {
        SomnCliError::Io(e)
    }
}

impl From<TrackError> for SomnCliError {
    fn from(e: TrackError) -> Self {
        SomnCliError::Track(e)
    }
}

impl From<serde_json::Error> for SomnCliError {
    fn from(e: serde_json::Error) -> Self {
        SomnCliError::Json(e)
    }
}

/// Structured error printed to stderr on failure
#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SomnCliError> for CliError {
    fn from(e: SomnCliError) -> Self {
        match e {
            SomnCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SomnCliError::Track(e) => CliError {
                code: "TRACK_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check input data and configuration values".to_string()),
            },
            SomnCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SomnCliError::Parse(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Rows are whitespace-delimited: TIME X Y Z [TRUTH]".to_string()),
            },
            SomnCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No samples found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
        }
    }
}
