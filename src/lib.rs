//! Synheart Somn - On-device sleep/wake estimation from wrist accelerometer streams
//!
//! Somn estimates a binary sleep/wake state from 3-axis wrist acceleration
//! alone, using arm-angle dynamics: exponential smoothing → arm angle →
//! windowed averaging → hysteresis over recent window-to-window changes. The
//! tracker runs online, sample-by-sample, with memory and per-sample work
//! bounded independently of run length.
//!
//! ## Modules
//!
//! - **Resampler**: align irregular recorded accelerometer and label streams
//!   onto one uniform grid (offline stimulus preparation)
//! - **Tracker**: the online classifier, one [`tracker::SleepTracker::ingest`]
//!   call per sample
//! - **Pipeline**: offline composition of resample → track → report

pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod report;
pub mod resample;
pub mod tracker;
pub mod types;
pub mod window;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::TrackerConfig;
pub use error::TrackError;
pub use filter::FilterKind;
pub use pipeline::{run_recording, track_trace};
pub use report::{Reporter, RunReport};
pub use resample::resample;
pub use tracker::{SampleTrace, SleepTracker, TraceObserver};
pub use types::{AccelSample, LabelSample, SleepState, SleepWakeEvent, UniformTrace};

/// Somn version embedded in all run reports
pub const SOMN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for run reports
pub const PRODUCER_NAME: &str = "synheart-somn";
