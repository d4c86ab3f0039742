//! Core types for the Synheart Somn pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw samples, the resampled uniform trace, and sleep/wake events.

use serde::{Deserialize, Serialize};

/// A raw 3-axis accelerometer sample
///
/// Timestamps are seconds relative to session start; acceleration is in g-units.
/// Samples are immutable once created and ordered by `t`; in the online setting
/// they arrive in strictly increasing `t` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    /// Timestamp (seconds)
    pub t: f64,
    /// X-axis acceleration (g)
    pub ax: f64,
    /// Y-axis acceleration (g)
    pub ay: f64,
    /// Z-axis acceleration (g)
    pub az: f64,
}

impl AccelSample {
    pub fn new(t: f64, ax: f64, ay: f64, az: f64) -> Self {
        Self { t, ax, ay, az }
    }

    /// The three axis values as an array, in x/y/z order
    pub fn accel(&self) -> [f64; 3] {
        [self.ax, self.ay, self.az]
    }

    /// True if the timestamp and all three axes are finite
    pub fn is_finite(&self) -> bool {
        self.t.is_finite() && self.ax.is_finite() && self.ay.is_finite() && self.az.is_finite()
    }
}

/// A ground-truth sleep-stage label sample
///
/// Exists solely for offline evaluation and resampling; never consumed by the
/// live tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelSample {
    /// Timestamp (seconds); the label clock defines t=0 as session start
    pub t: f64,
    /// Sleep-stage code as recorded in the dataset
    pub label: i64,
}

impl LabelSample {
    pub fn new(t: f64, label: i64) -> Self {
        Self { t, label }
    }
}

/// One entry of a resampled uniform trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformSample {
    /// Grid timestamp (seconds)
    pub t: f64,
    /// Interpolated X-axis acceleration (g)
    pub ax: f64,
    /// Interpolated Y-axis acceleration (g)
    pub ay: f64,
    /// Interpolated Z-axis acceleration (g)
    pub az: f64,
    /// Zero-order-held sleep-stage label
    pub label: i64,
}

impl UniformSample {
    /// The accelerometer portion of this entry, for feeding a tracker
    pub fn accel_sample(&self) -> AccelSample {
        AccelSample::new(self.t, self.ax, self.ay, self.az)
    }
}

/// A uniform-rate, time-aligned trace built by the resampler
///
/// Read-only after construction. Entries are spaced nominally `1/fs` apart
/// (see [`crate::resample`] for the exact grid construction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformTrace {
    /// Target sample rate the grid was built for (Hz)
    pub fs: u32,
    /// Grid entries in time order
    pub samples: Vec<UniformSample>,
}

impl UniformTrace {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Binary sleep/wake state
///
/// Serializes as the integer code used by the recorded datasets (0 = awake,
/// 1 = asleep).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SleepState {
    Awake,
    Asleep,
}

impl SleepState {
    pub fn as_code(&self) -> u8 {
        match self {
            SleepState::Awake => 0,
            SleepState::Asleep => 1,
        }
    }
}

impl From<SleepState> for u8 {
    fn from(state: SleepState) -> u8 {
        state.as_code()
    }
}

impl TryFrom<u8> for SleepState {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SleepState::Awake),
            1 => Ok(SleepState::Asleep),
            other => Err(format!("unknown sleep state code: {other}")),
        }
    }
}

/// A timestamped sleep/wake classification
///
/// Output-only and append-only. The first event of any offline run is the seed
/// `{t: 0, state: Awake}`, emitted before any real classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepWakeEvent {
    /// Timestamp of the window boundary that produced this event (seconds)
    pub t: f64,
    /// Classified state
    pub state: SleepState,
}

impl SleepWakeEvent {
    pub fn new(t: f64, state: SleepState) -> Self {
        Self { t, state }
    }

    /// The seed value opening every offline event sequence
    pub fn seed() -> Self {
        Self::new(0.0, SleepState::Awake)
    }
}
