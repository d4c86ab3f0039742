//! Tracker configuration
//!
//! All tunables are externally supplied; nothing is hidden from the caller.
//! Defaults are tuned for 10 Hz wrist-worn accelerometer streams.

use crate::error::TrackError;
use crate::filter::FilterKind;
use serde::{Deserialize, Serialize};

/// Default sample rate (Hz)
pub const DEFAULT_FS: u32 = 10;

/// Default exponential moving average decay factor
pub const DEFAULT_ETA: f64 = 0.005;

/// Default classification window length (seconds)
pub const DEFAULT_WINDOW_SECONDS: u32 = 5;

/// Default hysteresis history length (windows)
pub const DEFAULT_HIST_SIZE: usize = 60;

/// Default arm angle change threshold (degrees)
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 5.0;

/// Configuration for the streaming sleep/wake tracker
///
/// Smaller `eta` means slower filter response and more immunity to transient
/// motion. A window-to-window arm angle change above `angle_threshold` counts
/// as a wake indication; the tracker only reports sleep once all of the last
/// `classification_hist_size` changes stayed below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Sample rate the tracker is fed at (Hz)
    pub fs: u32,
    /// Acceleration filter decay factor, in (0, 1]
    pub eta: f64,
    /// Classification window length (seconds)
    pub window_seconds: u32,
    /// Hysteresis history length (windows)
    pub classification_hist_size: usize,
    /// Arm angle change threshold (degrees)
    pub angle_threshold: f64,
    /// Acceleration smoothing strategy
    pub filter: FilterKind,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fs: DEFAULT_FS,
            eta: DEFAULT_ETA,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            classification_hist_size: DEFAULT_HIST_SIZE,
            angle_threshold: DEFAULT_ANGLE_THRESHOLD,
            filter: FilterKind::Ema,
        }
    }
}

impl TrackerConfig {
    /// Samples per classification window
    pub fn window_len(&self) -> usize {
        (self.fs * self.window_seconds) as usize
    }

    /// Check all tunables against their documented ranges
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.fs == 0 {
            return Err(TrackError::InvalidConfig("fs must be at least 1 Hz".into()));
        }
        if !self.eta.is_finite() || self.eta <= 0.0 || self.eta > 1.0 {
            return Err(TrackError::InvalidConfig(format!(
                "eta must be in (0, 1], got {}",
                self.eta
            )));
        }
        if self.window_seconds == 0 {
            return Err(TrackError::InvalidConfig(
                "window_seconds must be at least 1".into(),
            ));
        }
        if self.classification_hist_size == 0 {
            return Err(TrackError::InvalidConfig(
                "classification_hist_size must be at least 1".into(),
            ));
        }
        if !self.angle_threshold.is_finite() || self.angle_threshold < 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "angle_threshold must be finite and non-negative, got {}",
                self.angle_threshold
            )));
        }
        Ok(())
    }

    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
