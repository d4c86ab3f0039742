//! Pipeline orchestration
//!
//! This module provides the public API for offline analysis. It composes the
//! full pipeline from raw recorded streams to a run report: resampling onto
//! the uniform grid, streaming the trace through a tracker, and encoding the
//! result.
//!
//! Online use needs none of this: drive a [`SleepTracker`] directly, one
//! sample per `ingest` call.

use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::report::{Reporter, RunReport};
use crate::resample::resample;
use crate::tracker::SleepTracker;
use crate::types::{AccelSample, LabelSample, SleepWakeEvent, UniformTrace};
use log::debug;

/// Stream a uniform trace through a fresh tracker and collect the event
/// sequence
///
/// The sequence opens with the seed event `{t: 0, state: Awake}`, then holds
/// one event per completed window after the first.
///
/// # Errors
/// `InvalidInput` if the trace was resampled at a different rate than the
/// configuration expects; `InvalidConfig` or `InvalidSample` propagated from
/// the tracker.
pub fn track_trace(
    trace: &UniformTrace,
    config: &TrackerConfig,
) -> Result<Vec<SleepWakeEvent>, TrackError> {
    if trace.fs != config.fs {
        return Err(TrackError::InvalidInput(format!(
            "trace was resampled at {} Hz but the tracker expects {} Hz",
            trace.fs, config.fs
        )));
    }

    let mut tracker = SleepTracker::new(config.clone())?;
    let mut events = vec![SleepWakeEvent::seed()];

    for sample in &trace.samples {
        if let Some(event) = tracker.ingest(&sample.accel_sample())? {
            events.push(event);
        }
    }

    debug!(
        "tracked {} samples into {} events",
        trace.len(),
        events.len()
    );

    Ok(events)
}

/// One-shot offline run: validate, resample, track, report
///
/// Pipeline stages:
/// 1. Validate the configuration
/// 2. Resample both recorded streams onto the uniform grid
/// 3. Stream the trace through a tracker
/// 4. Encode the run report
pub fn run_recording(
    accel: &[AccelSample],
    labels: &[LabelSample],
    config: &TrackerConfig,
) -> Result<RunReport, TrackError> {
    config.validate()?;

    let trace = resample(accel, labels, config.fs)?;
    let events = track_trace(&trace, config)?;

    Ok(Reporter::new().report(config, trace.len(), events))
}
