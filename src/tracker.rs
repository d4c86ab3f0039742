//! Streaming sleep/wake tracker
//!
//! The tracker consumes one uniform-rate accelerometer sample per call and
//! emits zero or one sleep/wake event. All state is bounded: an incremental
//! three-axis filter, two fixed-capacity rolling windows, and a handful of
//! scalars. One `ingest` call performs fixed-size arithmetic only; it never
//! blocks and never allocates after construction.
//!
//! Classification follows arm-angle dynamics: smoothed acceleration is
//! converted to an arm inclination angle, angles are averaged per window, and
//! the state flips to asleep only once every recent window-to-window change
//! stayed below the configured threshold. Requiring the whole history to be
//! quiet makes the asleep state sticky, favoring missed sleep over false wake
//! alarms.

use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::filter::TriaxFilter;
use crate::types::{AccelSample, SleepState, SleepWakeEvent};
use crate::window::RollingWindow;
use serde::Serialize;

/// Per-sample internals snapshot handed to a [`TraceObserver`]
///
/// `window_mean`, `change`, and `state` are only present on calls that
/// completed a window (and, for the latter two, had a previous window to
/// compare against).
#[derive(Debug, Clone, Serialize)]
pub struct SampleTrace {
    /// Timestamp of the ingested sample (seconds)
    pub t: f64,
    /// Smoothed acceleration after this sample (g)
    pub accel_avg: [f64; 3],
    /// Arm angle estimate from the smoothed acceleration (degrees)
    pub angle: f64,
    /// Mean arm angle of the window completed by this sample
    pub window_mean: Option<f64>,
    /// Absolute change against the previous window mean
    pub change: Option<f64>,
    /// State classified at this sample
    pub state: Option<SleepState>,
}

/// Observer invoked after every ingested sample
///
/// Intended for inspection tooling; the tracker itself never reads anything
/// back from it.
pub trait TraceObserver {
    fn on_sample(&mut self, trace: &SampleTrace);
}

/// Online sleep/wake classifier over a uniform-rate accelerometer stream
pub struct SleepTracker {
    config: TrackerConfig,
    filter: TriaxFilter,
    angle_window: RollingWindow,
    change_history: RollingWindow,
    prev_window_mean: Option<f64>,
    sample_index: u64,
    last_t: Option<f64>,
    observer: Option<Box<dyn TraceObserver>>,
}

impl SleepTracker {
    /// Create a tracker for the given configuration
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration fails validation.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackError> {
        config.validate()?;
        Ok(Self {
            filter: TriaxFilter::new(config.filter, config.eta),
            angle_window: RollingWindow::new(config.window_len()),
            change_history: RollingWindow::new(config.classification_hist_size),
            prev_window_mean: None,
            sample_index: 0,
            last_t: None,
            observer: None,
            config,
        })
    }

    /// Attach an observer that receives a [`SampleTrace`] after every sample
    pub fn with_observer(mut self, observer: Box<dyn TraceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The configuration this tracker was built with
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of samples ingested so far
    pub fn samples_ingested(&self) -> u64 {
        self.sample_index
    }

    /// Ingest one accelerometer sample, returning an event if this sample
    /// completed a classification window with a previous window to compare
    /// against
    ///
    /// Samples must arrive in strictly increasing `t` order with finite
    /// values; violations are rejected before any state is touched, since the
    /// filter and windows cannot recover from an absorbed bad value.
    pub fn ingest(&mut self, sample: &AccelSample) -> Result<Option<SleepWakeEvent>, TrackError> {
        if !sample.is_finite() {
            return Err(TrackError::InvalidSample(format!(
                "non-finite sample at t={}",
                sample.t
            )));
        }
        if let Some(last) = self.last_t {
            if sample.t <= last {
                return Err(TrackError::InvalidSample(format!(
                    "sample at t={} is not after previous t={}",
                    sample.t, last
                )));
            }
        }
        self.last_t = Some(sample.t);

        let accel_avg = self.filter.update(sample.accel());
        let angle = arm_angle(accel_avg);
        self.angle_window.push(angle);

        let index = self.sample_index;
        self.sample_index += 1;

        let mut window_mean = None;
        let mut change = None;
        let mut event = None;

        if index % self.config.window_len() as u64 == 0 {
            // The window holds at least the angle just pushed
            let mean = self.angle_window.mean().unwrap_or(angle);
            window_mean = Some(mean);

            if let Some(prev) = self.prev_window_mean {
                let delta = (mean - prev).abs();
                self.change_history.push(delta);
                change = Some(delta);

                let state = if self.change_history.any_above(self.config.angle_threshold) {
                    SleepState::Awake
                } else {
                    SleepState::Asleep
                };
                event = Some(SleepWakeEvent::new(sample.t, state));
            }
            // The very first window only seeds the comparison baseline
            self.prev_window_mean = Some(mean);
        }

        if let Some(observer) = self.observer.as_mut() {
            observer.on_sample(&SampleTrace {
                t: sample.t,
                accel_avg,
                angle,
                window_mean,
                change,
                state: event.map(|e| e.state),
            });
        }

        Ok(event)
    }
}

/// Arm inclination relative to gravity, in degrees, from smoothed acceleration
///
/// With both horizontal axes at zero this saturates at ±90° (the vertical
/// arm), matching the limit of the arctangent.
fn arm_angle(accel: [f64; 3]) -> f64 {
    let [ax, ay, az] = accel;
    (az / (ax * ax + ay * ay).sqrt()).atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// fs=1, window=1s: every sample is a window boundary. With eta=1 the
    /// filter passes raw samples through, so angles are directly steerable.
    fn passthrough_config(hist: usize) -> TrackerConfig {
        TrackerConfig {
            fs: 1,
            eta: 1.0,
            window_seconds: 1,
            classification_hist_size: hist,
            angle_threshold: 5.0,
            ..TrackerConfig::default()
        }
    }

    fn flat() -> [f64; 3] {
        [0.0, 1.0, 0.0] // angle 0°
    }

    fn raised() -> [f64; 3] {
        [0.0, 0.0, 1.0] // angle 90°
    }

    fn ingest_accel(
        tracker: &mut SleepTracker,
        t: f64,
        accel: [f64; 3],
    ) -> Option<SleepWakeEvent> {
        let [ax, ay, az] = accel;
        tracker
            .ingest(&AccelSample::new(t, ax, ay, az))
            .expect("well-formed sample")
    }

    #[test]
    fn test_arm_angle_reference_points() {
        assert!((arm_angle([0.0, 1.0, 0.0])).abs() < 1e-9);
        assert!((arm_angle([0.0, 0.0, 1.0]) - 90.0).abs() < 1e-9);
        assert!((arm_angle([0.0, 0.0, -1.0]) + 90.0).abs() < 1e-9);
        assert!((arm_angle([0.0, 1.0, 1.0]) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_window_seeds_without_event() {
        let mut tracker = SleepTracker::new(passthrough_config(2)).unwrap();
        assert_eq!(ingest_accel(&mut tracker, 0.0, raised()), None);
        assert_eq!(tracker.samples_ingested(), 1);
    }

    #[test]
    fn test_event_cadence() {
        // fs=10, window=5s: boundaries every 50 samples, first event at index 50
        let config = TrackerConfig {
            eta: 1.0,
            ..TrackerConfig::default()
        };
        let mut tracker = SleepTracker::new(config).unwrap();

        for i in 0..200u32 {
            let event = ingest_accel(&mut tracker, i as f64 * 0.1, raised());
            let expected = i > 0 && i % 50 == 0;
            assert_eq!(event.is_some(), expected, "unexpected cadence at index {i}");
        }
    }

    #[test]
    fn test_hysteresis_sticks_after_spike() {
        let mut tracker = SleepTracker::new(passthrough_config(2)).unwrap();

        ingest_accel(&mut tracker, 0.0, raised()); // seeds
        let e1 = ingest_accel(&mut tracker, 1.0, raised()).unwrap();
        assert_eq!(e1.state, SleepState::Asleep);

        // One ~90° spike flips to awake immediately
        let e2 = ingest_accel(&mut tracker, 2.0, flat()).unwrap();
        assert_eq!(e2.state, SleepState::Awake);

        // The spike stays in the 2-deep history for one more stable window
        let e3 = ingest_accel(&mut tracker, 3.0, flat()).unwrap();
        assert_eq!(e3.state, SleepState::Awake);

        // Two consecutive quiet changes: asleep again
        let e4 = ingest_accel(&mut tracker, 4.0, flat()).unwrap();
        assert_eq!(e4.state, SleepState::Asleep);
    }

    #[test]
    fn test_rejects_non_finite_sample() {
        let mut tracker = SleepTracker::new(passthrough_config(2)).unwrap();
        let err = tracker
            .ingest(&AccelSample::new(0.0, f64::NAN, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, TrackError::InvalidSample(_)));

        // The bad sample must not have advanced any state
        assert_eq!(tracker.samples_ingested(), 0);
        assert_eq!(ingest_accel(&mut tracker, 0.0, raised()), None);
    }

    #[test]
    fn test_rejects_out_of_order_sample() {
        let mut tracker = SleepTracker::new(passthrough_config(2)).unwrap();
        ingest_accel(&mut tracker, 1.0, raised());

        let err = tracker
            .ingest(&AccelSample::new(1.0, 0.0, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, TrackError::InvalidSample(_)));
        assert_eq!(tracker.samples_ingested(), 1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = TrackerConfig::default();
        config.eta = 0.0;
        assert!(SleepTracker::new(config).is_err());
    }

    #[test]
    fn test_observer_sees_every_sample() {
        use std::cell::RefCell;
        use std::rc::Rc;

        // Route traces out through a shared cell so the tracker can own the box
        struct Recorder(Rc<RefCell<Vec<SampleTrace>>>);
        impl TraceObserver for Recorder {
            fn on_sample(&mut self, trace: &SampleTrace) {
                self.0.borrow_mut().push(trace.clone());
            }
        }

        let traces = Rc::new(RefCell::new(Vec::new()));
        let mut tracker = SleepTracker::new(passthrough_config(2))
            .unwrap()
            .with_observer(Box::new(Recorder(traces.clone())));

        ingest_accel(&mut tracker, 0.0, raised());
        ingest_accel(&mut tracker, 1.0, raised());

        let traces = traces.borrow();
        assert_eq!(traces.len(), 2);

        // Boundary fields present on both window completions; the first has
        // no previous window to compare against
        assert!(traces[0].window_mean.is_some());
        assert!(traces[0].change.is_none());
        assert!(traces[0].state.is_none());
        assert!(traces[1].change.is_some());
        assert_eq!(traces[1].state, Some(SleepState::Asleep));
    }
}
