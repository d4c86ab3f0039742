//! Stimulus resampling
//!
//! This module converts two independently, irregularly timestamped streams
//! (raw accelerometer triples and ground-truth sleep-stage labels) onto one
//! uniform time grid:
//! - Accelerometer axes by piecewise-linear interpolation
//! - Labels by zero-order hold
//!
//! Both passes walk the sorted inputs once (O(N + M)); nothing is rescanned
//! per grid point.

use crate::error::TrackError;
use crate::types::{AccelSample, LabelSample, UniformSample, UniformTrace};
use log::debug;

/// Resample an accelerometer stream and a label stream onto a uniform grid at `fs` Hz
///
/// Accelerometer entries before t=0 are discarded (the label clock defines t=0
/// as session start; accelerometer data may start earlier).
///
/// # Errors
/// `InvalidInput` if the accelerometer stream is empty after the t >= 0 trim,
/// if the trimmed stream spans less than one sample period, or if the first
/// label falls after the first grid timestamp (zero-order hold would have
/// nothing to hold).
pub fn resample(
    accel: &[AccelSample],
    labels: &[LabelSample],
    fs: u32,
) -> Result<UniformTrace, TrackError> {
    let trim_at = accel.iter().position(|s| s.t >= 0.0).unwrap_or(accel.len());
    let accel = &accel[trim_at..];

    let (first, last) = match (accel.first(), accel.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(TrackError::InvalidInput(
                "accelerometer stream is empty after trimming t < 0".into(),
            ))
        }
    };

    let span = last.t - first.t;
    let n = (span * fs as f64).floor() as i64;
    if n <= 0 {
        return Err(TrackError::InvalidInput(format!(
            "accelerometer stream spans {span:.3} s, less than one sample period at {fs} Hz"
        )));
    }
    let n = n as usize;

    let grid = time_grid(first.t, n, fs);

    match labels.first() {
        None => {
            return Err(TrackError::InvalidInput(
                "label stream is empty".into(),
            ))
        }
        Some(label) if label.t > grid[0] => {
            return Err(TrackError::InvalidInput(format!(
                "first label at t={} falls after the first grid timestamp t={}",
                label.t, grid[0]
            )))
        }
        Some(_) => {}
    }

    let axes = interpolate_axes(&grid, accel);
    let held = hold_labels(&grid, labels);

    debug!(
        "resampled {} accel / {} label samples to {} grid points over {:.1} s at {} Hz",
        accel.len(),
        labels.len(),
        n,
        span,
        fs
    );

    let samples = grid
        .iter()
        .zip(axes)
        .zip(held)
        .map(|((&t, [ax, ay, az]), label)| UniformSample { t, ax, ay, az, label })
        .collect();

    Ok(UniformTrace { fs, samples })
}

/// Build the uniform timestamp grid: `n` points linearly spaced over
/// `[t0, t0 + n/fs]` inclusive.
///
/// Because `n` comes from truncating the span, the resulting step is
/// `(n/fs) / (n-1)`, approximately but not exactly `1/fs`. This matches the
/// grid of the recorded stimulus files exactly and is kept for bit-level
/// comparability with them.
fn time_grid(t0: f64, n: usize, fs: u32) -> Vec<f64> {
    let stop = t0 + n as f64 / fs as f64;
    if n == 1 {
        return vec![t0];
    }

    let step = (stop - t0) / (n - 1) as f64;
    let mut grid: Vec<f64> = (0..n).map(|i| t0 + step * i as f64).collect();
    // Endpoint is exact, not accumulated
    grid[n - 1] = stop;
    grid
}

/// Piecewise-linear interpolation of all three axes at each grid timestamp
///
/// Grid timestamps outside the sample range clamp to the nearest endpoint
/// value. Zero-width spans (duplicate timestamps) take the left sample.
fn interpolate_axes(grid: &[f64], accel: &[AccelSample]) -> Vec<[f64; 3]> {
    let mut out = Vec::with_capacity(grid.len());
    let mut j = 0;

    for &t in grid {
        while j + 1 < accel.len() && accel[j + 1].t < t {
            j += 1;
        }

        let value = if t <= accel[j].t {
            accel[j].accel()
        } else if j + 1 == accel.len() {
            accel[j].accel()
        } else {
            let (left, right) = (&accel[j], &accel[j + 1]);
            let dt = right.t - left.t;
            if dt > 0.0 {
                let frac = (t - left.t) / dt;
                let l = left.accel();
                let r = right.accel();
                [
                    l[0] + frac * (r[0] - l[0]),
                    l[1] + frac * (r[1] - l[1]),
                    l[2] + frac * (r[2] - l[2]),
                ]
            } else {
                left.accel()
            }
        };
        out.push(value);
    }

    out
}

/// Zero-order hold of labels at each grid timestamp
///
/// Each grid point takes the most recent label strictly before it; the very
/// first grid point takes the first label unconditionally. The caller has
/// already checked that the first label is at or before the first grid
/// timestamp, so the hold index is always valid.
fn hold_labels(grid: &[f64], labels: &[LabelSample]) -> Vec<i64> {
    let mut out = Vec::with_capacity(grid.len());
    let mut j = 0;

    for (i, &t) in grid.iter().enumerate() {
        if i > 0 {
            while j + 1 < labels.len() && labels[j + 1].t < t {
                j += 1;
            }
        }
        out.push(labels[j].label);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accel_ramp() -> Vec<AccelSample> {
        // Irregular timestamps, linear x ramp, constant z
        vec![
            AccelSample::new(0.0, 0.0, 0.0, 1.0),
            AccelSample::new(0.7, 0.7, 0.0, 1.0),
            AccelSample::new(1.5, 1.5, 0.0, 1.0),
            AccelSample::new(3.1, 3.1, 0.0, 1.0),
        ]
    }

    fn labels_basic() -> Vec<LabelSample> {
        vec![
            LabelSample::new(0.0, 0),
            LabelSample::new(1.0, 2),
            LabelSample::new(2.0, 5),
        ]
    }

    #[test]
    fn test_output_length_matches_formula() {
        let trace = resample(&accel_ramp(), &labels_basic(), 10).unwrap();
        // span = 3.1, N = floor(3.1 * 10) = 31
        assert_eq!(trace.len(), 31);
        assert_eq!(trace.fs, 10);
    }

    #[test]
    fn test_grid_monotone_and_evenly_spaced() {
        let trace = resample(&accel_ramp(), &labels_basic(), 10).unwrap();
        let times: Vec<f64> = trace.samples.iter().map(|s| s.t).collect();

        let step = times[1] - times[0];
        for pair in times.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] - pair[0] - step).abs() < 1e-9);
        }
        assert_eq!(times[0], 0.0);
        // Endpoint is t0 + N/fs, not t0 + (N-1)/fs
        assert!((times[30] - 3.1).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_stays_within_input_bounds() {
        let trace = resample(&accel_ramp(), &labels_basic(), 10).unwrap();
        for s in &trace.samples {
            assert!(s.ax >= 0.0 && s.ax <= 3.1);
            assert_eq!(s.ay, 0.0);
            assert!((s.az - 1.0).abs() < 1e-12);
            // The x ramp equals time, so interpolation must reproduce it
            assert!((s.ax - s.t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_labels_zero_order_hold() {
        let trace = resample(&accel_ramp(), &labels_basic(), 10).unwrap();

        for s in &trace.samples {
            // Hold never invents a value
            assert!([0, 2, 5].contains(&s.label));
        }

        // First grid point takes the first label unconditionally
        assert_eq!(trace.samples[0].label, 0);
        // Strictly-before semantics: at t=1.0 the label at t=1.0 is not yet visible
        let at_1 = trace.samples.iter().find(|s| (s.t - 1.0).abs() < 1e-6);
        if let Some(s) = at_1 {
            assert_eq!(s.label, 0);
        }
        // Past t=2.0 the last label holds
        assert_eq!(trace.samples.last().unwrap().label, 5);
    }

    #[test]
    fn test_two_point_stream_yields_single_grid_point() {
        let accel = vec![
            AccelSample::new(0.0, 0.0, 0.0, 0.0),
            AccelSample::new(1.0, 1.0, 0.0, 0.0),
        ];
        let labels = vec![LabelSample::new(0.0, 0)];

        let trace = resample(&accel, &labels, 1).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.samples[0].t, 0.0);
        assert_eq!(trace.samples[0].ax, 0.0);
    }

    #[test]
    fn test_trims_samples_before_session_start() {
        let mut accel = vec![
            AccelSample::new(-2.0, 9.0, 9.0, 9.0),
            AccelSample::new(-0.1, 9.0, 9.0, 9.0),
        ];
        accel.extend(accel_ramp());

        let trace = resample(&accel, &labels_basic(), 10).unwrap();
        assert_eq!(trace.len(), 31);
        assert_eq!(trace.samples[0].t, 0.0);
        assert_eq!(trace.samples[0].ax, 0.0);
    }

    #[test]
    fn test_empty_after_trim_is_error() {
        let accel = vec![AccelSample::new(-1.0, 0.0, 0.0, 1.0)];
        let err = resample(&accel, &labels_basic(), 10).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput(_)));
    }

    #[test]
    fn test_too_short_span_is_error() {
        let accel = vec![
            AccelSample::new(0.0, 0.0, 0.0, 1.0),
            AccelSample::new(0.05, 0.0, 0.0, 1.0),
        ];
        let err = resample(&accel, &labels_basic(), 10).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput(_)));
    }

    #[test]
    fn test_late_first_label_is_error() {
        let labels = vec![LabelSample::new(0.5, 1)];
        let err = resample(&accel_ramp(), &labels, 10).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_labels_is_error() {
        let err = resample(&accel_ramp(), &[], 10).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput(_)));
    }
}
