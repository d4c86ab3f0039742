//! Fixed-capacity rolling windows
//!
//! The tracker keeps two bounded histories: per-sample arm angles within the
//! current classification window, and window-to-window angle changes for the
//! hysteresis rule. Both are rolling windows with O(1) push/evict and a
//! running sum, so the window mean is O(1) as well.

use std::collections::VecDeque;

/// A bounded ring buffer of f64 with a running sum
///
/// Capacity is fixed at construction and the backing storage is preallocated;
/// pushing never allocates.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingWindow {
    /// Create a window holding at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be non-zero");
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    /// Push a value, evicting the oldest if the window is full
    pub fn push(&mut self, value: f64) {
        if self.buf.len() == self.capacity {
            if let Some(evicted) = self.buf.pop_front() {
                self.sum -= evicted;
            }
        }
        self.buf.push_back(value);
        self.sum += value;
    }

    /// Mean over currently held values, or None if empty
    pub fn mean(&self) -> Option<f64> {
        if self.buf.is_empty() {
            return None;
        }
        Some(self.sum / self.buf.len() as f64)
    }

    /// True if any held value exceeds `threshold`
    pub fn any_above(&self, threshold: f64) -> bool {
        self.buf.iter().any(|v| *v > threshold)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
