//! FFI bindings for Synheart Somn
//!
//! This module provides C-compatible functions for embedding the tracker in
//! firmware or host applications. Strings crossing the boundary are
//! null-terminated; strings returned by this module must be freed with
//! `somn_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::TrackerConfig;
use crate::tracker::SleepTracker;
use crate::types::AccelSample;

/// State-change callback: receives the new state code (0 = awake, 1 = asleep)
pub type SomnStateCallback = extern "C" fn(u8);

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Opaque handle to a SleepTracker
pub struct SomnTrackerHandle {
    tracker: SleepTracker,
    callback: Option<SomnStateCallback>,
    announced: Option<u8>,
}

/// Get the last error message for the current thread, or NULL if none.
///
/// # Safety
/// - The returned pointer is borrowed; do not free it. It is invalidated by
///   the next failing call on this thread.
#[no_mangle]
pub unsafe extern "C" fn somn_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|msg| msg.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string allocated by this module.
///
/// # Safety
/// - `s` must be a pointer returned by a `somn_*` function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn somn_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Create a new tracker from a JSON configuration.
///
/// Pass NULL for the default configuration; missing JSON fields take their
/// defaults.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or NULL.
/// - Returns a pointer that must be freed with `somn_tracker_free`.
/// - Returns NULL on error; call `somn_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn somn_tracker_new(config_json: *const c_char) -> *mut SomnTrackerHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        TrackerConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match TrackerConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match SleepTracker::new(config) {
        Ok(tracker) => Box::into_raw(Box::new(SomnTrackerHandle {
            tracker,
            callback: None,
            announced: None,
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `somn_tracker_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn somn_tracker_free(tracker: *mut SomnTrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

/// Register a callback fired whenever the classified state changes.
///
/// The callback shape matches embedded display consumers: it fires on
/// transitions only, not on every classified window.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `somn_tracker_new`.
#[no_mangle]
pub unsafe extern "C" fn somn_tracker_set_callback(
    tracker: *mut SomnTrackerHandle,
    callback: SomnStateCallback,
) {
    if let Some(handle) = tracker.as_mut() {
        handle.callback = Some(callback);
    }
}

/// Ingest one accelerometer sample.
///
/// Returns 1 if this sample completed a classification (the state code is
/// written to `out_state` when non-NULL), 0 if no event was produced, and -1
/// on error (call `somn_last_error` for the message).
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `somn_tracker_new`.
/// - `out_state` must be NULL or a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn somn_tracker_ingest(
    tracker: *mut SomnTrackerHandle,
    t: f64,
    ax: f64,
    ay: f64,
    az: f64,
    out_state: *mut u8,
) -> i32 {
    clear_last_error();

    let handle = match tracker.as_mut() {
        Some(handle) => handle,
        None => {
            set_last_error("Invalid tracker pointer");
            return -1;
        }
    };

    match handle.tracker.ingest(&AccelSample::new(t, ax, ay, az)) {
        Ok(Some(event)) => {
            let code = event.state.as_code();
            if !out_state.is_null() {
                *out_state = code;
            }
            if handle.announced != Some(code) {
                handle.announced = Some(code);
                if let Some(callback) = handle.callback {
                    callback(code);
                }
            }
            1
        }
        Ok(None) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}
