//! Stable C ABI for binding layers
//!
//! Mirrors the opaque-handle-plus-explicit-free contract the host-language
//! wrappers load from the shared library. Construction failures return null,
//! runtime failures return false; nothing ever unwinds across the boundary.
//!
//! `lid_recognizer_lang_result` returns a pointer owned by the recognizer
//! handle; it stays valid until the next call on the same handle or until
//! the handle is freed.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_float, c_int};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, level_filters::LevelFilter, warn};

use crate::model::LidModel;
use crate::recognizer::Recognizer;

/// Opaque model handle holding a shared reference
pub struct LidModelHandle {
    model: Arc<LidModel>,
}

/// Opaque recognizer handle; owns the session and the last result string
pub struct LidRecognizerHandle {
    recognizer: Recognizer,
    last_result: Option<CString>,
}

/// Load a model from a directory path; null on failure
///
/// # Safety
///
/// `path` must be a valid nul-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn lid_model_new(path: *const c_char) -> *mut LidModelHandle {
    if path.is_null() {
        return std::ptr::null_mut();
    }

    let path = match CStr::from_ptr(path).to_str() {
        Ok(p) => p.to_owned(),
        Err(_) => {
            error!("Model path is not valid UTF-8");
            return std::ptr::null_mut();
        }
    };

    let loaded = catch_unwind(|| LidModel::load(&path));
    match loaded {
        Ok(Ok(model)) => Box::into_raw(Box::new(LidModelHandle {
            model: Arc::new(model),
        })),
        Ok(Err(e)) => {
            error!("Failed to load model from {}: {}", path, e);
            std::ptr::null_mut()
        }
        Err(_) => {
            error!("Panic while loading model from {}", path);
            std::ptr::null_mut()
        }
    }
}

/// Release a model handle
///
/// The underlying model stays alive until the last recognizer referencing it
/// is freed.
///
/// # Safety
///
/// `handle` must be null or a pointer obtained from [`lid_model_new`], and
/// must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn lid_model_free(handle: *mut LidModelHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Open a recognizer session at a fixed sample rate; null on failure
///
/// # Safety
///
/// `model` must be a valid pointer obtained from [`lid_model_new`].
#[no_mangle]
pub unsafe extern "C" fn lid_recognizer_new(
    model: *mut LidModelHandle,
    sample_rate: c_float,
) -> *mut LidRecognizerHandle {
    if model.is_null() || !sample_rate.is_finite() || sample_rate <= 0.0 {
        return std::ptr::null_mut();
    }

    let model = Arc::clone(&(*model).model);
    let opened = catch_unwind(|| Recognizer::new(model, sample_rate as u32));
    match opened {
        Ok(Ok(recognizer)) => Box::into_raw(Box::new(LidRecognizerHandle {
            recognizer,
            last_result: None,
        })),
        Ok(Err(e)) => {
            error!("Failed to open recognizer: {}", e);
            std::ptr::null_mut()
        }
        Err(_) => {
            error!("Panic while opening recognizer");
            std::ptr::null_mut()
        }
    }
}

/// Release a recognizer session and all its buffers
///
/// # Safety
///
/// `handle` must be null or a pointer obtained from [`lid_recognizer_new`],
/// and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn lid_recognizer_free(handle: *mut LidRecognizerHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Feed little-endian 16-bit mono PCM bytes; false on malformed input
///
/// A false return leaves the session state unchanged and usable.
///
/// # Safety
///
/// `handle` must be a valid recognizer pointer and `data` must point to at
/// least `length` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn lid_recognizer_accept_waveform(
    handle: *mut LidRecognizerHandle,
    data: *const u8,
    length: c_int,
) -> bool {
    if handle.is_null() || data.is_null() || length < 0 {
        return false;
    }

    let handle = &mut *handle;
    let bytes = std::slice::from_raw_parts(data, length as usize);

    match catch_unwind(AssertUnwindSafe(|| handle.recognizer.accept_waveform(bytes))) {
        Ok(Ok(ok)) => ok,
        Ok(Err(e)) => {
            warn!("accept_waveform rejected input: {}", e);
            false
        }
        Err(_) => {
            error!("Panic in accept_waveform");
            false
        }
    }
}

/// Feed 16-bit signed mono samples; `length` is a sample count
///
/// # Safety
///
/// `handle` must be a valid recognizer pointer and `data` must point to at
/// least `length` readable samples.
#[no_mangle]
pub unsafe extern "C" fn lid_recognizer_accept_waveform_s(
    handle: *mut LidRecognizerHandle,
    data: *const i16,
    length: c_int,
) -> bool {
    if handle.is_null() || data.is_null() || length < 0 {
        return false;
    }

    let handle = &mut *handle;
    let samples = std::slice::from_raw_parts(data, length as usize);

    match catch_unwind(AssertUnwindSafe(|| handle.recognizer.accept_samples(samples))) {
        Ok(Ok(ok)) => ok,
        Ok(Err(e)) => {
            warn!("accept_waveform_s rejected input: {}", e);
            false
        }
        Err(_) => {
            error!("Panic in accept_waveform_s");
            false
        }
    }
}

/// Feed mono f32 samples in [-1.0, 1.0]; `length` is a sample count
///
/// # Safety
///
/// `handle` must be a valid recognizer pointer and `data` must point to at
/// least `length` readable samples.
#[no_mangle]
pub unsafe extern "C" fn lid_recognizer_accept_waveform_f(
    handle: *mut LidRecognizerHandle,
    data: *const c_float,
    length: c_int,
) -> bool {
    if handle.is_null() || data.is_null() || length < 0 {
        return false;
    }

    let handle = &mut *handle;
    let samples = std::slice::from_raw_parts(data, length as usize);

    match catch_unwind(AssertUnwindSafe(|| {
        handle.recognizer.accept_waveform_f32(samples)
    })) {
        Ok(Ok(ok)) => ok,
        Ok(Err(e)) => {
            warn!("accept_waveform_f rejected input: {}", e);
            false
        }
        Err(_) => {
            error!("Panic in accept_waveform_f");
            false
        }
    }
}

/// Current per-language scores as a JSON array string; null on failure
///
/// # Safety
///
/// `handle` must be a valid recognizer pointer. The returned pointer is owned
/// by the handle and is invalidated by the next call or by freeing it.
#[no_mangle]
pub unsafe extern "C" fn lid_recognizer_lang_result(
    handle: *mut LidRecognizerHandle,
) -> *const c_char {
    if handle.is_null() {
        return std::ptr::null();
    }

    let handle = &mut *handle;
    let json = match catch_unwind(AssertUnwindSafe(|| handle.recognizer.result_json())) {
        Ok(Ok(json)) => json,
        Ok(Err(e)) => {
            error!("Failed to serialize result: {}", e);
            return std::ptr::null();
        }
        Err(_) => {
            error!("Panic while producing result");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(s) => {
            handle.last_result = Some(s);
            handle.last_result.as_ref().unwrap().as_ptr()
        }
        Err(_) => std::ptr::null(),
    }
}

/// Install a global log subscriber at the given verbosity
///
/// Negative silences everything but errors, 0 is informational, 1 enables
/// debug output, anything higher enables trace output. The first call wins;
/// later calls are no-ops.
#[no_mangle]
pub extern "C" fn lid_set_log_level(level: c_int) {
    let max_level = match level {
        i if i < 0 => LevelFilter::ERROR,
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let _ = tracing_subscriber::fmt().with_max_level(max_level).try_init();
}
