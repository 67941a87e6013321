//! C ABI round trip: the exact call sequence a binding layer performs.

mod common;

use lid_engine::ffi::{
    lid_model_free, lid_model_new, lid_recognizer_accept_waveform,
    lid_recognizer_accept_waveform_f, lid_recognizer_accept_waveform_s, lid_recognizer_free,
    lid_recognizer_lang_result, lid_recognizer_new,
};
use std::ffi::{CStr, CString};
use tempfile::tempdir;

#[test]
fn binding_call_sequence_round_trips() {
    let dir = tempdir().unwrap();
    common::write_test_model(dir.path());

    let path = CString::new(dir.path().to_str().unwrap()).unwrap();
    unsafe {
        let model = lid_model_new(path.as_ptr());
        assert!(!model.is_null());

        let recognizer = lid_recognizer_new(model, 16000.0);
        assert!(!recognizer.is_null());

        // The model handle may be released while sessions still reference it
        lid_model_free(model);

        let audio = common::to_le_bytes(&common::sine_wave(300.0, 16000, 0.5));
        assert!(lid_recognizer_accept_waveform(
            recognizer,
            audio.as_ptr(),
            audio.len() as i32
        ));

        let result = lid_recognizer_lang_result(recognizer);
        assert!(!result.is_null());
        let json = CStr::from_ptr(result).to_str().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), common::LANGUAGES.len());

        lid_recognizer_free(recognizer);
    }
}

#[test]
fn typed_accept_entry_points_match_the_byte_feed() {
    let dir = tempdir().unwrap();
    common::write_test_model(dir.path());

    let samples = common::sine_wave(300.0, 16000, 0.5);
    let bytes = common::to_le_bytes(&samples);
    let floats: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

    let path = CString::new(dir.path().to_str().unwrap()).unwrap();
    unsafe {
        let model = lid_model_new(path.as_ptr());
        assert!(!model.is_null());

        let by_bytes = lid_recognizer_new(model, 16000.0);
        let by_shorts = lid_recognizer_new(model, 16000.0);
        let by_floats = lid_recognizer_new(model, 16000.0);
        lid_model_free(model);

        assert!(lid_recognizer_accept_waveform(
            by_bytes,
            bytes.as_ptr(),
            bytes.len() as i32
        ));
        assert!(lid_recognizer_accept_waveform_s(
            by_shorts,
            samples.as_ptr(),
            samples.len() as i32
        ));
        assert!(lid_recognizer_accept_waveform_f(
            by_floats,
            floats.as_ptr(),
            floats.len() as i32
        ));

        let reference = CStr::from_ptr(lid_recognizer_lang_result(by_bytes))
            .to_str()
            .unwrap()
            .to_owned();
        for handle in [by_shorts, by_floats] {
            let json = CStr::from_ptr(lid_recognizer_lang_result(handle))
                .to_str()
                .unwrap();
            assert_eq!(json, reference);
        }

        // Null data and negative lengths are rejected, not dereferenced
        assert!(!lid_recognizer_accept_waveform_s(by_shorts, std::ptr::null(), 4));
        assert!(!lid_recognizer_accept_waveform_f(by_floats, floats.as_ptr(), -1));

        lid_recognizer_free(by_bytes);
        lid_recognizer_free(by_shorts);
        lid_recognizer_free(by_floats);
    }
}

#[test]
fn model_new_returns_null_for_bad_input() {
    unsafe {
        assert!(lid_model_new(std::ptr::null()).is_null());

        let missing = CString::new("/nonexistent/model/dir").unwrap();
        assert!(lid_model_new(missing.as_ptr()).is_null());
    }
}

#[test]
fn recognizer_new_returns_null_for_bad_rate() {
    let dir = tempdir().unwrap();
    common::write_test_model(dir.path());

    let path = CString::new(dir.path().to_str().unwrap()).unwrap();
    unsafe {
        let model = lid_model_new(path.as_ptr());
        assert!(!model.is_null());

        assert!(lid_recognizer_new(std::ptr::null_mut(), 16000.0).is_null());
        assert!(lid_recognizer_new(model, -1.0).is_null());
        assert!(lid_recognizer_new(model, 44100.0).is_null());

        lid_model_free(model);
    }
}

#[test]
fn odd_length_waveform_returns_false_and_preserves_state() {
    let dir = tempdir().unwrap();
    common::write_test_model(dir.path());

    let path = CString::new(dir.path().to_str().unwrap()).unwrap();
    unsafe {
        let model = lid_model_new(path.as_ptr());
        let recognizer = lid_recognizer_new(model, 16000.0);
        lid_model_free(model);

        let audio = common::to_le_bytes(&common::sine_wave(300.0, 16000, 0.3));
        assert!(lid_recognizer_accept_waveform(
            recognizer,
            audio.as_ptr(),
            audio.len() as i32
        ));
        let before = CStr::from_ptr(lid_recognizer_lang_result(recognizer))
            .to_str()
            .unwrap()
            .to_owned();

        assert!(!lid_recognizer_accept_waveform(recognizer, audio.as_ptr(), 5));

        let after = CStr::from_ptr(lid_recognizer_lang_result(recognizer))
            .to_str()
            .unwrap()
            .to_owned();
        assert_eq!(before, after);

        lid_recognizer_free(recognizer);
    }
}
