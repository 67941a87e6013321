//! Shared fixtures: a small synthetic model and signal generators
//!
//! The fixture model has three languages over 8 mel bins with one frame of
//! left context. The "english" row rewards energy in the low half of the
//! spectrum and penalizes the high half, "french" is its mirror image, and
//! "german" is neutral. A low-frequency tone therefore scores "english"
//! highest, which gives the end-to-end tests a deterministic target without
//! real speech data.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const NUM_MEL_BINS: usize = 8;
pub const LEFT_CONTEXT: usize = 1;

/// Languages in fixture table order
pub const LANGUAGES: [&str; 3] = ["english", "french", "german"];

/// Write a complete, internally consistent model directory
pub fn write_test_model(dir: &Path) {
    write_test_model_with_config(dir, default_config_json());
}

/// Write the fixture model with a caller-supplied `model.json` body
pub fn write_test_model_with_config(dir: &Path, config_json: &str) {
    fs::write(dir.join("model.json"), config_json).unwrap();
    fs::write(dir.join("languages.txt"), LANGUAGES.join("\n")).unwrap();

    let zeros = vec!["0.0"; NUM_MEL_BINS].join(" ");
    let ones = vec!["1.0"; NUM_MEL_BINS].join(" ");
    fs::write(dir.join("mean.vec"), zeros).unwrap();
    fs::write(dir.join("scale.vec"), ones).unwrap();

    fs::write(dir.join("transform.mat"), transform_lines().join("\n")).unwrap();
}

pub fn default_config_json() -> &'static str {
    r#"{
        "version": 1,
        "sample_rates": [8000, 16000],
        "feature": {
            "num_mel_bins": 8,
            "frame_length_ms": 25.0,
            "frame_shift_ms": 10.0,
            "low_freq": 20.0,
            "high_freq": 8000.0
        },
        "scorer": { "left_context": 1 }
    }"#
}

fn transform_lines() -> Vec<String> {
    let stacked = NUM_MEL_BINS * (LEFT_CONTEXT + 1);
    let mut rows = Vec::new();

    // english: +1 on the low half of each context slot, -1 on the high half
    let english: Vec<String> = (0..stacked)
        .map(|i| {
            if i % NUM_MEL_BINS < NUM_MEL_BINS / 2 {
                "1.0".to_string()
            } else {
                "-1.0".to_string()
            }
        })
        .chain(std::iter::once("0.0".to_string()))
        .collect();

    // french: mirror image of english
    let french: Vec<String> = (0..stacked)
        .map(|i| {
            if i % NUM_MEL_BINS < NUM_MEL_BINS / 2 {
                "-1.0".to_string()
            } else {
                "1.0".to_string()
            }
        })
        .chain(std::iter::once("0.0".to_string()))
        .collect();

    // german: neutral
    let german: Vec<String> = std::iter::repeat("0.0".to_string())
        .take(stacked + 1)
        .collect();

    rows.push(english.join(" "));
    rows.push(french.join(" "));
    rows.push(german.join(" "));
    rows
}

/// A mono sine tone as 16-bit samples
pub fn sine_wave(freq_hz: f32, sample_rate: u32, duration_secs: f32) -> Vec<i16> {
    let n = (sample_rate as f32 * duration_secs) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((2.0 * std::f32::consts::PI * freq_hz * t).sin() * 8000.0) as i16
        })
        .collect()
}

/// Encode samples as little-endian PCM bytes
pub fn to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
