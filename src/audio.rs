//! WAV loading helper for callers
//!
//! The engine itself only consumes raw PCM; the file contract (WAV container,
//! single channel, 16-bit uncompressed PCM) is enforced here, caller-side,
//! before any audio reaches a recognizer.

use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::info;

use crate::error::{LidError, Result};

/// Read a mono 16-bit PCM WAV file
///
/// Returns the samples and the file's sample rate. Files with more than one
/// channel, a different bit depth, or a float sample format are rejected with
/// [`LidError::AudioLoad`].
pub fn read_wav_mono<P: AsRef<Path>>(path: P) -> Result<(Vec<i16>, u32)> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path)
        .map_err(|e| LidError::audio_load(format!("Failed to open WAV: {}", e)))?;

    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(LidError::audio_load(format!(
            "Audio file must be mono, got {} channels",
            spec.channels
        )));
    }
    if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(LidError::audio_load(format!(
            "Audio file must be 16-bit integer PCM, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| LidError::audio_load(format!("Failed to read samples: {}", e)))?;

    info!(
        "Loaded WAV {}: {} Hz, {} samples",
        path.display(),
        spec.sample_rate,
        samples.len()
    );

    Ok((samples, spec.sample_rate))
}
