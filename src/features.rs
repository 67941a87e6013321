//! Streaming log-mel filterbank front end
//!
//! Converts raw PCM samples into fixed-rate feature frames: one frame per hop
//! (default 10 ms) over a sliding analysis window (default 25 ms). Samples are
//! buffered internally so `accept` calls can be chunked arbitrarily without
//! changing the emitted frame sequence.
//!
//! A trailing partial window at end of stream is discarded, never flushed or
//! zero-padded.

use ndarray::{Array1, Array2};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::debug;

use crate::model::FeatureParams;

/// Floor added before taking logs, to avoid log(0) on silence
const LOG_FLOOR: f32 = 1e-10;

/// A single emitted feature frame
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    /// Log of the raw frame energy, used by the voicing gate
    pub log_energy: f32,
    /// Log-mel filterbank values
    pub mel: Array1<f32>,
}

/// Resolved per-session feature configuration
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub sample_rate: u32,
    pub num_mel_bins: usize,
    /// Analysis window length in samples
    pub frame_length: usize,
    /// Hop between frames in samples
    pub frame_shift: usize,
    pub fft_size: usize,
    pub low_freq: f32,
    pub high_freq: f32,
}

impl FeatureConfig {
    /// Resolve model feature parameters against a session sample rate
    pub fn resolve(params: &FeatureParams, sample_rate: u32) -> Self {
        let frame_length = (params.frame_length_ms * sample_rate as f32 / 1000.0).round() as usize;
        let frame_shift = (params.frame_shift_ms * sample_rate as f32 / 1000.0).round() as usize;
        let nyquist = sample_rate as f32 / 2.0;

        Self {
            sample_rate,
            num_mel_bins: params.num_mel_bins,
            frame_length,
            frame_shift,
            fft_size: frame_length.next_power_of_two(),
            low_freq: params.low_freq,
            high_freq: params.high_freq.min(nyquist),
        }
    }
}

/// Streaming log-mel feature extractor
///
/// Holds at most one window's worth of trailing samples between calls.
pub struct FeatureExtractor {
    config: FeatureConfig,
    mel_filters: Array2<f32>,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    /// Trailing samples not yet consumed by a full window
    pending: Vec<f32>,
}

impl std::fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("config", &self.config)
            .field("mel_filters", &self.mel_filters)
            .field("window", &self.window)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl FeatureExtractor {
    pub fn new(params: &FeatureParams, sample_rate: u32) -> Self {
        let config = FeatureConfig::resolve(params, sample_rate);
        // Model validation rejects timings that resolve to degenerate sample
        // counts; a zero hop here would keep push() from ever draining.
        assert!(
            config.frame_shift > 0 && config.frame_length >= 2,
            "frame timing resolves to {} shift / {} length samples at {} Hz",
            config.frame_shift,
            config.frame_length,
            sample_rate
        );
        let mel_filters = create_mel_filterbank(
            config.num_mel_bins,
            config.fft_size,
            sample_rate as f32,
            config.low_freq,
            config.high_freq,
        );
        let window = hamming_window(config.frame_length);
        let fft = FftPlanner::new().plan_fft_forward(config.fft_size);

        debug!(
            "Feature extractor: {} Hz, window {} samples, hop {} samples, fft {}",
            sample_rate, config.frame_length, config.frame_shift, config.fft_size
        );

        Self {
            config,
            mel_filters,
            window,
            fft,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Append samples and emit every frame that is now complete
    ///
    /// Samples are mono f32 in [-1.0, 1.0]. The emitted frame sequence depends
    /// only on the concatenation of all pushed samples, never on chunking.
    pub fn push(&mut self, samples: &[f32]) -> Vec<FeatureFrame> {
        self.pending.extend_from_slice(samples);

        let mut frames = Vec::new();
        while self.pending.len() >= self.config.frame_length {
            let frame = &self.pending[..self.config.frame_length];
            frames.push(self.compute_frame(frame));
            self.pending.drain(..self.config.frame_shift);
        }
        frames
    }

    /// Number of buffered samples awaiting a complete window
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop buffered samples, ready for a new utterance
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    fn compute_frame(&self, frame: &[f32]) -> FeatureFrame {
        let energy: f32 = frame.iter().map(|s| s * s).sum();
        let log_energy = (energy + LOG_FLOOR).ln();

        // Windowed frame, zero-padded to the FFT size
        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); self.config.fft_size];
        for (i, (&s, &w)) in frame.iter().zip(self.window.iter()).enumerate() {
            buffer[i] = Complex::new(s * w, 0.0);
        }

        self.fft.process(&mut buffer);

        // Power spectrum over the non-redundant bins
        let freq_bins = self.config.fft_size / 2 + 1;
        let power: Array1<f32> = Array1::from_iter(
            buffer[..freq_bins]
                .iter()
                .map(|c| c.re * c.re + c.im * c.im),
        );

        let mel = self.mel_filters.dot(&power).mapv(|x| (x + LOG_FLOOR).ln());

        FeatureFrame { log_energy, mel }
    }
}

/// Hamming window of the given length
fn hamming_window(window_length: usize) -> Vec<f32> {
    (0..window_length)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f32 / (window_length - 1) as f32).cos())
        .collect()
}

/// Convert Hz to mel scale
fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel scale to Hz
fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Create a triangular mel filterbank matrix of shape (n_mels, n_fft/2 + 1)
fn create_mel_filterbank(
    n_mels: usize,
    n_fft: usize,
    sample_rate: f32,
    fmin: f32,
    fmax: f32,
) -> Array2<f32> {
    let freq_bins = n_fft / 2 + 1;

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let mel_points: Vec<f32> = (0..=n_mels + 1)
        .map(|i| {
            let mel = mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32;
            mel_to_hz(mel)
        })
        .collect();

    let freq_bin_width = sample_rate / n_fft as f32;
    let mut filterbank = Array2::zeros((n_mels, freq_bins));

    for mel_idx in 0..n_mels {
        let left = mel_points[mel_idx];
        let center = mel_points[mel_idx + 1];
        let right = mel_points[mel_idx + 2];

        for freq_idx in 0..freq_bins {
            let freq = freq_idx as f32 * freq_bin_width;

            if freq >= left && freq <= center {
                if center != left {
                    filterbank[[mel_idx, freq_idx]] = (freq - left) / (center - left);
                }
            } else if freq > center && freq <= right && right != center {
                filterbank[[mel_idx, freq_idx]] = (right - freq) / (right - center);
            }
        }
    }

    filterbank
}
