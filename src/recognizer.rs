//! Streaming recognition session
//!
//! A `Recognizer` binds one shared model to one fixed sample rate and owns the
//! per-session pipeline: feature extraction, the scorer context window, and
//! the running per-language accumulator. `accept_waveform` advances the
//! session; `result` reads it without mutating anything, so it can be called
//! mid-stream as often as the caller likes.

use ndarray::Array1;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::aggregator::LanguageAggregator;
use crate::error::{LidError, Result};
use crate::features::FeatureExtractor;
use crate::model::LidModel;
use crate::scorer::AcousticScorer;

/// Scale factor from i16 PCM to f32 in [-1.0, 1.0]
const I16_SCALE: f32 = 1.0 / 32768.0;

/// One entry of the ranked-language result
///
/// The engine does not sort entries; selecting the maximum-score entry is the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageScore {
    /// Language label from the model's language table
    pub language: String,
    /// Cumulative log-posterior evidence for this language
    pub score: f64,
}

/// Stateful streaming language-identification session
#[derive(Debug)]
pub struct Recognizer {
    model: Arc<LidModel>,
    sample_rate: u32,
    extractor: FeatureExtractor,
    scorer: AcousticScorer,
    aggregator: LanguageAggregator,
    /// Most recent mel frames, oldest first, bounded by the scorer context
    context: VecDeque<Array1<f32>>,
}

impl Recognizer {
    /// Open a session bound to `model` at a fixed sample rate
    ///
    /// Fails with [`LidError::UnsupportedSampleRate`] when the model does not
    /// accept `sample_rate`. The engine never resamples; feeding audio at any
    /// other rate is a caller contract violation.
    pub fn new(model: Arc<LidModel>, sample_rate: u32) -> Result<Self> {
        if !model.supports_sample_rate(sample_rate) {
            return Err(LidError::UnsupportedSampleRate(sample_rate));
        }

        let extractor = FeatureExtractor::new(&model.config().feature, sample_rate);
        let scorer = AcousticScorer::new(Arc::clone(&model));
        let aggregator = LanguageAggregator::new(model.num_languages());

        debug!(
            "Opened recognizer: {} Hz, {} languages",
            sample_rate,
            model.num_languages()
        );

        Ok(Self {
            model,
            sample_rate,
            extractor,
            scorer,
            aggregator,
            context: VecDeque::new(),
        })
    }

    /// Feed little-endian 16-bit signed mono PCM bytes
    ///
    /// Fails with [`LidError::InvalidAudioFrame`] when the byte length is odd;
    /// the session state is untouched in that case and remains usable. The
    /// returned boolean is reserved for endpoint detection and is always
    /// `true` for well-formed input.
    pub fn accept_waveform(&mut self, data: &[u8]) -> Result<bool> {
        if data.len() % 2 != 0 {
            return Err(LidError::invalid_audio(format!(
                "PCM byte length must be a multiple of 2, got {}",
                data.len()
            )));
        }

        let samples: Vec<f32> = data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 * I16_SCALE)
            .collect();

        Ok(self.ingest(&samples))
    }

    /// Feed 16-bit signed mono samples
    pub fn accept_samples(&mut self, samples: &[i16]) -> Result<bool> {
        let scaled: Vec<f32> = samples.iter().map(|&s| s as f32 * I16_SCALE).collect();
        Ok(self.ingest(&scaled))
    }

    /// Feed mono samples already in [-1.0, 1.0]
    pub fn accept_waveform_f32(&mut self, samples: &[f32]) -> Result<bool> {
        Ok(self.ingest(samples))
    }

    fn ingest(&mut self, samples: &[f32]) -> bool {
        let vad_threshold = self.model.config().scorer.vad_energy_threshold;
        let context_frames = self.scorer.context_frames();

        for frame in self.extractor.push(samples) {
            if let Some(threshold) = vad_threshold {
                if frame.log_energy < threshold {
                    continue;
                }
            }

            self.context.push_back(frame.mel);
            while self.context.len() > context_frames {
                self.context.pop_front();
            }

            let window: Vec<Array1<f32>> = self.context.iter().cloned().collect();
            let frame_scores = self.scorer.score(&window);
            self.aggregator.add(&frame_scores);
        }

        true
    }

    /// Snapshot of the current per-language scores, one entry per model language
    ///
    /// Idempotent; never mutates session state. Before any audio is accepted
    /// every language carries the baseline score of zero.
    pub fn result(&self) -> Vec<LanguageScore> {
        self.model
            .languages()
            .iter()
            .zip(self.aggregator.scores().iter())
            .map(|(language, &score)| LanguageScore {
                language: language.clone(),
                score,
            })
            .collect()
    }

    /// `result()` serialized as the JSON list the binding layer parses
    pub fn result_json(&self) -> Result<String> {
        serde_json::to_string(&self.result()).map_err(|e| LidError::ResultFormat(e.to_string()))
    }

    /// Clear all session state for a new utterance; the model binding and
    /// sample rate stay fixed
    pub fn reset(&mut self) {
        self.extractor.reset();
        self.aggregator.reset();
        self.context.clear();
    }

    /// Number of frames scored so far
    pub fn frame_count(&self) -> u64 {
        self.aggregator.frames()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn model(&self) -> &Arc<LidModel> {
        &self.model
    }
}
