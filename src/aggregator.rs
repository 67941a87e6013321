//! Running per-language score accumulation
//!
//! Frame scores are added into an f64 accumulator in arrival order. Because
//! chunked `accept` calls never reorder frames, feeding the same audio in any
//! chunking yields bit-identical accumulator state.

use ndarray::Array1;

/// Accumulates per-frame log-posteriors into running per-language scores
#[derive(Debug, Clone)]
pub struct LanguageAggregator {
    scores: Array1<f64>,
    frames: u64,
}

impl LanguageAggregator {
    pub fn new(num_languages: usize) -> Self {
        Self {
            scores: Array1::zeros(num_languages),
            frames: 0,
        }
    }

    /// Fold one frame's log-posterior vector into the running scores
    pub fn add(&mut self, frame_scores: &Array1<f32>) {
        debug_assert_eq!(frame_scores.len(), self.scores.len());
        for (acc, &s) in self.scores.iter_mut().zip(frame_scores.iter()) {
            *acc += s as f64;
        }
        self.frames += 1;
    }

    /// Current cumulative score per language, in language-table order
    pub fn scores(&self) -> &Array1<f64> {
        &self.scores
    }

    /// Number of frames folded in so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Return to the baseline (all-zero) state
    pub fn reset(&mut self) {
        self.scores.fill(0.0);
        self.frames = 0;
    }
}
