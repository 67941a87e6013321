//! Acoustic scorer: feature frames to per-language log-posteriors
//!
//! The scorer is a pure function of its input and the model parameters:
//! each incoming frame is normalized with the model's per-bin stats, stacked
//! with its left context (oldest first), passed through the model's affine
//! transform, and converted to log-posteriors with a stable log-softmax.
//!
//! All session state (the context window itself) lives in the recognizer, so
//! one scorer is reusable across sessions and deterministic by construction.

use ndarray::{s, Array1};
use std::sync::Arc;

use crate::model::LidModel;

/// Stateless per-frame language scorer backed by a shared model
#[derive(Debug)]
pub struct AcousticScorer {
    model: Arc<LidModel>,
}

impl AcousticScorer {
    pub fn new(model: Arc<LidModel>) -> Self {
        Self { model }
    }

    /// Frames of left context the caller must carry, including the current frame
    pub fn context_frames(&self) -> usize {
        self.model.config().scorer.left_context + 1
    }

    /// Score one frame given its context window
    ///
    /// `context` holds the current frame and up to `left_context` preceding
    /// mel frames, oldest first, current frame last. When fewer frames exist
    /// (start of stream) the earliest available frame is repeated to fill the
    /// window. Returns one log-posterior per language, each `<= 0`.
    pub fn score(&self, context: &[Array1<f32>]) -> Array1<f32> {
        debug_assert!(!context.is_empty());
        debug_assert!(context.len() <= self.context_frames());

        let mean = self.model.mean();
        let scale = self.model.scale();
        let num_bins = mean.len();
        let needed = self.context_frames();

        // Normalize and stack, repeating the earliest frame to pad the left edge
        let mut stacked = Array1::zeros(num_bins * needed);
        for slot in 0..needed {
            let src_idx = (context.len() + slot).saturating_sub(needed).min(context.len() - 1);
            let normalized = (&context[src_idx] - mean) * scale;
            stacked
                .slice_mut(s![slot * num_bins..(slot + 1) * num_bins])
                .assign(&normalized);
        }

        let transform = self.model.transform();
        let stacked_dim = transform.ncols() - 1;
        let weights = transform.slice(s![.., ..stacked_dim]);
        let bias = transform.slice(s![.., stacked_dim]);

        let logits = weights.dot(&stacked) + bias;
        log_softmax(&logits)
    }
}

/// Numerically stable log-softmax
fn log_softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let log_sum = logits.mapv(|z| (z - max).exp()).sum().ln() + max;
    logits.mapv(|z| z - log_sum)
}
