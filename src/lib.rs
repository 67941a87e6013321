//! Streaming spoken-language identification engine
//!
//! Feeds mono 16-bit PCM audio through a log-mel front end, an affine
//! acoustic scorer, and a running per-language accumulator, producing a
//! ranked-language result at any point in the stream.
//!
//! ## Features
//!
//! - Streaming `accept`/`result` sessions with bounded buffering
//! - Chunking-independent results: any split of the same audio yields
//!   bit-identical scores
//! - Models shared between concurrent sessions via `Arc`
//! - A C ABI (`lid_model_new`, `lid_recognizer_new`, ...) for host-language
//!   bindings, exported from the cdylib
//!
//! ## Quick Start
//!
//! ```no_run
//! use lid_engine::{LidModel, Recognizer};
//! use std::sync::Arc;
//!
//! let model = Arc::new(LidModel::load("lid-107")?);
//! let mut recognizer = Recognizer::new(model, 16000)?;
//!
//! let (samples, _rate) = lid_engine::audio::read_wav_mono("speech.wav")?;
//! recognizer.accept_samples(&samples)?;
//!
//! let best = recognizer
//!     .result()
//!     .into_iter()
//!     .max_by(|a, b| a.score.total_cmp(&b.score))
//!     .expect("language table is never empty");
//! println!("Detected: {}", best.language);
//! # Ok::<(), lid_engine::LidError>(())
//! ```

pub mod aggregator;
pub mod audio;
pub mod error;
pub mod features;
pub mod ffi;
pub mod languages;
pub mod model;
pub mod recognizer;
pub mod scorer;

pub use aggregator::LanguageAggregator;
pub use error::{LidError, Result};
pub use features::{FeatureExtractor, FeatureFrame};
pub use model::{LidModel, ModelConfig};
pub use recognizer::{LanguageScore, Recognizer};
pub use scorer::AcousticScorer;
