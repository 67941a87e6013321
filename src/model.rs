//! Model loading and validation
//!
//! A model directory bundles everything a recognizer session needs:
//!
//! - `model.json`      — engine configuration (sample rates, feature and scorer parameters)
//! - `languages.txt`   — one language label per line; line order defines the language table
//! - `mean.vec`        — per-mel-bin normalization means
//! - `scale.vec`       — per-mel-bin normalization scales (inverse standard deviations)
//! - `transform.mat`   — affine scorer parameters, one row per language,
//!   `stacked_dim + 1` columns (last column is the bias)
//!
//! The loaded model is immutable and `Send + Sync`; any number of recognizer
//! sessions may share it through an `Arc`.

use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{LidError, Result};

/// Supported model format version
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Feature extraction parameters
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureParams {
    /// Number of mel filterbank bins
    pub num_mel_bins: usize,
    /// Analysis window length in milliseconds
    #[serde(default = "default_frame_length_ms")]
    pub frame_length_ms: f32,
    /// Hop between consecutive frames in milliseconds
    #[serde(default = "default_frame_shift_ms")]
    pub frame_shift_ms: f32,
    /// Lower edge of the mel filterbank in Hz
    #[serde(default = "default_low_freq")]
    pub low_freq: f32,
    /// Upper edge of the mel filterbank in Hz (clamped to Nyquist per session)
    #[serde(default = "default_high_freq")]
    pub high_freq: f32,
}

fn default_frame_length_ms() -> f32 {
    25.0
}

fn default_frame_shift_ms() -> f32 {
    10.0
}

fn default_low_freq() -> f32 {
    20.0
}

fn default_high_freq() -> f32 {
    8000.0
}

/// Acoustic scorer parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ScorerParams {
    /// Number of preceding frames stacked with the current frame
    #[serde(default)]
    pub left_context: usize,
    /// Log-energy threshold below which frames are treated as unvoiced
    /// and skipped. Absent means no voicing gate.
    #[serde(default)]
    pub vad_energy_threshold: Option<f32>,
}

/// Model configuration, deserialized from `model.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model format version
    pub version: u32,
    /// Sample rates the model accepts; callers must resample beforehand
    pub sample_rates: Vec<u32>,
    /// Feature extraction parameters
    pub feature: FeatureParams,
    /// Scorer parameters
    pub scorer: ScorerParams,
}

impl ModelConfig {
    /// Dimensionality of the stacked scorer input
    pub fn stacked_dim(&self) -> usize {
        self.feature.num_mel_bins * (self.scorer.left_context + 1)
    }
}

/// Immutable bundle of trained language-identification parameters
#[derive(Debug)]
pub struct LidModel {
    config: ModelConfig,
    languages: Vec<String>,
    mean: Array1<f32>,
    scale: Array1<f32>,
    transform: Array2<f32>,
    path: PathBuf,
}

impl LidModel {
    /// Load a model from a directory
    ///
    /// Fails with [`LidError::ModelLoad`] if any required file is missing,
    /// malformed, version-mismatched, or internally inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base = path.as_ref();

        if !base.is_dir() {
            return Err(LidError::model_load(format!(
                "Model directory does not exist: {}",
                base.display()
            )));
        }

        let config = Self::read_config(&base.join("model.json"))?;

        if config.version != MODEL_FORMAT_VERSION {
            return Err(LidError::model_load(format!(
                "Unsupported model format version {} (expected {})",
                config.version, MODEL_FORMAT_VERSION
            )));
        }

        let languages = read_language_table(&base.join("languages.txt"))?;
        let mean = read_vector(&base.join("mean.vec"))?;
        let scale = read_vector(&base.join("scale.vec"))?;
        let transform = read_matrix(&base.join("transform.mat"))?;

        let model = Self {
            config,
            languages,
            mean,
            scale,
            transform,
            path: base.to_path_buf(),
        };
        model.validate()?;

        info!(
            "Loaded model from {}: {} languages, {} mel bins, left context {}",
            model.path.display(),
            model.languages.len(),
            model.config.feature.num_mel_bins,
            model.config.scorer.left_context
        );

        Ok(model)
    }

    fn read_config(path: &Path) -> Result<ModelConfig> {
        let mut contents = String::new();
        File::open(path)
            .map_err(|e| LidError::model_load(format!("Failed to open {}: {}", path.display(), e)))?
            .read_to_string(&mut contents)?;

        serde_json::from_str(&contents)
            .map_err(|e| LidError::model_load(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Check internal consistency of the loaded parameter set
    fn validate(&self) -> Result<()> {
        let feat = &self.config.feature;

        if self.config.sample_rates.is_empty() {
            return Err(LidError::model_load("Model declares no supported sample rates"));
        }
        if feat.num_mel_bins == 0 {
            return Err(LidError::model_load("num_mel_bins must be positive"));
        }
        if feat.frame_shift_ms <= 0.0 || feat.frame_shift_ms > feat.frame_length_ms {
            return Err(LidError::model_load(format!(
                "Invalid frame timing: shift {} ms, length {} ms",
                feat.frame_shift_ms, feat.frame_length_ms
            )));
        }

        // The millisecond values must survive conversion to whole samples at
        // every declared rate, or a session at that rate could never advance
        // its window.
        for &rate in &self.config.sample_rates {
            let resolved = crate::features::FeatureConfig::resolve(feat, rate);
            if resolved.frame_shift == 0 || resolved.frame_length < 2 {
                return Err(LidError::model_load(format!(
                    "Frame timing resolves to {} shift / {} length samples at {} Hz",
                    resolved.frame_shift, resolved.frame_length, rate
                )));
            }
        }

        let num_langs = self.languages.len();
        let expected_cols = self.config.stacked_dim() + 1;

        if self.transform.nrows() != num_langs {
            return Err(LidError::model_load(format!(
                "Language table has {} entries but transform.mat has {} rows",
                num_langs,
                self.transform.nrows()
            )));
        }
        if self.transform.ncols() != expected_cols {
            return Err(LidError::model_load(format!(
                "transform.mat has {} columns, expected {} (stacked dim + bias)",
                self.transform.ncols(),
                expected_cols
            )));
        }
        if self.mean.len() != feat.num_mel_bins {
            return Err(LidError::model_load(format!(
                "mean.vec has {} values, expected {}",
                self.mean.len(),
                feat.num_mel_bins
            )));
        }
        if self.scale.len() != feat.num_mel_bins {
            return Err(LidError::model_load(format!(
                "scale.vec has {} values, expected {}",
                self.scale.len(),
                feat.num_mel_bins
            )));
        }

        Ok(())
    }

    /// Whether `rate` is one of the sample rates this model accepts
    pub fn supports_sample_rate(&self, rate: u32) -> bool {
        self.config.sample_rates.contains(&rate)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Ordered language table
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn num_languages(&self) -> usize {
        self.languages.len()
    }

    pub fn mean(&self) -> &Array1<f32> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f32> {
        &self.scale
    }

    /// Affine scorer parameters: one row per language, last column is the bias
    pub fn transform(&self) -> &Array2<f32> {
        &self.transform
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read the ordered language table, one label per line
fn read_language_table(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .map_err(|e| LidError::model_load(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    let mut languages = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let label = line.map_err(|e| {
            LidError::model_load(format!("Failed to read language line {}: {}", idx, e))
        })?;
        let label = label.trim();
        if !label.is_empty() {
            languages.push(label.to_string());
        }
    }

    if languages.is_empty() {
        return Err(LidError::model_load(format!(
            "Language table is empty: {}",
            path.display()
        )));
    }

    Ok(languages)
}

/// Parse a whitespace-separated float vector, tolerating Kaldi-style brackets
fn read_vector(path: &Path) -> Result<Array1<f32>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| LidError::model_load(format!("Failed to open {}: {}", path.display(), e)))?;

    let values = parse_floats(&contents)
        .map_err(|e| LidError::model_load(format!("Failed to parse {}: {}", path.display(), e)))?;

    Ok(Array1::from_vec(values))
}

/// Parse a float matrix, one row per non-empty line, tolerating Kaldi-style brackets
fn read_matrix(path: &Path) -> Result<Array2<f32>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| LidError::model_load(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut rows: Vec<Vec<f32>> = Vec::new();
    for line in contents.lines() {
        let values = parse_floats(line)
            .map_err(|e| LidError::model_load(format!("Failed to parse {}: {}", path.display(), e)))?;
        if !values.is_empty() {
            rows.push(values);
        }
    }

    if rows.is_empty() {
        return Err(LidError::model_load(format!(
            "Matrix file is empty: {}",
            path.display()
        )));
    }

    let ncols = rows[0].len();
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(LidError::model_load(format!(
            "Ragged matrix in {}: rows differ in length",
            path.display()
        )));
    }

    let nrows = rows.len();
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| LidError::model_load(format!("Bad matrix shape in {}: {}", path.display(), e)))
}

fn parse_floats(text: &str) -> std::result::Result<Vec<f32>, String> {
    text.split_whitespace()
        .filter(|tok| *tok != "[" && *tok != "]")
        .map(|tok| {
            tok.parse::<f32>()
                .map_err(|e| format!("invalid float {:?}: {}", tok, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_floats_plain() {
        let v = parse_floats("1.0 -2.5 3").unwrap();
        assert_eq!(v, vec![1.0, -2.5, 3.0]);
    }

    #[test]
    fn test_parse_floats_kaldi_brackets() {
        let v = parse_floats("[ 0.5 1.5 ]").unwrap();
        assert_eq!(v, vec![0.5, 1.5]);
    }

    #[test]
    fn test_parse_floats_rejects_garbage() {
        assert!(parse_floats("1.0 abc").is_err());
    }

    #[test]
    fn test_load_missing_directory() {
        let err = LidModel::load("/nonexistent/model/dir").unwrap_err();
        assert!(matches!(err, LidError::ModelLoad(_)));
    }
}
