//! Error types for language identification operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LidError>;

#[derive(Error, Debug)]
pub enum LidError {
    #[error("Model loading error: {0}")]
    ModelLoad(String),

    #[error("Unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    #[error("Invalid audio frame: {0}")]
    InvalidAudioFrame(String),

    #[error("Audio loading error: {0}")]
    AudioLoad(String),

    #[error("Result serialization error: {0}")]
    ResultFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LidError {
    pub fn model_load<S: Into<String>>(msg: S) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn invalid_audio<S: Into<String>>(msg: S) -> Self {
        Self::InvalidAudioFrame(msg.into())
    }

    pub fn audio_load<S: Into<String>>(msg: S) -> Self {
        Self::AudioLoad(msg.into())
    }
}
