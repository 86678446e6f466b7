//! Speech pipeline for the Figuro voice assistant
//!
//! - [`stt`]: transcription through the STT service
//! - [`tts`]: synthesis through the TTS service
//! - [`audio`]: upload format and size checks

pub mod audio;
pub mod stt;
pub mod tts;

pub use audio::{resolve_format, validate_audio};
pub use stt::{HttpSttConfig, HttpTranscriber};
pub use tts::{HttpSynthesizer, HttpTtsConfig};

use thiserror::Error;

/// Pipeline setup errors. Per-request speech failures use
/// [`figuro_voice_core::SpeechError`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<PipelineError> for figuro_voice_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Configuration(msg) => figuro_voice_core::Error::Configuration(msg),
        }
    }
}
