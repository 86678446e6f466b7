//! Error types shared across the workspace

use thiserror::Error;

/// Result alias using the core error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced at the pipeline boundary.
///
/// Soft collaborator failures (speech, chatbot, catalog) never reach this
/// type; they are absorbed where they happen. What remains is either a
/// rejected input or an internal fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedAudioFormat(String),

    #[error("Audio payload too large: {size} bytes (max {max})")]
    AudioTooLarge { size: usize, max: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error was caused by the caller's input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::UnsupportedLanguage(_)
                | Error::UnsupportedAudioFormat(_)
                | Error::AudioTooLarge { .. }
        )
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::UnsupportedLanguage(_) => "unsupported_language",
            Error::UnsupportedAudioFormat(_) => "unsupported_audio_format",
            Error::AudioTooLarge { .. } => "audio_too_large",
            Error::Configuration(_) => "configuration",
            Error::Internal(_) => "internal",
        }
    }
}
