//! Error types for text processing

use thiserror::Error;

/// Result type for NLU setup
pub type Result<T> = std::result::Result<T, NluError>;

/// Failures building the NLU engine. Matching itself never fails.
#[derive(Error, Debug)]
pub enum NluError {
    #[error("Invalid pattern for '{label}' ({pattern}): {message}")]
    Pattern {
        label: String,
        pattern: String,
        message: String,
    },

    #[error(transparent)]
    Config(#[from] figuro_voice_config::ConfigError),
}

impl From<NluError> for figuro_voice_core::Error {
    fn from(err: NluError) -> Self {
        figuro_voice_core::Error::Configuration(err.to_string())
    }
}
