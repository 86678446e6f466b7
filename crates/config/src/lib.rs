//! Configuration management for the Figuro voice assistant
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`FIGURO_VOICE__` prefix, `__` separator)
//!
//! Pattern tables and response templates have built-in defaults and can be
//! replaced by YAML files referenced from `nlu.patterns_path` /
//! `nlu.templates_path`.

pub mod constants;
pub mod patterns;
pub mod settings;
pub mod templates;

pub use patterns::{EntityPatterns, IntentPatterns, PatternLibrary};
pub use settings::{
    load_settings, CatalogConfig, ChatbotConfig, HousekeepingConfig, NluConfig,
    ObservabilityConfig, RuntimeEnvironment, ScoringWeights, ServerConfig, SessionConfig,
    Settings, SpeechConfig,
};
pub use templates::{KeywordResponse, ResponseTemplate, TemplateTable};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for figuro_voice_core::Error {
    fn from(err: ConfigError) -> Self {
        figuro_voice_core::Error::Configuration(err.to_string())
    }
}
