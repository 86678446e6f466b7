//! Voice request orchestration
//!
//! Features:
//! - Text and audio request processing through [`VoiceAgent`]
//! - Chatbot reply merged with local templates ([`ResponseComposer`])
//! - Intent-gated product recommendations from the catalog cache
//! - Optional speech synthesis of the final response
//! - Per-session conversation memory and aggregate insights

pub mod agent;
pub mod composer;
pub mod session;

pub use agent::{
    AgentConfig, HealthReport, ProcessOptions, ProcessedTurn, VoiceAgent, STT_AUDIO_ERROR,
    STT_SERVICE_ERROR, STT_UNRECOGNIZED,
};
pub use composer::{format_price, suggested_actions, ResponseComposer};
pub use session::{ConversationContext, Insights, LabelCount, SessionPreferences, SessionStore};

use thiserror::Error;

use figuro_voice_catalog::CatalogError;
use figuro_voice_chatbot::ChatbotError;
use figuro_voice_config::ConfigError;
use figuro_voice_core::SpeechError;
use figuro_voice_pipeline::PipelineError;
use figuro_voice_text_processing::NluError;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Rejected input or internal fault from the core taxonomy
    #[error(transparent)]
    Core(#[from] figuro_voice_core::Error),

    #[error("NLU setup error: {0}")]
    Nlu(#[from] NluError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chatbot error: {0}")]
    Chatbot(#[from] ChatbotError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    /// A collaborator the request needs is not configured
    #[error("{0} is not configured")]
    Unavailable(&'static str),
}

impl AgentError {
    /// Whether the caller's input caused the failure
    pub fn is_input_error(&self) -> bool {
        match self {
            AgentError::Core(e) => e.is_input_error(),
            AgentError::Chatbot(ChatbotError::EmptyText) => true,
            _ => false,
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Core(e) => e.kind(),
            AgentError::Nlu(_) => "nlu",
            AgentError::Config(_) => "configuration",
            AgentError::Chatbot(_) => "chatbot",
            AgentError::Catalog(_) => "catalog",
            AgentError::Pipeline(_) => "pipeline",
            AgentError::Speech(_) => "speech",
            AgentError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<AgentError> for figuro_voice_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Core(e) => e,
            AgentError::Nlu(e) => e.into(),
            AgentError::Config(e) => e.into(),
            AgentError::Chatbot(e) => e.into(),
            AgentError::Catalog(e) => e.into(),
            AgentError::Pipeline(e) => e.into(),
            other => figuro_voice_core::Error::Internal(other.to_string()),
        }
    }
}
