//! Chatbot backend integration
//!
//! The store runs its own conversational service. The voice assistant
//! forwards each utterance to it and prefers its reply over the local
//! templates whenever the reply carries text.
//!
//! ## Example
//! ```ignore
//! let chatbot = create_backend(&settings.chatbot)?;
//! if let Some(backend) = chatbot {
//!     let reply = ask(backend.as_ref(), query).await?;
//! }
//! ```

pub mod client;

pub use client::HttpChatbotBackend;

use std::sync::Arc;

use thiserror::Error;

use figuro_voice_config::ChatbotConfig;
use figuro_voice_core::{BackendError, ChatbotBackend, ChatbotQuery, ChatbotReply};

#[derive(Error, Debug)]
pub enum ChatbotError {
    #[error("Query text is empty")]
    EmptyText,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<ChatbotError> for figuro_voice_core::Error {
    fn from(err: ChatbotError) -> Self {
        match err {
            ChatbotError::EmptyText => {
                figuro_voice_core::Error::InvalidInput("query text is empty".to_string())
            }
            ChatbotError::Configuration(msg) => figuro_voice_core::Error::Configuration(msg),
            ChatbotError::Backend(e) => figuro_voice_core::Error::Internal(e.to_string()),
        }
    }
}

/// Build the configured backend; `None` when the chatbot is disabled
pub fn create_backend(
    config: &ChatbotConfig,
) -> Result<Option<Arc<dyn ChatbotBackend>>, ChatbotError> {
    if !config.enabled {
        tracing::info!("Chatbot backend disabled, using local templates only");
        return Ok(None);
    }
    let backend = HttpChatbotBackend::new(config)?;
    tracing::info!(url = %config.base_url, "Chatbot backend configured");
    Ok(Some(Arc::new(backend)))
}

/// Validate and send one query
pub async fn ask(
    backend: &dyn ChatbotBackend,
    mut query: ChatbotQuery,
) -> Result<ChatbotReply, ChatbotError> {
    let text = query.text.trim().to_string();
    if text.is_empty() {
        return Err(ChatbotError::EmptyText);
    }
    query.text = text;
    Ok(backend.query(query).await?)
}
