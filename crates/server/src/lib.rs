//! Figuro Voice Server
//!
//! HTTP endpoints for the voice assistant, Prometheus metrics and the
//! audio and session housekeeping tasks.

pub mod housekeeping;
pub mod http;
pub mod metrics;
pub mod state;

pub use housekeeping::{spawn_audio_cleanup, spawn_session_sweeper, sweep_audio_dir};
pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use figuro_voice_agent::AgentError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A remote collaborator failed on a request that needs it
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        if err.is_input_error() {
            return ServerError::InvalidRequest(err.to_string());
        }
        match err {
            AgentError::Chatbot(_) | AgentError::Speech(_) => ServerError::Upstream(err.to_string()),
            AgentError::Unavailable(what) => ServerError::Unavailable(format!("{what} is not configured")),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<figuro_voice_core::Error> for ServerError {
    fn from(err: figuro_voice_core::Error) -> Self {
        if err.is_input_error() {
            ServerError::InvalidRequest(err.to_string())
        } else {
            ServerError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        ::metrics::counter!("figuro_voice_errors_total", "kind" => self.kind()).increment(1);
        let status = StatusCode::from(self);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl ServerError {
    fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::NotFound(_) => "not_found",
            ServerError::Upstream(_) => "upstream",
            ServerError::Unavailable(_) => "unavailable",
            ServerError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figuro_voice_core::{BackendError, SpeechError};

    #[test]
    fn test_agent_error_mapping() {
        let err: ServerError =
            AgentError::Core(figuro_voice_core::Error::InvalidInput("empty".into())).into();
        assert_eq!(StatusCode::from(err), StatusCode::BAD_REQUEST);

        let err: ServerError = AgentError::Speech(SpeechError::Service("down".into())).into();
        assert_eq!(StatusCode::from(err), StatusCode::BAD_GATEWAY);

        let err: ServerError = AgentError::Unavailable("TTS backend").into();
        assert_eq!(StatusCode::from(err), StatusCode::SERVICE_UNAVAILABLE);

        let err: ServerError =
            AgentError::Core(figuro_voice_core::Error::Internal("boom".into())).into();
        assert_eq!(StatusCode::from(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_chatbot_errors() {
        use figuro_voice_agent::AgentError::Chatbot;
        let empty = figuro_voice_chatbot::ChatbotError::EmptyText;
        let err: ServerError = Chatbot(empty).into();
        assert_eq!(StatusCode::from(err), StatusCode::BAD_REQUEST);

        let backend = figuro_voice_chatbot::ChatbotError::Backend(BackendError::Timeout(10));
        let err: ServerError = Chatbot(backend).into();
        assert_eq!(StatusCode::from(err), StatusCode::BAD_GATEWAY);
    }
}
