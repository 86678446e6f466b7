//! Remote backend traits (chatbot and product catalog)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, Language, Product};

/// Soft failures from remote backends
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend disabled")]
    Disabled,
}

/// Context forwarded with a chatbot query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotContext {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub previous_queries: Vec<String>,
}

impl Default for ChatbotContext {
    fn default() -> Self {
        Self {
            source: "voice_agent".to_string(),
            session_id: None,
            previous_queries: Vec::new(),
        }
    }
}

/// Query sent to the chatbot backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotQuery {
    pub text: String,
    pub language: Language,
    #[serde(default)]
    pub context: ChatbotContext,
}

/// Follow-up action suggested by the chatbot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Reply from the chatbot backend; `response` may be absent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatbotReply {
    #[serde(default, alias = "message")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<ChatbotAction>,
}

impl ChatbotReply {
    /// Reply text, if present and not blank
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Remote conversational backend
#[async_trait]
pub trait ChatbotBackend: Send + Sync + 'static {
    async fn query(&self, query: ChatbotQuery) -> Result<ChatbotReply, BackendError>;
}

/// Remote product catalog
#[async_trait]
pub trait ProductBackend: Send + Sync + 'static {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text_ignores_blank() {
        let reply = ChatbotReply {
            response: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(reply.text(), None);

        let reply = ChatbotReply {
            response: Some(" Hello! ".into()),
            ..Default::default()
        };
        assert_eq!(reply.text(), Some("Hello!"));
    }

    #[test]
    fn test_reply_accepts_message_field() {
        let reply: ChatbotReply = serde_json::from_str(
            r#"{"success": true, "message": "Chào bạn", "suggestions": ["Xem sản phẩm"]}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), Some("Chào bạn"));
        assert_eq!(reply.suggestions.len(), 1);
    }

    #[test]
    fn test_query_context_is_camel_case() {
        let query = ChatbotQuery {
            text: "xin chào".into(),
            language: Language::Vietnamese,
            context: ChatbotContext {
                session_id: Some("abc".into()),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["language"], "vi-VN");
        assert_eq!(json["context"]["sessionId"], "abc");
        assert_eq!(json["context"]["source"], "voice_agent");
    }
}
