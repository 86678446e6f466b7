//! HTTP chatbot backend
//!
//! `POST {base_url}/chatbot/query` with `{text, language, context}`. The
//! store wraps replies as `{statusCode, message, data: {success, message,
//! intent, suggestions, actions}}`; a flat reply object is accepted too.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use figuro_voice_config::ChatbotConfig;
use figuro_voice_core::{BackendError, ChatbotBackend, ChatbotQuery, ChatbotReply};

use crate::ChatbotError;

/// reqwest-backed [`ChatbotBackend`]
#[derive(Clone)]
pub struct HttpChatbotBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpChatbotBackend {
    pub fn new(config: &ChatbotConfig) -> Result<Self, ChatbotError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatbotError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn query_url(&self) -> String {
        format!("{}/chatbot/query", self.base_url)
    }

    /// Unwrap the store envelope when present, otherwise read a flat reply
    fn parse_body(body: &str) -> Result<ChatbotReply, BackendError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let enveloped = value.get("data").is_some() || value.get("statusCode").is_some();
        if !enveloped {
            return serde_json::from_value(value)
                .map_err(|e| BackendError::InvalidResponse(e.to_string()));
        }

        if let Some(code) = value.get("statusCode").and_then(Value::as_u64) {
            if !(200..300).contains(&code) {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(BackendError::Status {
                    status: code as u16,
                    message,
                });
            }
        }

        match value.get("data") {
            Some(Value::Null) | None => Ok(ChatbotReply::default()),
            Some(data) => ChatbotReply::deserialize(data)
                .map_err(|e| BackendError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl ChatbotBackend for HttpChatbotBackend {
    async fn query(&self, query: ChatbotQuery) -> Result<ChatbotReply, BackendError> {
        let started = Instant::now();

        let response = self
            .client
            .post(self.query_url())
            .json(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let reply = Self::parse_body(&body)?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            has_text = reply.text().is_some(),
            suggestions = reply.suggestions.len(),
            "Chatbot replied"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope() {
        let body = r#"{
            "statusCode": 200,
            "message": "Success",
            "data": {
                "success": true,
                "message": "Hello!",
                "intent": "greeting",
                "entities": [],
                "suggestions": ["Xem sản phẩm mới"],
                "actions": [{"type": "navigate", "description": "Mở cửa hàng", "url": "/shop"}]
            }
        }"#;
        let reply = HttpChatbotBackend::parse_body(body).unwrap();
        assert_eq!(reply.text(), Some("Hello!"));
        assert_eq!(reply.intent.as_deref(), Some("greeting"));
        assert_eq!(reply.actions[0].url.as_deref(), Some("/shop"));
    }

    #[test]
    fn test_parse_flat_reply() {
        let body = r#"{"response": "Xin chào!", "suggestions": []}"#;
        let reply = HttpChatbotBackend::parse_body(body).unwrap();
        assert_eq!(reply.text(), Some("Xin chào!"));
    }

    #[test]
    fn test_envelope_error_status() {
        let body = r#"{"statusCode": 500, "message": "boom", "data": {}}"#;
        let err = HttpChatbotBackend::parse_body(body).unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 500, .. }));
    }

    #[test]
    fn test_garbage_is_invalid_response() {
        let err = HttpChatbotBackend::parse_body("not json").unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[test]
    fn test_query_url() {
        let config = ChatbotConfig {
            base_url: "http://store.local/api/".to_string(),
            ..ChatbotConfig::default()
        };
        let backend = HttpChatbotBackend::new(&config).unwrap();
        assert_eq!(backend.query_url(), "http://store.local/api/chatbot/query");
    }
}
