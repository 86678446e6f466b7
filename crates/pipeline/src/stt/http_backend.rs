//! HTTP STT Backend - Calls the external transcription service
//!
//! The clip is posted as-is to `{url}/transcribe` with the container's MIME
//! type and the language tag in `X-Language`. The service answers with
//! `{text, confidence?, language?, error?}`. An empty `text` means the audio
//! was fine but held no recognizable speech.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;

use figuro_voice_config::SpeechConfig;
use figuro_voice_core::{AudioFormat, Language, SpeechError, SpeechToText};

use crate::PipelineError;

/// HTTP STT Backend configuration
#[derive(Debug, Clone)]
pub struct HttpSttConfig {
    /// Base URL of the STT service
    pub url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpSttConfig {
    fn default() -> Self {
        Self::from(&SpeechConfig::default())
    }
}

impl From<&SpeechConfig> for HttpSttConfig {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            url: config.stt_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        }
    }
}

/// Response from the STT service
#[derive(Debug, Deserialize)]
struct SttResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    error: Option<String>,
}

/// Transcriber backed by the STT HTTP service
pub struct HttpTranscriber {
    config: HttpSttConfig,
    client: reqwest::Client,
}

impl HttpTranscriber {
    pub fn new(config: HttpSttConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PipelineError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(url = %config.url, "HTTP STT backend configured");
        Ok(Self { config, client })
    }

    fn transcribe_url(&self) -> String {
        format!("{}/transcribe", self.config.url)
    }

    fn interpret(response: SttResponse) -> Result<String, SpeechError> {
        if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
            tracing::warn!(error = %error, "STT service returned error");
            return Err(SpeechError::Service(error));
        }
        let text = response.text.trim();
        if text.is_empty() {
            return Err(SpeechError::Unrecognized);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl SpeechToText for HttpTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        language: Language,
    ) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::Audio("empty audio payload".to_string()));
        }
        let started = Instant::now();

        let response = self
            .client
            .post(self.transcribe_url())
            .header(reqwest::header::CONTENT_TYPE, format.mime_type())
            .header("X-Language", language.tag())
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| SpeechError::Service(format!("HTTP STT request failed: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            // The service rejects undecodable audio with 4xx
            return Err(SpeechError::Audio(format!("STT service rejected audio: {}", status)));
        }
        if !status.is_success() {
            return Err(SpeechError::Service(format!(
                "HTTP STT service returned error: {}",
                status
            )));
        }

        let result: SttResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Service(format!("Failed to parse STT response: {}", e)))?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            confidence = ?result.confidence,
            bytes = audio.len(),
            "Transcription finished"
        );
        Self::interpret(result)
    }

    fn name(&self) -> &str {
        "http-stt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> SttResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_interpret_text() {
        let text = HttpTranscriber::interpret(response(
            r#"{"text": " Xin chào ", "confidence": 0.93, "language": "vi"}"#,
        ))
        .unwrap();
        assert_eq!(text, "Xin chào");
    }

    #[test]
    fn test_empty_text_is_unrecognized() {
        let err = HttpTranscriber::interpret(response(r#"{"text": "   "}"#)).unwrap_err();
        assert_eq!(err, SpeechError::Unrecognized);
    }

    #[test]
    fn test_service_error_field() {
        let err = HttpTranscriber::interpret(response(r#"{"text": "", "error": "model not loaded"}"#))
            .unwrap_err();
        assert!(matches!(err, SpeechError::Service(ref m) if m == "model not loaded"));
    }

    #[test]
    fn test_url_from_settings() {
        let settings = SpeechConfig {
            stt_url: "http://stt.local/".to_string(),
            ..SpeechConfig::default()
        };
        let stt = HttpTranscriber::new(HttpSttConfig::from(&settings)).unwrap();
        assert_eq!(stt.transcribe_url(), "http://stt.local/transcribe");
    }

    #[tokio::test]
    async fn test_empty_audio_rejected_before_request() {
        let stt = HttpTranscriber::new(HttpSttConfig::default()).unwrap();
        let err = stt
            .transcribe(&[], AudioFormat::Wav, Language::Vietnamese)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Audio(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_service_error() {
        let stt = HttpTranscriber::new(HttpSttConfig {
            url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 500,
        })
        .unwrap();
        let err = stt
            .transcribe(b"RIFF....WAVE", AudioFormat::Wav, Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Service(_)));
    }
}
