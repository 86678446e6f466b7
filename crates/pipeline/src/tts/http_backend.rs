//! HTTP TTS Backend - Calls the external synthesis service
//!
//! `POST {url}/synthesize` with `{text, lang, speed}`. The service writes
//! the audio file itself and answers `{audio_url}` (or `{url}`), a path the
//! client downloads from the static directory.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use figuro_voice_config::SpeechConfig;
use figuro_voice_core::{Language, SpeechError, TextToSpeech};

use crate::PipelineError;

#[derive(Debug, Clone)]
pub struct HttpTtsConfig {
    pub url: String,
    pub timeout_ms: u64,
    /// Used when the caller passes no speed
    pub default_speed: f32,
}

impl Default for HttpTtsConfig {
    fn default() -> Self {
        Self::from(&SpeechConfig::default())
    }
}

impl From<&SpeechConfig> for HttpTtsConfig {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            url: config.tts_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
            default_speed: config.default_speed,
        }
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    lang: &'a str,
    speed: f32,
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    #[serde(default, alias = "url")]
    audio_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Synthesizer backed by the TTS HTTP service
pub struct HttpSynthesizer {
    config: HttpTtsConfig,
    client: reqwest::Client,
}

impl HttpSynthesizer {
    pub fn new(config: HttpTtsConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PipelineError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(url = %config.url, "HTTP TTS backend configured");
        Ok(Self { config, client })
    }

    fn synthesize_url(&self) -> String {
        format!("{}/synthesize", self.config.url)
    }

    /// Clamp to the range the service accepts
    fn effective_speed(&self, speed: Option<f32>) -> f32 {
        let speed = speed
            .filter(|s| s.is_finite())
            .unwrap_or(self.config.default_speed);
        speed.clamp(0.25, 4.0)
    }

    fn interpret(response: TtsResponse) -> Result<String, SpeechError> {
        if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
            return Err(SpeechError::Service(error));
        }
        response
            .audio_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SpeechError::Service("TTS response carried no audio_url".to_string()))
    }
}

#[async_trait]
impl TextToSpeech for HttpSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        speed: Option<f32>,
    ) -> Result<String, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::Audio("nothing to synthesize".to_string()));
        }
        let started = Instant::now();

        let request = TtsRequest {
            text,
            lang: language.tts_code(),
            speed: self.effective_speed(speed),
        };

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::Service(format!("HTTP TTS request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SpeechError::Service(format!(
                "HTTP TTS service returned error: {}",
                response.status()
            )));
        }

        let result: TtsResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Service(format!("Failed to parse TTS response: {}", e)))?;

        let url = Self::interpret(result)?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "Synthesis finished"
        );
        Ok(url)
    }

    fn name(&self) -> &str {
        "http-tts"
    }
}
