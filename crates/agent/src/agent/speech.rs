//! Speech collaborator calls
//!
//! Transcription never fails a request: any error becomes a placeholder
//! transcript that flows through the pipeline like user text. Synthesis
//! errors are reported to callers who asked for audio explicitly and
//! swallowed everywhere else.

use std::time::Instant;

use figuro_voice_core::{AudioFormat, Language, SpeechError};

use super::VoiceAgent;
use crate::AgentError;

/// Placeholder when the service heard no speech
pub const STT_UNRECOGNIZED: &str = "Không thể nhận diện được giọng nói";
/// Placeholder when the service failed or timed out
pub const STT_SERVICE_ERROR: &str = "Lỗi dịch vụ nhận diện giọng nói";
/// Placeholder for anything else
pub const STT_AUDIO_ERROR: &str = "Lỗi xử lý âm thanh";

fn placeholder(err: &SpeechError) -> &'static str {
    match err {
        SpeechError::Unrecognized => STT_UNRECOGNIZED,
        SpeechError::Service(_) => STT_SERVICE_ERROR,
        SpeechError::Audio(_) => STT_AUDIO_ERROR,
    }
}

impl VoiceAgent {
    /// Transcribe validated audio, substituting a placeholder on failure
    pub(crate) async fn transcribe_or_placeholder(
        &self,
        audio: &[u8],
        format: AudioFormat,
        language: Language,
    ) -> String {
        let Some(stt) = self.stt.as_ref() else {
            tracing::warn!("No STT backend configured");
            metrics::counter!("figuro_voice_errors_total", "kind" => "stt").increment(1);
            return STT_SERVICE_ERROR.to_string();
        };

        let started = Instant::now();
        let outcome = stt.transcribe(audio, format, language).await;
        metrics::histogram!("figuro_voice_stage_latency_seconds", "stage" => "stt")
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => STT_UNRECOGNIZED.to_string(),
            Err(e) => {
                tracing::warn!(backend = stt.name(), error = %e, "Transcription failed");
                metrics::counter!("figuro_voice_errors_total", "kind" => "stt").increment(1);
                placeholder(&e).to_string()
            }
        }
    }

    /// Synthesize speech for arbitrary text
    pub async fn synthesize(
        &self,
        text: &str,
        language: Language,
        speed: Option<f32>,
    ) -> Result<String, AgentError> {
        if text.trim().is_empty() {
            return Err(figuro_voice_core::Error::InvalidInput("text is empty".to_string()).into());
        }
        let tts = self.tts.as_ref().ok_or(AgentError::Unavailable("TTS backend"))?;

        let started = Instant::now();
        let outcome = tts.synthesize(text, language, speed).await;
        metrics::histogram!("figuro_voice_stage_latency_seconds", "stage" => "tts")
            .record(started.elapsed().as_secs_f64());

        outcome.map_err(|e| {
            metrics::counter!("figuro_voice_errors_total", "kind" => "tts").increment(1);
            AgentError::Speech(e)
        })
    }

    /// Synthesis inside a request: failures only drop the audio handle
    pub(crate) async fn synthesize_optional(
        &self,
        text: &str,
        language: Language,
        speed: Option<f32>,
    ) -> Option<String> {
        match self.synthesize(text, language, speed).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis failed, returning text only");
                None
            }
        }
    }
}
