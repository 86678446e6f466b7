//! Core processing methods for VoiceAgent
//!
//! - `process_text()`: typed input
//! - `process_audio()`: uploaded audio, transcribed first
//! - `query_chatbot()`: passthrough used by the chatbot endpoint

use std::time::Instant;

use figuro_voice_core::{
    AudioFormat, ChatbotContext, ChatbotQuery, ChatbotReply, Error, Intent, Language,
    RecommendedProduct, VoiceResult,
};
use figuro_voice_pipeline::validate_audio;

use super::{preview, ProcessOptions, ProcessedTurn, VoiceAgent};
use crate::composer::suggested_actions;
use crate::AgentError;

const LOG_PREVIEW_GRAPHEMES: usize = 60;

fn record_stage(stage: &'static str, started: Instant) {
    metrics::histogram!("figuro_voice_stage_latency_seconds", "stage" => stage)
        .record(started.elapsed().as_secs_f64());
}

impl VoiceAgent {
    /// Process typed input
    pub async fn process_text(
        &self,
        text: &str,
        options: ProcessOptions,
    ) -> Result<ProcessedTurn, AgentError> {
        let started = Instant::now();
        let text = text.trim();
        if text.is_empty() {
            metrics::counter!("figuro_voice_errors_total", "kind" => "invalid_input").increment(1);
            return Err(Error::InvalidInput("text is empty".to_string()).into());
        }
        Ok(self.run_turn(text.to_string(), options, started).await)
    }

    /// Process an uploaded clip. Size and emptiness are checked before any
    /// transcription; speech failures become placeholder transcripts.
    pub async fn process_audio(
        &self,
        audio: &[u8],
        format: AudioFormat,
        options: ProcessOptions,
    ) -> Result<ProcessedTurn, AgentError> {
        let started = Instant::now();
        if let Err(e) = validate_audio(audio, self.config.max_audio_bytes) {
            metrics::counter!("figuro_voice_errors_total", "kind" => e.kind()).increment(1);
            return Err(e.into());
        }

        let transcript = self
            .transcribe_or_placeholder(audio, format, options.language)
            .await;
        Ok(self.run_turn(transcript, options, started).await)
    }

    /// Send a query straight to the chatbot backend
    pub async fn query_chatbot(
        &self,
        text: &str,
        language: Language,
        session_id: Option<&str>,
    ) -> Result<ChatbotReply, AgentError> {
        let chatbot = self
            .chatbot
            .as_ref()
            .ok_or(AgentError::Unavailable("Chatbot backend"))?;
        let query = self.chatbot_query(text, language, session_id);
        let reply = figuro_voice_chatbot::ask(chatbot.as_ref(), query).await?;
        Ok(reply)
    }

    fn chatbot_query(&self, text: &str, language: Language, session_id: Option<&str>) -> ChatbotQuery {
        let previous_queries = session_id
            .map(|id| self.sessions.recent_inputs(id, self.config.context_queries))
            .unwrap_or_default();
        ChatbotQuery {
            text: text.to_string(),
            language,
            context: ChatbotContext {
                session_id: session_id.map(str::to_string),
                previous_queries,
                ..Default::default()
            },
        }
    }

    /// Understanding, chatbot, recommendations, composition and speech for
    /// one transcript
    async fn run_turn(
        &self,
        transcript: String,
        options: ProcessOptions,
        started: Instant,
    ) -> ProcessedTurn {
        let session_id = options
            .session_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let language = options.language;

        let nlu_started = Instant::now();
        let understanding = self.nlu.understand(&transcript);
        record_stage("nlu", nlu_started);

        let intent = understanding.intent;
        tracing::debug!(
            session_id = %session_id,
            transcript = %preview(&transcript, LOG_PREVIEW_GRAPHEMES),
            intent = %intent,
            entities = understanding.entities.len(),
            confidence = understanding.confidence,
            "Understood request"
        );

        let (reply, recommendations) = futures::future::join(
            self.chatbot_reply(&transcript, language, &session_id),
            self.recommendations(intent, &understanding.entities),
        )
        .await;

        let response_text = self.composer.compose(
            intent,
            &understanding.entities,
            &transcript,
            language,
            reply.as_ref().and_then(ChatbotReply::text),
            &recommendations,
        );

        let audio_url = if options.enable_tts {
            self.synthesize_optional(&response_text, language, options.voice_speed)
                .await
        } else {
            None
        };

        let suggested = reply
            .map(|r| r.suggestions)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| suggested_actions(intent));

        let result = VoiceResult {
            transcript,
            language,
            intent,
            entities: understanding.entities,
            confidence: understanding.confidence,
            response_text,
            recommendations,
            audio_url,
            processing_time_ms: started.elapsed().as_millis() as u64,
        };

        self.sessions.record(&session_id, &result);

        metrics::counter!("figuro_voice_requests_total", "intent" => intent.as_str()).increment(1);
        record_stage("total", started);
        tracing::info!(
            session_id = %session_id,
            intent = %intent,
            recommendations = result.recommendations.len(),
            audio = result.audio_url.is_some(),
            processing_time_ms = result.processing_time_ms,
            "Request processed"
        );

        ProcessedTurn {
            session_id,
            result,
            suggested_actions: suggested,
        }
    }

    /// Chatbot reply, or `None` when there is no backend or it failed
    async fn chatbot_reply(
        &self,
        transcript: &str,
        language: Language,
        session_id: &str,
    ) -> Option<ChatbotReply> {
        let chatbot = self.chatbot.as_ref()?;
        let query = self.chatbot_query(transcript, language, Some(session_id));

        let started = Instant::now();
        let outcome = figuro_voice_chatbot::ask(chatbot.as_ref(), query).await;
        record_stage("chatbot", started);

        match outcome {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!(error = %e, "Chatbot query failed, using templates");
                metrics::counter!("figuro_voice_errors_total", "kind" => "chatbot").increment(1);
                None
            }
        }
    }

    async fn recommendations(
        &self,
        intent: Intent,
        entities: &[figuro_voice_core::Entity],
    ) -> Vec<RecommendedProduct> {
        if !intent.wants_recommendations() {
            return Vec::new();
        }
        let started = Instant::now();
        let ranked = self.catalog.recommend(intent, entities).await;
        record_stage("catalog", started);
        ranked
    }
}
