//! Figuro Voice Agent
//!
//! Owns every collaborator a request touches and wires them together:
//! understanding, chatbot, catalog, composer, speech and session memory.
//!
//! The implementation is split into submodules:
//! - `processing`: `process_text()`, `process_audio()` and the shared turn
//! - `speech`: transcription with placeholders and synthesis

mod processing;
mod speech;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use figuro_voice_catalog::{CacheConfig, HttpProductBackend, ProductCache};
use figuro_voice_config::Settings;
use figuro_voice_core::{ChatbotBackend, Language, SpeechToText, TextToSpeech, VoiceResult};
use figuro_voice_pipeline::{HttpSttConfig, HttpSynthesizer, HttpTranscriber, HttpTtsConfig};
use figuro_voice_text_processing::NluEngine;

use crate::composer::ResponseComposer;
use crate::session::SessionStore;
use crate::AgentError;

pub use speech::{STT_AUDIO_ERROR, STT_SERVICE_ERROR, STT_UNRECOGNIZED};

/// Request-independent agent knobs
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Previous user inputs forwarded to the chatbot
    pub context_queries: usize,
    pub max_audio_bytes: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for AgentConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            context_queries: settings.chatbot.context_queries,
            max_audio_bytes: settings.speech.max_audio_bytes,
        }
    }
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub language: Language,
    /// Generated when absent
    pub session_id: Option<String>,
    pub enable_tts: bool,
    pub voice_speed: Option<f32>,
}

/// Result of one processed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTurn {
    pub session_id: String,
    #[serde(flatten)]
    pub result: VoiceResult,
    /// Chatbot suggestions, or per-intent defaults
    pub suggested_actions: Vec<String>,
}

/// Collaborator status for health reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub catalog_fresh: bool,
    pub cached_products: usize,
    pub chatbot_configured: bool,
    pub stt: Option<String>,
    pub tts: Option<String>,
    pub active_sessions: usize,
}

/// Voice assistant orchestrator
///
/// Shared across requests behind an `Arc`. Apart from the catalog cache and
/// the session store every field is immutable after construction.
pub struct VoiceAgent {
    pub(crate) config: AgentConfig,
    pub(crate) nlu: Arc<NluEngine>,
    pub(crate) catalog: Arc<ProductCache>,
    pub(crate) composer: ResponseComposer,
    pub(crate) sessions: SessionStore,
    pub(crate) chatbot: Option<Arc<dyn ChatbotBackend>>,
    pub(crate) stt: Option<Arc<dyn SpeechToText>>,
    pub(crate) tts: Option<Arc<dyn TextToSpeech>>,
}

impl VoiceAgent {
    /// Agent without remote chatbot or speech collaborators
    pub fn new(
        config: AgentConfig,
        nlu: Arc<NluEngine>,
        catalog: Arc<ProductCache>,
        composer: ResponseComposer,
        sessions: SessionStore,
    ) -> Self {
        Self {
            config,
            nlu,
            catalog,
            composer,
            sessions,
            chatbot: None,
            stt: None,
            tts: None,
        }
    }

    pub fn with_chatbot(mut self, chatbot: Arc<dyn ChatbotBackend>) -> Self {
        self.chatbot = Some(chatbot);
        self
    }

    pub fn with_stt(mut self, stt: Arc<dyn SpeechToText>) -> Self {
        self.stt = Some(stt);
        self
    }

    pub fn with_tts(mut self, tts: Arc<dyn TextToSpeech>) -> Self {
        self.tts = Some(tts);
        self
    }

    /// Build the agent with HTTP collaborators from loaded settings
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let nlu = Arc::new(NluEngine::from_config(&settings.nlu)?);
        let composer = ResponseComposer::from_config(&settings.nlu)?;

        let product_backend = Arc::new(HttpProductBackend::new(&settings.catalog)?);
        let catalog = Arc::new(ProductCache::new(
            product_backend,
            CacheConfig::from(&settings.catalog),
        ));

        let stt = HttpTranscriber::new(HttpSttConfig::from(&settings.speech))?;
        let tts = HttpSynthesizer::new(HttpTtsConfig::from(&settings.speech))?;

        let mut agent = Self::new(
            AgentConfig::from(settings),
            nlu,
            catalog,
            composer,
            SessionStore::new(settings.session.clone()),
        )
        .with_stt(Arc::new(stt))
        .with_tts(Arc::new(tts));

        if let Some(chatbot) = figuro_voice_chatbot::create_backend(&settings.chatbot)? {
            agent = agent.with_chatbot(chatbot);
        }

        tracing::info!(
            intents = agent.nlu.classifier().intents().count(),
            chatbot = agent.chatbot.is_some(),
            "Voice agent ready"
        );
        Ok(agent)
    }

    pub fn catalog(&self) -> &Arc<ProductCache> {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn composer(&self) -> &ResponseComposer {
        &self.composer
    }

    pub fn nlu(&self) -> &NluEngine {
        &self.nlu
    }

    pub fn chatbot(&self) -> Option<&Arc<dyn ChatbotBackend>> {
        self.chatbot.as_ref()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            catalog_fresh: self.catalog.is_fresh(),
            cached_products: self.catalog.product_count(),
            chatbot_configured: self.chatbot.is_some(),
            stt: self.stt.as_ref().map(|s| s.name().to_string()),
            tts: self.tts.as_ref().map(|t| t.name().to_string()),
            active_sessions: self.sessions.session_count(),
        }
    }
}

/// Shorten a transcript for log lines without splitting a grapheme
pub(crate) fn preview(text: &str, max: usize) -> String {
    use unicode_segmentation::UnicodeSegmentation;

    let mut graphemes = text.graphemes(true);
    let mut out: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        out.push('…');
    }
    out
}
