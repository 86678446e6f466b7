//! Per-request pipeline output and conversation history entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Entity, Intent, Language, RecommendedProduct};

/// Output of one pass through the voice pipeline.
///
/// Built once per request and handed back to the caller; nothing keeps it
/// beyond the conversation history summary in [`ConversationTurn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceResult {
    pub transcript: String,
    pub language: Language,
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub confidence: f32,
    pub response_text: String,
    pub recommendations: Vec<RecommendedProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub processing_time_ms: u64,
}

/// One exchange kept in a session's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub user_input: String,
    pub agent_response: String,
    pub intent: Intent,
    pub entities: Vec<Entity>,
}

impl ConversationTurn {
    pub fn from_result(result: &VoiceResult) -> Self {
        Self {
            timestamp: Utc::now(),
            user_input: result.transcript.clone(),
            agent_response: result.response_text.clone(),
            intent: result.intent,
            entities: result.entities.clone(),
        }
    }
}
