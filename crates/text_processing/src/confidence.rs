//! Confidence scoring
//!
//! A bounded heuristic, not a probability:
//!
//! ```text
//! score = base
//!       + intent_bonus                           (intent != unknown)
//!       + min(entity_bonus_cap, n * entity_step) (n > 0 entities)
//!       - short_text_penalty                     (< short_text_tokens tokens)
//! ```
//!
//! clamped to [0, 1].

use figuro_voice_config::ScoringWeights;
use figuro_voice_core::{Entity, Intent};

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    weights: ScoringWeights,
}

impl ConfidenceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score one utterance. Always finite and within [0, 1].
    pub fn score(&self, transcript: &str, intent: Intent, entities: &[Entity]) -> f32 {
        let w = &self.weights;
        let mut score = w.base;

        if !intent.is_unknown() {
            score += w.intent_bonus;
        }

        if !entities.is_empty() {
            let raw = entities.len() as f32 * w.entity_step;
            score += raw.min(w.entity_bonus_cap);
        }

        if transcript.split_whitespace().count() < w.short_text_tokens {
            score -= w.short_text_penalty;
        }

        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }
}
