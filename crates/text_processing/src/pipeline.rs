//! Unified understanding pipeline

use serde::{Deserialize, Serialize};

use figuro_voice_config::{NluConfig, PatternLibrary};
use figuro_voice_core::{Entity, Intent};

use crate::{ConfidenceScorer, EntityExtractor, IntentClassifier, Result};

/// Output of one pass over a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Understanding {
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub confidence: f32,
}

/// Classifier, extractor and scorer bundled behind one call
///
/// Immutable after construction, so it can be shared across requests
/// behind an `Arc` without locking.
pub struct NluEngine {
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    scorer: ConfidenceScorer,
}

impl NluEngine {
    pub fn new(library: &PatternLibrary, config: &NluConfig) -> Result<Self> {
        Ok(Self {
            classifier: IntentClassifier::new(library)?,
            extractor: EntityExtractor::new(library, config.entity_confidence)?,
            scorer: ConfidenceScorer::new(config.scoring.clone()),
        })
    }

    /// Build from settings, loading the pattern file when one is configured
    pub fn from_config(config: &NluConfig) -> Result<Self> {
        let library = PatternLibrary::load_or_default(config.patterns_path.as_deref())?;
        Self::new(&library, config)
    }

    /// Built-in tables and default weights
    pub fn with_defaults() -> Result<Self> {
        Self::new(&PatternLibrary::default(), &NluConfig::default())
    }

    /// Classify, extract and score. Never fails; empty text is `unknown`.
    pub fn understand(&self, text: &str) -> Understanding {
        let intent = match self.classifier.classify_with_match(text) {
            Some(m) => {
                tracing::debug!(intent = %m.intent, pattern = %m.pattern, "Intent matched");
                m.intent
            }
            None => Intent::Unknown,
        };
        let entities = self.extractor.extract(text);
        let confidence = self.scorer.score(text, intent, &entities);

        Understanding {
            intent,
            entities,
            confidence,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }
}
