//! Entity Extraction
//!
//! Scans every entity pattern against the lowercased text and emits one
//! [`Entity`] per non-overlapping match:
//! - Product names (character names, "mô hình X", "figure X")
//! - Categories (series names, "danh mục X")
//! - Quantities, colors and price ranges
//!
//! The value is capture group 1 when the pattern has one and it took part in
//! the match, otherwise the whole match. Values are trimmed and empty ones
//! dropped. Duplicates are kept: two patterns that agree produce two entities.
//!
//! # Example
//!
//! ```
//! use figuro_voice_config::PatternLibrary;
//! use figuro_voice_core::EntityType;
//! use figuro_voice_text_processing::EntityExtractor;
//!
//! let extractor = EntityExtractor::new(&PatternLibrary::default(), 0.8).unwrap();
//! let entities = extractor.extract("Tôi muốn tìm mô hình Naruto");
//! assert!(entities.iter().any(|e| e.is(EntityType::Product) && e.value == "naruto"));
//! ```

use regex::Regex;

use figuro_voice_config::PatternLibrary;
use figuro_voice_core::{Entity, EntityType};

use crate::{compile_pattern, normalize, Result};

struct CompiledEntity {
    entity_type: EntityType,
    patterns: Vec<Regex>,
}

/// Pattern-driven entity extractor
pub struct EntityExtractor {
    table: Vec<CompiledEntity>,
    confidence: f32,
}

impl EntityExtractor {
    /// Compile the entity tables of `library`. `confidence` is attached to
    /// every extracted entity and clamped to [0, 1].
    pub fn new(library: &PatternLibrary, confidence: f32) -> Result<Self> {
        let table = library
            .entities
            .iter()
            .map(|entry| {
                let patterns = entry
                    .patterns
                    .iter()
                    .map(|p| compile_pattern(entry.entity_type.as_str(), p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledEntity {
                    entity_type: entry.entity_type,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Ok(Self { table, confidence })
    }

    pub fn with_default_patterns() -> Result<Self> {
        Self::new(
            &PatternLibrary::default(),
            figuro_voice_config::constants::nlu::ENTITY_CONFIDENCE,
        )
    }

    /// Extract all entities, in table order then match order
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let normalized = normalize(text);
        if normalized.trim().is_empty() {
            return Vec::new();
        }

        let mut entities = Vec::new();
        for entry in &self.table {
            for regex in &entry.patterns {
                for caps in regex.captures_iter(&normalized) {
                    let matched = caps.get(1).or_else(|| caps.get(0));
                    let Some(m) = matched else { continue };
                    let value = m.as_str().trim();
                    if value.is_empty() {
                        continue;
                    }
                    entities.push(Entity::new(entry.entity_type, value, self.confidence));
                }
            }
        }

        if !entities.is_empty() {
            tracing::trace!(count = entities.len(), "Extracted entities");
        }
        entities
    }

    /// Extract only entities of one type
    pub fn extract_type(&self, text: &str, entity_type: EntityType) -> Vec<Entity> {
        self.extract(text)
            .into_iter()
            .filter(|e| e.is(entity_type))
            .collect()
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}
