//! Text understanding for the Figuro voice assistant
//!
//! This crate turns a transcript into structured meaning:
//! - **Intent classification**: ordered regex tables, first match wins
//! - **Entity extraction**: every match of every entity pattern
//! - **Confidence scoring**: bounded heuristic over intent and entities
//!
//! # Example
//!
//! ```ignore
//! use figuro_voice_text_processing::NluEngine;
//!
//! let engine = NluEngine::from_config(&settings.nlu)?;
//! let understanding = engine.understand("Tôi muốn tìm mô hình Naruto");
//! assert_eq!(understanding.intent, Intent::GetProductInfo);
//! ```

pub mod confidence;
pub mod entities;
pub mod intent;

mod error;
mod pipeline;

pub use confidence::ConfidenceScorer;
pub use entities::EntityExtractor;
pub use error::{NluError, Result};
pub use intent::IntentClassifier;
pub use pipeline::{NluEngine, Understanding};

use regex::Regex;

/// Compile one table entry, tagging failures with where they came from
pub(crate) fn compile_pattern(label: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        tracing::warn!(label, pattern, error = %e, "Failed to compile pattern");
        NluError::Pattern {
            label: label.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        }
    })
}

/// Lowercase used by every matcher; patterns are written against it
pub(crate) fn normalize(text: &str) -> String {
    text.to_lowercase()
}
