//! Core traits and types for the Figuro voice assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Intent labels and extracted entities
//! - Product and category records served by the catalog backend
//! - Language and audio container definitions
//! - Collaborator traits (speech, chatbot, product backend)
//! - Error types

pub mod audio;
pub mod catalog;
pub mod conversation;
pub mod entity;
pub mod error;
pub mod intent;
pub mod language;
pub mod traits;

pub use audio::AudioFormat;
pub use catalog::{Category, CategoryRef, Product, RecommendedProduct};
pub use conversation::{ConversationTurn, VoiceResult};
pub use entity::{Entity, EntityType};
pub use error::{Error, Result};
pub use intent::Intent;
pub use language::Language;

pub use traits::{
    BackendError, ChatbotAction, ChatbotBackend, ChatbotContext, ChatbotQuery, ChatbotReply,
    ProductBackend, SpeechError, SpeechToText, TextToSpeech,
};
