//! Centralized constants for the voice assistant
//!
//! Single source of truth for thresholds and defaults shared between the
//! settings defaults, the catalog and the response composer.

/// Price bands, in VND
pub mod pricing {
    /// Products strictly below this are "cheap"
    pub const CHEAP_BELOW: u64 = 2_000_000;

    /// Products strictly above this are "expensive"
    pub const EXPENSIVE_ABOVE: u64 = 3_000_000;

    /// Amounts at or above this are rendered in whole millions
    pub const MILLION: u64 = 1_000_000;
}

/// Relevance scoring weights used when ranking cached products
pub mod relevance {
    pub const PRODUCT_MATCH: u32 = 10;
    pub const CATEGORY_MATCH: u32 = 8;
    pub const PRICE_MATCH: u32 = 5;

    /// Maximum number of recommendations returned by the cache
    pub const MAX_RECOMMENDATIONS: usize = 5;

    /// Maximum number of recommendations rendered in a response
    pub const MAX_RENDERED: usize = 3;
}

/// NLU defaults
pub mod nlu {
    pub const ENTITY_CONFIDENCE: f32 = 0.8;
    pub const BASE_CONFIDENCE: f32 = 0.7;
    pub const INTENT_BONUS: f32 = 0.2;
    pub const ENTITY_STEP: f32 = 0.1;
    pub const ENTITY_BONUS_CAP: f32 = 0.1;
    pub const SHORT_TEXT_PENALTY: f32 = 0.1;
    /// Transcripts with fewer whitespace tokens than this are penalized
    pub const SHORT_TEXT_TOKENS: usize = 3;
}

/// Default service endpoints
pub mod endpoints {
    pub const PRODUCT_BACKEND: &str = "http://127.0.0.1:5000/api";
    pub const CHATBOT_BACKEND: &str = "http://127.0.0.1:5000/api";
    pub const STT_DEFAULT: &str = "http://127.0.0.1:8090";
    pub const TTS_DEFAULT: &str = "http://127.0.0.1:8091";
}

/// Timeouts and cache lifetimes
pub mod timeouts {
    /// Remote call timeout (chatbot, catalog)
    pub const REMOTE_CALL_MS: u64 = 10_000;

    /// Speech services get longer; transcription of a full clip is slow
    pub const SPEECH_CALL_MS: u64 = 30_000;

    /// Product cache time-to-live
    pub const CATALOG_TTL_SECS: u64 = 300;
}

/// Audio upload limits
pub mod audio {
    /// 10 MiB
    pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

    /// Generated audio older than this is deleted by housekeeping
    pub const RETENTION_SECS: u64 = 3600;

    pub const CLEANUP_INTERVAL_SECS: u64 = 600;
}

/// Session memory limits
pub mod session {
    pub const MAX_HISTORY: usize = 50;
    pub const MAX_LAST_SEARCHES: usize = 10;
    pub const TOP_INTENTS: usize = 5;
    pub const TOP_PRODUCTS: usize = 10;
    pub const DEFAULT_HISTORY_LIMIT: usize = 20;

    /// Sessions untouched for this long are evicted
    pub const IDLE_TIMEOUT_SECS: u64 = 1800;
    pub const MAX_SESSIONS: usize = 10_000;
    pub const SWEEP_INTERVAL_SECS: u64 = 60;
}
