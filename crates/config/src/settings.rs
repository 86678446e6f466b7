//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{audio, endpoints, nlu, relevance, session, timeouts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Classifier, extractor and scoring configuration
    #[serde(default)]
    pub nlu: NluConfig,

    /// Product cache and backend
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub chatbot: ChatbotConfig,

    /// Speech-to-text / text-to-speech services
    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Generated audio cleanup
    #[serde(default)]
    pub housekeeping: HousekeepingConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate all sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_nlu()?;
        self.validate_catalog()?;
        self.validate_speech()?;
        self.validate_session()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }
        if self.environment.is_production() && !self.server.cors_enabled {
            return Err(ConfigError::InvalidValue {
                field: "server.cors_enabled".to_string(),
                message: "CORS must be enabled in production".to_string(),
            });
        }
        Ok(())
    }

    fn validate_nlu(&self) -> Result<(), ConfigError> {
        let nlu = &self.nlu;
        if !(0.0..=1.0).contains(&nlu.entity_confidence) {
            return Err(ConfigError::InvalidValue {
                field: "nlu.entity_confidence".to_string(),
                message: format!("Must be between 0.0 and 1.0, got {}", nlu.entity_confidence),
            });
        }

        let w = &nlu.scoring;
        let weights = [
            ("nlu.scoring.base", w.base),
            ("nlu.scoring.intent_bonus", w.intent_bonus),
            ("nlu.scoring.entity_step", w.entity_step),
            ("nlu.scoring.entity_bonus_cap", w.entity_bonus_cap),
            ("nlu.scoring.short_text_penalty", w.short_text_penalty),
        ];
        for (field, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be a non-negative number, got {}", value),
                });
            }
        }
        Ok(())
    }

    fn validate_catalog(&self) -> Result<(), ConfigError> {
        if self.catalog.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "catalog.timeout_ms".to_string(),
                message: "Timeout cannot be 0".to_string(),
            });
        }
        if self.catalog.ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "catalog.ttl_seconds".to_string(),
                message: "TTL cannot be 0".to_string(),
            });
        }
        if !(1..=relevance::MAX_RECOMMENDATIONS).contains(&self.catalog.max_recommendations) {
            return Err(ConfigError::InvalidValue {
                field: "catalog.max_recommendations".to_string(),
                message: format!(
                    "Must be between 1 and {}, got {}",
                    relevance::MAX_RECOMMENDATIONS,
                    self.catalog.max_recommendations
                ),
            });
        }
        if self.chatbot.enabled && self.chatbot.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chatbot.timeout_ms".to_string(),
                message: "Timeout cannot be 0".to_string(),
            });
        }
        Ok(())
    }

    fn validate_speech(&self) -> Result<(), ConfigError> {
        if self.speech.max_audio_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "speech.max_audio_bytes".to_string(),
                message: "Maximum audio size cannot be 0".to_string(),
            });
        }
        if !(0.25..=4.0).contains(&self.speech.default_speed) {
            return Err(ConfigError::InvalidValue {
                field: "speech.default_speed".to_string(),
                message: format!(
                    "Must be between 0.25 and 4.0, got {}",
                    self.speech.default_speed
                ),
            });
        }
        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        if self.session.max_history == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_history".to_string(),
                message: "History cap cannot be 0".to_string(),
            });
        }
        if self.session.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_sessions".to_string(),
                message: "Session cap cannot be 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_request_timeout() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_request_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            static_dir: default_static_dir(),
        }
    }
}

/// Confidence scoring weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_base")]
    pub base: f32,
    #[serde(default = "default_intent_bonus")]
    pub intent_bonus: f32,
    #[serde(default = "default_entity_step")]
    pub entity_step: f32,
    #[serde(default = "default_entity_bonus_cap")]
    pub entity_bonus_cap: f32,
    #[serde(default = "default_short_text_penalty")]
    pub short_text_penalty: f32,
    /// Transcripts with fewer whitespace tokens are penalized
    #[serde(default = "default_short_text_tokens")]
    pub short_text_tokens: usize,
}

fn default_base() -> f32 {
    nlu::BASE_CONFIDENCE
}
fn default_intent_bonus() -> f32 {
    nlu::INTENT_BONUS
}
fn default_entity_step() -> f32 {
    nlu::ENTITY_STEP
}
fn default_entity_bonus_cap() -> f32 {
    nlu::ENTITY_BONUS_CAP
}
fn default_short_text_penalty() -> f32 {
    nlu::SHORT_TEXT_PENALTY
}
fn default_short_text_tokens() -> usize {
    nlu::SHORT_TEXT_TOKENS
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: default_base(),
            intent_bonus: default_intent_bonus(),
            entity_step: default_entity_step(),
            entity_bonus_cap: default_entity_bonus_cap(),
            short_text_penalty: default_short_text_penalty(),
            short_text_tokens: default_short_text_tokens(),
        }
    }
}

/// NLU configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    /// Confidence attached to every extracted entity
    #[serde(default = "default_entity_confidence")]
    pub entity_confidence: f32,

    #[serde(default)]
    pub scoring: ScoringWeights,

    /// YAML file replacing the built-in pattern tables
    #[serde(default)]
    pub patterns_path: Option<String>,

    /// YAML file overriding the built-in response templates
    #[serde(default)]
    pub templates_path: Option<String>,
}

fn default_entity_confidence() -> f32 {
    nlu::ENTITY_CONFIDENCE
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            entity_confidence: default_entity_confidence(),
            scoring: ScoringWeights::default(),
            patterns_path: None,
            templates_path: None,
        }
    }
}

/// Product catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Backend API base URL (`{base_url}/products`, `{base_url}/products/categories/all`)
    #[serde(default = "default_catalog_url")]
    pub base_url: String,

    #[serde(default = "default_catalog_ttl")]
    pub ttl_seconds: u64,

    #[serde(default = "default_remote_timeout")]
    pub timeout_ms: u64,

    /// Page size requested from the product listing
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_catalog_url() -> String {
    endpoints::PRODUCT_BACKEND.to_string()
}
fn default_catalog_ttl() -> u64 {
    timeouts::CATALOG_TTL_SECS
}
fn default_remote_timeout() -> u64 {
    timeouts::REMOTE_CALL_MS
}
fn default_page_size() -> usize {
    1000
}
fn default_max_recommendations() -> usize {
    relevance::MAX_RECOMMENDATIONS
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            ttl_seconds: default_catalog_ttl(),
            timeout_ms: default_remote_timeout(),
            page_size: default_page_size(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

/// Chatbot backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_chatbot_url")]
    pub base_url: String,

    #[serde(default = "default_remote_timeout")]
    pub timeout_ms: u64,

    /// Previous user inputs forwarded as context
    #[serde(default = "default_context_queries")]
    pub context_queries: usize,
}

fn default_chatbot_url() -> String {
    endpoints::CHATBOT_BACKEND.to_string()
}
fn default_context_queries() -> usize {
    5
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_chatbot_url(),
            timeout_ms: default_remote_timeout(),
            context_queries: default_context_queries(),
        }
    }
}

/// Speech services configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_stt_url")]
    pub stt_url: String,

    #[serde(default = "default_tts_url")]
    pub tts_url: String,

    #[serde(default = "default_speech_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_audio_bytes")]
    pub max_audio_bytes: usize,

    /// Speaking rate multiplier when the request does not set one
    #[serde(default = "default_speed")]
    pub default_speed: f32,
}

fn default_stt_url() -> String {
    endpoints::STT_DEFAULT.to_string()
}
fn default_tts_url() -> String {
    endpoints::TTS_DEFAULT.to_string()
}
fn default_speech_timeout() -> u64 {
    timeouts::SPEECH_CALL_MS
}
fn default_max_audio_bytes() -> usize {
    audio::MAX_AUDIO_BYTES
}
fn default_speed() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_url: default_stt_url(),
            tts_url: default_tts_url(),
            timeout_ms: default_speech_timeout(),
            max_audio_bytes: default_max_audio_bytes(),
            default_speed: default_speed(),
        }
    }
}

/// In-memory conversation history limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    #[serde(default = "default_max_last_searches")]
    pub max_last_searches: usize,

    /// Idle sessions older than this are dropped; 0 keeps them until the
    /// session cap pushes them out
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Live session cap; the least recently active session makes room
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_max_history() -> usize {
    session::MAX_HISTORY
}
fn default_max_last_searches() -> usize {
    session::MAX_LAST_SEARCHES
}
fn default_idle_timeout() -> u64 {
    session::IDLE_TIMEOUT_SECS
}
fn default_max_sessions() -> usize {
    session::MAX_SESSIONS
}
fn default_sweep_interval() -> u64 {
    session::SWEEP_INTERVAL_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            max_last_searches: default_max_last_searches(),
            idle_timeout_secs: default_idle_timeout(),
            max_sessions: default_max_sessions(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Periodic cleanup of synthesized audio files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousekeepingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,

    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_audio_dir() -> String {
    "static/audio".to_string()
}
fn default_retention() -> u64 {
    audio::RETENTION_SECS
}
fn default_interval() -> u64 {
    audio::CLEANUP_INTERVAL_SECS
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            audio_dir: default_audio_dir(),
            retention_secs: default_retention(),
            interval_secs: default_interval(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("FIGURO_VOICE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.catalog.timeout_ms, 10_000);
        assert_eq!(settings.speech.max_audio_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.session.max_history, 50);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_entity_confidence_validation() {
        let mut settings = Settings::default();
        settings.nlu.entity_confidence = 1.5;
        assert!(settings.validate().is_err());

        settings.nlu.entity_confidence = 0.8;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_scoring_weights_validation() {
        let mut settings = Settings::default();
        settings.nlu.scoring.intent_bonus = f32::NAN;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "nlu.scoring.intent_bonus"));
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 8000;
        settings.environment = RuntimeEnvironment::Production;
        settings.server.cors_enabled = false;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_catalog_validation() {
        let mut settings = Settings::default();
        settings.catalog.max_recommendations = 10;
        assert!(settings.validate().is_err());

        settings.catalog.max_recommendations = 5;
        settings.catalog.ttl_seconds = 0;
        assert!(settings.validate().is_err());

        settings.catalog.ttl_seconds = 60;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_speech_validation() {
        let mut settings = Settings::default();
        settings.speech.default_speed = 10.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
catalog:
  ttl_seconds: 60
chatbot:
  enabled: false
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.catalog.ttl_seconds, 60);
        assert_eq!(settings.catalog.timeout_ms, 10_000);
        assert!(!settings.chatbot.enabled);
        assert_eq!(settings.nlu.scoring.base, 0.7);
    }
}
