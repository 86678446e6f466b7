//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use figuro_voice_agent::{AgentError, VoiceAgent};
use figuro_voice_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Settings the process started with
    pub config: Arc<Settings>,
    pub agent: Arc<VoiceAgent>,
}

impl AppState {
    pub fn new(config: Settings, agent: VoiceAgent) -> Self {
        Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
        }
    }

    /// Build the agent and its HTTP collaborators from settings
    pub fn from_settings(config: Settings) -> Result<Self, AgentError> {
        let agent = VoiceAgent::from_settings(&config)?;
        Ok(Self::new(config, agent))
    }
}
