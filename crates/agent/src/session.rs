//! In-process conversation memory
//!
//! One [`ConversationContext`] per session id. Nothing here survives a
//! restart; the store only feeds chatbot context, the history endpoint and
//! the aggregate insights view.
//!
//! Sessions are bounded two ways: idle ones are swept after
//! `idle_timeout_secs`, and once `max_sessions` is reached a new session
//! pushes out the least recently active one.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use figuro_voice_config::constants::session as limits;
use figuro_voice_config::SessionConfig;
use figuro_voice_core::entity::first_value;
use figuro_voice_core::{ConversationTurn, EntityType, Intent, Language, VoiceResult};

/// Ten years; keeps the cutoff arithmetic in range
const MAX_IDLE_SECS: u64 = 10 * 365 * 24 * 3600;

/// What the session has learned about the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPreferences {
    /// Product names asked about, oldest first
    pub last_searches: VecDeque<String>,
}

/// State kept for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub history: VecDeque<ConversationTurn>,
    pub preferences: SessionPreferences,
    pub preferred_language: Language,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl ConversationContext {
    fn new(language: Language) -> Self {
        let now = Utc::now();
        Self {
            history: VecDeque::new(),
            preferences: SessionPreferences::default(),
            preferred_language: language,
            started_at: now,
            last_activity: now,
        }
    }
}

/// Count of one label across all sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Aggregate view over every live session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub total_interactions: usize,
    pub top_intents: Vec<LabelCount>,
    pub top_products: Vec<LabelCount>,
    pub active_sessions: usize,
}

/// Session id → conversation context
pub struct SessionStore {
    sessions: DashMap<String, ConversationContext>,
    config: SessionConfig,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    /// Append one processed request to its session, creating the session on
    /// first use
    pub fn record(&self, session_id: &str, result: &VoiceResult) {
        if !self.sessions.contains_key(session_id)
            && self.sessions.len() >= self.config.max_sessions
        {
            self.make_room();
        }

        let mut context = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| ConversationContext::new(result.language));

        context.history.push_back(ConversationTurn::from_result(result));
        while context.history.len() > self.config.max_history {
            context.history.pop_front();
        }

        if result.intent == Intent::GetProductInfo {
            if let Some(product) = first_value(&result.entities, EntityType::Product) {
                let searches = &mut context.preferences.last_searches;
                searches.push_back(product.to_string());
                while searches.len() > self.config.max_last_searches {
                    searches.pop_front();
                }
            }
        }

        context.preferred_language = result.language;
        context.last_activity = Utc::now();
    }

    /// Up to `limit` turns, most recent first
    pub fn history(&self, session_id: &str, limit: usize) -> Vec<ConversationTurn> {
        self.sessions
            .get(session_id)
            .map(|ctx| ctx.history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Last `count` user inputs in chronological order
    pub fn recent_inputs(&self, session_id: &str, count: usize) -> Vec<String> {
        self.sessions
            .get(session_id)
            .map(|ctx| {
                let skip = ctx.history.len().saturating_sub(count);
                ctx.history
                    .iter()
                    .skip(skip)
                    .map(|turn| turn.user_input.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn context(&self, session_id: &str) -> Option<ConversationContext> {
        self.sessions.get(session_id).map(|ctx| ctx.clone())
    }

    /// Drop one session, or every session when `session_id` is `None`.
    /// Returns how many were removed.
    pub fn clear(&self, session_id: Option<&str>) -> usize {
        match session_id {
            Some(id) => usize::from(self.sessions.remove(id).is_some()),
            None => {
                let count = self.sessions.len();
                self.sessions.clear();
                count
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for longer than `idle_timeout_secs`.
    /// Returns how many were removed; a zero timeout disables the sweep.
    pub fn evict_idle(&self) -> usize {
        if self.config.idle_timeout_secs == 0 {
            return 0;
        }
        let secs = self.config.idle_timeout_secs.min(MAX_IDLE_SECS) as i64;
        self.evict_inactive_before(Utc::now() - Duration::seconds(secs))
    }

    /// Drop sessions whose last activity is older than `cutoff`
    pub fn evict_inactive_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, ctx| ctx.last_activity >= cutoff);
        before.saturating_sub(self.sessions.len())
    }

    /// Free one slot under the session cap: idle sessions first, then the
    /// least recently active one
    fn make_room(&self) {
        let swept = self.evict_idle();
        if self.sessions.len() < self.config.max_sessions {
            tracing::debug!(swept, "Evicted idle sessions to make room");
            return;
        }

        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.last_activity)
            .map(|entry| entry.key().clone());
        if let Some(id) = oldest {
            self.sessions.remove(&id);
            tracing::debug!(session_id = %id, "Session cap reached, evicted least recent session");
        }
    }

    pub fn insights(&self) -> Insights {
        let mut total_interactions = 0;
        let mut intents: HashMap<Intent, usize> = HashMap::new();
        let mut products: HashMap<String, usize> = HashMap::new();

        for ctx in self.sessions.iter() {
            total_interactions += ctx.history.len();
            for turn in &ctx.history {
                *intents.entry(turn.intent).or_default() += 1;
            }
            for product in &ctx.preferences.last_searches {
                *products.entry(product.clone()).or_default() += 1;
            }
        }

        Insights {
            total_interactions,
            top_intents: top_n(
                intents.into_iter().map(|(k, v)| (k.as_str().to_string(), v)),
                limits::TOP_INTENTS,
            ),
            top_products: top_n(products.into_iter(), limits::TOP_PRODUCTS),
            active_sessions: self.sessions.len(),
        }
    }
}

/// Highest counts first; ties broken by label so output is stable
fn top_n(counts: impl Iterator<Item = (String, usize)>, n: usize) -> Vec<LabelCount> {
    let mut counts: Vec<LabelCount> = counts
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use figuro_voice_core::Entity;

    fn result(text: &str, intent: Intent, product: Option<&str>) -> VoiceResult {
        VoiceResult {
            transcript: text.to_string(),
            language: Language::Vietnamese,
            intent,
            entities: product
                .map(|p| vec![Entity::new(EntityType::Product, p, 0.8)])
                .unwrap_or_default(),
            confidence: 0.9,
            response_text: "ok".to_string(),
            recommendations: Vec::new(),
            audio_url: None,
            processing_time_ms: 1,
        }
    }

    #[test]
    fn test_history_most_recent_first() {
        let store = SessionStore::default();
        store.record("s1", &result("một", Intent::Greeting, None));
        store.record("s1", &result("hai", Intent::Help, None));
        store.record("s1", &result("ba", Intent::Goodbye, None));

        let history = store.history("s1", 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_input, "ba");
        assert_eq!(history[1].user_input, "hai");
        assert!(store.history("missing", 5).is_empty());
    }

    #[test]
    fn test_recent_inputs_chronological() {
        let store = SessionStore::default();
        for text in ["a", "b", "c"] {
            store.record("s", &result(text, Intent::Unknown, None));
        }
        assert_eq!(store.recent_inputs("s", 2), vec!["b", "c"]);
    }

    #[test]
    fn test_caps_applied() {
        let store = SessionStore::new(SessionConfig {
            max_history: 3,
            max_last_searches: 2,
            ..SessionConfig::default()
        });
        for name in ["naruto", "luffy", "goku", "zoro"] {
            store.record("s", &result(name, Intent::GetProductInfo, Some(name)));
        }
        let ctx = store.context("s").unwrap();
        assert_eq!(ctx.history.len(), 3);
        assert_eq!(ctx.history[0].user_input, "luffy");
        assert_eq!(
            ctx.preferences.last_searches,
            VecDeque::from(vec!["goku".to_string(), "zoro".to_string()])
        );
    }

    #[test]
    fn test_only_product_info_tracks_searches() {
        let store = SessionStore::default();
        store.record("s", &result("mua naruto", Intent::CreateOrder, Some("naruto")));
        assert!(store.context("s").unwrap().preferences.last_searches.is_empty());
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::default();
        store.record("a", &result("x", Intent::Greeting, None));
        store.record("b", &result("y", Intent::Greeting, None));
        assert_eq!(store.clear(Some("a")), 1);
        assert_eq!(store.clear(Some("a")), 0);
        assert_eq!(store.clear(None), 1);
        assert_eq!(store.session_count(), 0);
    }

    fn age(store: &SessionStore, id: &str, minutes: i64) {
        let mut ctx = store.sessions.get_mut(id).unwrap();
        ctx.last_activity = Utc::now() - Duration::minutes(minutes);
    }

    #[test]
    fn test_evict_idle_sessions() {
        let store = SessionStore::new(SessionConfig {
            idle_timeout_secs: 600,
            ..SessionConfig::default()
        });
        store.record("stale", &result("x", Intent::Greeting, None));
        store.record("live", &result("y", Intent::Greeting, None));
        age(&store, "stale", 30);

        assert_eq!(store.evict_idle(), 1);
        assert!(store.context("stale").is_none());
        assert!(store.context("live").is_some());
        assert_eq!(store.evict_idle(), 0);
    }

    #[test]
    fn test_zero_idle_timeout_keeps_sessions() {
        let store = SessionStore::new(SessionConfig {
            idle_timeout_secs: 0,
            ..SessionConfig::default()
        });
        store.record("a", &result("x", Intent::Greeting, None));
        age(&store, "a", 24 * 60);
        assert_eq!(store.evict_idle(), 0);
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_session_cap_evicts_least_recent() {
        let store = SessionStore::new(SessionConfig {
            max_sessions: 2,
            idle_timeout_secs: 0,
            ..SessionConfig::default()
        });
        store.record("a", &result("x", Intent::Greeting, None));
        store.record("b", &result("y", Intent::Greeting, None));
        age(&store, "a", 5);
        age(&store, "b", 10);

        // Existing sessions never trigger eviction
        store.record("a", &result("again", Intent::Help, None));
        assert_eq!(store.session_count(), 2);

        store.record("c", &result("z", Intent::Greeting, None));
        assert_eq!(store.session_count(), 2);
        assert!(store.context("b").is_none());
        assert!(store.context("a").is_some());
        assert!(store.context("c").is_some());
    }

    #[test]
    fn test_session_cap_prefers_idle_sweep() {
        let store = SessionStore::new(SessionConfig {
            max_sessions: 3,
            idle_timeout_secs: 60,
            ..SessionConfig::default()
        });
        for id in ["a", "b", "c"] {
            store.record(id, &result("x", Intent::Greeting, None));
        }
        age(&store, "a", 10);
        age(&store, "b", 10);

        store.record("d", &result("y", Intent::Greeting, None));
        assert_eq!(store.session_count(), 2);
        assert!(store.context("c").is_some());
        assert!(store.context("d").is_some());
    }

    #[test]
    fn test_insights() {
        let store = SessionStore::default();
        store.record("a", &result("naruto", Intent::GetProductInfo, Some("naruto")));
        store.record("a", &result("xin chào", Intent::Greeting, None));
        store.record("b", &result("naruto", Intent::GetProductInfo, Some("naruto")));
        store.record("b", &result("luffy", Intent::GetProductInfo, Some("luffy")));

        let insights = store.insights();
        assert_eq!(insights.total_interactions, 4);
        assert_eq!(insights.active_sessions, 2);
        assert_eq!(insights.top_intents[0].label, "get_product_info");
        assert_eq!(insights.top_intents[0].count, 3);
        assert_eq!(
            insights.top_products[0],
            LabelCount {
                label: "naruto".to_string(),
                count: 2
            }
        );
    }
}
