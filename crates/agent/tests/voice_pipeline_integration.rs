//! Integration tests for the voice pipeline (STT -> Agent -> TTS)
//!
//! Every collaborator is an in-memory mock so the tests exercise the real
//! understanding, ranking and composition code end to end.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use figuro_voice_agent::{
    AgentConfig, AgentError, ProcessOptions, ResponseComposer, SessionStore, VoiceAgent,
    STT_SERVICE_ERROR, STT_UNRECOGNIZED,
};
use figuro_voice_catalog::{CacheConfig, ProductCache};
use figuro_voice_core::{
    AudioFormat, BackendError, Category, CategoryRef, ChatbotBackend, ChatbotQuery, ChatbotReply,
    EntityType, Intent, Language, Product, ProductBackend, SpeechError, SpeechToText,
    TextToSpeech,
};
use figuro_voice_text_processing::NluEngine;

struct StaticCatalog;

#[async_trait]
impl ProductBackend for StaticCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let naruto = CategoryRef { id: 1, name: "Naruto".into() };
        let one_piece = CategoryRef { id: 2, name: "One Piece".into() };
        let dragon_ball = CategoryRef { id: 3, name: "Dragon Ball".into() };
        Ok(vec![
            Product::new(1, "Naruto Uzumaki Sage Mode", 1_500_000, naruto.clone()),
            Product::new(2, "Monkey D. Luffy Gear 5", 3_200_000, one_piece),
            Product::new(3, "Son Goku Ultra Instinct", 900_000, dragon_ball),
            Product::new(4, "Sasuke Uchiha Susanoo", 2_400_000, naruto),
        ])
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        Ok(vec![
            Category::new(1, "Naruto"),
            Category::new(2, "One Piece"),
            Category::new(3, "Dragon Ball"),
        ])
    }
}

/// Replies with a fixed text and remembers every query
struct ScriptedChatbot {
    reply: Option<String>,
    fail: bool,
    queries: Mutex<Vec<ChatbotQuery>>,
}

impl ScriptedChatbot {
    fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            fail: true,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatbotBackend for ScriptedChatbot {
    async fn query(&self, query: ChatbotQuery) -> Result<ChatbotReply, BackendError> {
        self.queries.lock().push(query);
        if self.fail {
            return Err(BackendError::Timeout(10_000));
        }
        Ok(ChatbotReply {
            response: self.reply.clone(),
            suggestions: vec!["Xem thêm".to_string()],
            ..Default::default()
        })
    }
}

struct FixedStt(Result<String, SpeechError>);

#[async_trait]
impl SpeechToText for FixedStt {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _format: AudioFormat,
        _language: Language,
    ) -> Result<String, SpeechError> {
        self.0.clone()
    }

    fn name(&self) -> &str {
        "fixed-stt"
    }
}

struct FixedTts(Result<String, SpeechError>);

#[async_trait]
impl TextToSpeech for FixedTts {
    async fn synthesize(
        &self,
        _text: &str,
        _language: Language,
        _speed: Option<f32>,
    ) -> Result<String, SpeechError> {
        self.0.clone()
    }

    fn name(&self) -> &str {
        "fixed-tts"
    }
}

fn agent() -> VoiceAgent {
    let catalog = ProductCache::new(Arc::new(StaticCatalog), CacheConfig::default());
    VoiceAgent::new(
        AgentConfig {
            context_queries: 5,
            max_audio_bytes: 1024,
        },
        Arc::new(NluEngine::with_defaults().unwrap()),
        Arc::new(catalog),
        ResponseComposer::default(),
        SessionStore::default(),
    )
}

fn options(session: &str) -> ProcessOptions {
    ProcessOptions {
        session_id: Some(session.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_product_info_with_recommendations() {
    let agent = agent();
    let turn = agent
        .process_text("Tôi muốn tìm mô hình Naruto", options("s1"))
        .await
        .unwrap();
    let result = &turn.result;

    assert_eq!(result.intent, Intent::GetProductInfo);
    assert!(result
        .entities
        .iter()
        .any(|e| e.entity_type == EntityType::Product && e.value == "naruto"));
    assert!(result.confidence > 0.0 && result.confidence <= 1.0);

    assert!(!result.recommendations.is_empty());
    assert!(result.recommendations.len() <= 5);
    assert_eq!(result.recommendations[0].product.id, 1);
    assert!(result.recommendations.iter().all(|r| r.relevance_score > 0));

    assert!(result.response_text.contains("thông tin về naruto"));
    assert!(result
        .response_text
        .contains("1. Naruto Uzumaki Sage Mode - Naruto - Giá 2 triệu đ"));
    assert_eq!(turn.session_id, "s1");
}

#[tokio::test]
async fn test_greeting_without_catalog_lookup() {
    let agent = agent();
    let turn = agent.process_text("Xin chào", options("s1")).await.unwrap();

    assert_eq!(turn.result.intent, Intent::Greeting);
    assert!(turn.result.recommendations.is_empty());
    assert!(turn
        .result
        .response_text
        .starts_with("Xin chào! Tôi là trợ lý ảo Figuro."));
    // Greeting never touches the catalog
    assert_eq!(agent.catalog().product_count(), 0);
}

#[tokio::test]
async fn test_price_keyword_for_unknown_intent() {
    let agent = agent();
    let turn = agent.process_text("giá sản phẩm", options("s1")).await.unwrap();

    assert_eq!(turn.result.intent, Intent::Unknown);
    assert!(turn
        .result
        .response_text
        .starts_with("Bạn muốn hỏi về giá sản phẩm?"));
}

#[tokio::test]
async fn test_chatbot_reply_with_product_block() {
    let chatbot = Arc::new(ScriptedChatbot::replying("Hello!"));
    let agent = agent().with_chatbot(chatbot.clone());

    let turn = agent
        .process_text(
            "Tôi muốn tìm mô hình Naruto",
            ProcessOptions {
                language: Language::English,
                session_id: Some("s2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let text = &turn.result.response_text;
    assert!(text.starts_with("Hello!"));
    assert!(text.contains("\n\nRecommended products:\n1. "));
    assert!(text.contains("Price 2 million VND"));
    assert_eq!(turn.suggested_actions, vec!["Xem thêm".to_string()]);

    let queries = chatbot.queries.lock();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].context.session_id.as_deref(), Some("s2"));
    assert_eq!(queries[0].context.source, "voice_agent");
}

#[tokio::test]
async fn test_chatbot_failure_falls_back_to_templates() {
    let agent = agent().with_chatbot(Arc::new(ScriptedChatbot::failing()));
    let turn = agent.process_text("tạm biệt", options("s1")).await.unwrap();

    assert_eq!(turn.result.intent, Intent::Goodbye);
    assert!(turn.result.response_text.starts_with("Cảm ơn bạn"));
    assert!(!turn.suggested_actions.is_empty());
}

#[tokio::test]
async fn test_chatbot_receives_previous_queries() {
    let chatbot = Arc::new(ScriptedChatbot::replying("ok"));
    let agent = agent().with_chatbot(chatbot.clone());

    agent.process_text("xin chào", options("ctx")).await.unwrap();
    agent.process_text("tìm mô hình goku", options("ctx")).await.unwrap();

    let queries = chatbot.queries.lock();
    assert!(queries[0].context.previous_queries.is_empty());
    assert_eq!(queries[1].context.previous_queries, vec!["xin chào".to_string()]);
}

#[tokio::test]
async fn test_empty_text_rejected() {
    let agent = agent();
    let err = agent.process_text("   ", options("s1")).await.unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(agent.sessions().session_count(), 0);
}

#[tokio::test]
async fn test_audio_transcribed_and_processed() {
    let agent = agent().with_stt(Arc::new(FixedStt(Ok("xin chào".into()))));
    let turn = agent
        .process_audio(&[1u8; 64], AudioFormat::Wav, options("a1"))
        .await
        .unwrap();
    assert_eq!(turn.result.transcript, "xin chào");
    assert_eq!(turn.result.intent, Intent::Greeting);
}

#[tokio::test]
async fn test_stt_failure_yields_placeholder() {
    let agent = agent().with_stt(Arc::new(FixedStt(Err(SpeechError::Unrecognized))));
    let turn = agent
        .process_audio(&[1u8; 64], AudioFormat::Mp3, options("a2"))
        .await
        .unwrap();
    assert_eq!(turn.result.transcript, STT_UNRECOGNIZED);
    assert!(!turn.result.response_text.is_empty());

    let agent = self::agent();
    let turn = agent
        .process_audio(&[1u8; 64], AudioFormat::Mp3, options("a3"))
        .await
        .unwrap();
    assert_eq!(turn.result.transcript, STT_SERVICE_ERROR);
}

#[tokio::test]
async fn test_oversized_audio_rejected_before_transcription() {
    let agent = agent().with_stt(Arc::new(FixedStt(Ok("xin chào".into()))));
    let err = agent
        .process_audio(&[0u8; 2048], AudioFormat::Wav, options("a4"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AgentError::Core(figuro_voice_core::Error::AudioTooLarge { size: 2048, max: 1024 })
    ));
}

#[tokio::test]
async fn test_tts_failure_leaves_audio_absent() {
    let agent = agent().with_tts(Arc::new(FixedTts(Err(SpeechError::Service("down".into())))));
    let turn = agent
        .process_text(
            "xin chào",
            ProcessOptions {
                enable_tts: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(turn.result.audio_url.is_none());
    assert!(!turn.result.response_text.is_empty());
}

#[tokio::test]
async fn test_tts_success_sets_audio_url() {
    let agent = agent().with_tts(Arc::new(FixedTts(Ok("/static/audio/a.mp3".into()))));
    let turn = agent
        .process_text(
            "xin chào",
            ProcessOptions {
                enable_tts: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(turn.result.audio_url.as_deref(), Some("/static/audio/a.mp3"));

    let turn = agent.process_text("xin chào", ProcessOptions::default()).await.unwrap();
    assert!(turn.result.audio_url.is_none());
}

#[tokio::test]
async fn test_synthesize_without_backend() {
    let agent = agent();
    let err = agent
        .synthesize("xin chào", Language::Vietnamese, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Unavailable(_)));
}

#[tokio::test]
async fn test_session_history_and_insights() {
    let agent = agent();
    agent.process_text("Xin chào", options("hist")).await.unwrap();
    agent
        .process_text("Tôi muốn tìm mô hình Naruto", options("hist"))
        .await
        .unwrap();
    let generated = agent
        .process_text("Tôi muốn tìm mô hình Naruto", ProcessOptions::default())
        .await
        .unwrap();
    assert!(!generated.session_id.is_empty());

    let history = agent.sessions().history("hist", 10);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].intent, Intent::GetProductInfo);
    assert_eq!(history[1].intent, Intent::Greeting);

    let insights = agent.sessions().insights();
    assert_eq!(insights.total_interactions, 3);
    assert_eq!(insights.active_sessions, 2);
    assert_eq!(insights.top_intents[0].label, "get_product_info");
    assert_eq!(insights.top_products[0].label, "naruto");
    assert_eq!(insights.top_products[0].count, 2);
}

#[tokio::test]
async fn test_health_report() {
    let agent = agent().with_tts(Arc::new(FixedTts(Ok("x".into()))));
    let health = agent.health();
    assert!(!health.catalog_fresh);
    assert!(!health.chatbot_configured);
    assert_eq!(health.stt, None);
    assert_eq!(health.tts.as_deref(), Some("fixed-tts"));
}
