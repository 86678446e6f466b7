//! HTTP Endpoints
//!
//! REST API for the voice assistant. Handlers only parse and validate the
//! request shape; everything else happens in [`VoiceAgent`].
//!
//! [`VoiceAgent`]: figuro_voice_agent::VoiceAgent

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Json, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{delete, get, post},
    Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use figuro_voice_agent::{suggested_actions, Insights, ProcessOptions, ProcessedTurn};
use figuro_voice_catalog::DEFAULT_SEARCH_LIMIT;
use figuro_voice_config::constants::session::DEFAULT_HISTORY_LIMIT;
use figuro_voice_config::ServerConfig;
use figuro_voice_core::{
    Category, ChatbotReply, ConversationTurn, Language, Product, RecommendedProduct,
};
use figuro_voice_pipeline::resolve_format;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

type ApiResult<T> = Result<Json<T>, ServerError>;

/// Room for the JSON envelope around a base64 audio payload
const JSON_ENVELOPE_BYTES: usize = 64 * 1024;

/// Largest request body accepted: a base64-encoded clip of
/// `max_audio_bytes` plus its JSON envelope. Anything bigger than the clip
/// cap but under this limit reaches `validate_audio` and gets a 400.
pub fn body_limit(max_audio_bytes: usize) -> usize {
    max_audio_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(JSON_ENVELOPE_BYTES)
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds.max(1));
    let static_dir = ServeDir::new(&server.static_dir);
    let max_body = body_limit(state.config.speech.max_audio_bytes);

    Router::new()
        .route("/health", get(health_check))
        .route("/voice/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Voice processing
        .route("/voice/process-text", post(process_text))
        .route("/voice/process-audio", post(process_audio))
        .route("/voice/tts", post(text_to_speech))
        .route("/voice/stream", get(stream_query).post(stream_body))
        // Catalog
        .route("/voice/products/search", get(search_products))
        .route("/voice/products/categories", get(list_categories))
        .route("/voice/products/recommendations", get(product_recommendations))
        // Chatbot passthrough
        .route("/voice/chatbot/query", post(chatbot_query))
        // Session memory
        .route("/voice/sessions", delete(clear_sessions))
        .route("/voice/sessions/:id", delete(clear_session))
        .route("/voice/sessions/:id/history", get(session_history))
        .route("/voice/insights", get(insights))
        .nest_service("/static", static_dir)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins
///
/// - disabled: permissive
/// - no valid origins: localhost:3000 only
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if parsed.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to localhost:3000");
        return base.allow_origin(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed.len());
    base.allow_origin(parsed)
}

/// Empty or missing tags mean Vietnamese
fn parse_language(tag: Option<&str>) -> Result<Language, ServerError> {
    match tag.map(str::trim).filter(|t| !t.is_empty()) {
        Some(tag) => Ok(tag.parse::<Language>()?),
        None => Ok(Language::default()),
    }
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let report = state.agent.health();
    let speech = |name: &Option<String>| match name {
        Some(backend) => serde_json::json!({ "status": "configured", "backend": backend }),
        None => serde_json::json!({ "status": "disabled" }),
    };

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "catalog": {
                "status": if report.catalog_fresh { "fresh" } else { "stale" },
                "products": report.cached_products,
            },
            "chatbot": {
                "status": if report.chatbot_configured { "configured" } else { "disabled" },
            },
            "stt": speech(&report.stt),
            "tts": speech(&report.tts),
            "sessions": { "active": report.active_sessions },
        }
    }))
}

#[derive(Debug, Deserialize)]
struct ProcessTextRequest {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    enable_tts: bool,
    #[serde(default)]
    voice_speed: Option<f32>,
}

async fn process_text(
    State(state): State<AppState>,
    Json(request): Json<ProcessTextRequest>,
) -> ApiResult<ProcessedTurn> {
    let options = ProcessOptions {
        language: parse_language(request.language.as_deref())?,
        session_id: request.session_id,
        enable_tts: request.enable_tts,
        voice_speed: request.voice_speed,
    };
    let turn = state.agent.process_text(&request.text, options).await?;
    Ok(Json(turn))
}

#[derive(Debug, Deserialize)]
struct ProcessAudioRequest {
    /// Base64-encoded clip
    audio: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    enable_tts: bool,
    #[serde(default)]
    voice_speed: Option<f32>,
}

async fn process_audio(
    State(state): State<AppState>,
    Json(request): Json<ProcessAudioRequest>,
) -> ApiResult<ProcessedTurn> {
    let format = resolve_format(request.format.as_deref(), request.filename.as_deref())?;
    let language = parse_language(request.language.as_deref())?;
    let audio = base64::engine::general_purpose::STANDARD
        .decode(request.audio.trim())
        .map_err(|e| ServerError::InvalidRequest(format!("audio is not valid base64: {e}")))?;

    let options = ProcessOptions {
        language,
        session_id: request.session_id,
        enable_tts: request.enable_tts,
        voice_speed: request.voice_speed,
    };
    let turn = state.agent.process_audio(&audio, format, options).await?;
    Ok(Json(turn))
}

#[derive(Debug, Deserialize)]
struct TtsRequest {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    voice_speed: Option<f32>,
}

#[derive(Debug, Serialize)]
struct TtsResponse {
    audio_url: String,
}

async fn text_to_speech(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> ApiResult<TtsResponse> {
    let language = parse_language(request.language.as_deref())?;
    let audio_url = state
        .agent
        .synthesize(&request.text, language, request.voice_speed)
        .await?;
    Ok(Json(TtsResponse { audio_url }))
}

/// Query shape shared by `GET` parameters and `POST` bodies
#[derive(Debug, Deserialize)]
struct StreamRequest {
    #[serde(alias = "text")]
    query: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct StreamResponse {
    response: String,
    products: Vec<RecommendedProduct>,
    suggested_actions: Vec<String>,
}

async fn stream_query(
    State(state): State<AppState>,
    Query(request): Query<StreamRequest>,
) -> ApiResult<StreamResponse> {
    stream_turn(&state, request).await
}

async fn stream_body(
    State(state): State<AppState>,
    Json(request): Json<StreamRequest>,
) -> ApiResult<StreamResponse> {
    stream_turn(&state, request).await
}

async fn stream_turn(state: &AppState, request: StreamRequest) -> ApiResult<StreamResponse> {
    let options = ProcessOptions {
        language: parse_language(request.language.as_deref())?,
        session_id: request.session_id,
        ..Default::default()
    };
    let turn = state.agent.process_text(&request.query, options).await?;
    let suggested_actions = if turn.suggested_actions.is_empty() {
        suggested_actions(turn.result.intent)
    } else {
        turn.suggested_actions
    };
    Ok(Json(StreamResponse {
        response: turn.result.response_text,
        products: turn.result.recommendations,
        suggested_actions,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    category: Option<u64>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ProductList {
    products: Vec<Product>,
    total: usize,
}

impl From<Vec<Product>> for ProductList {
    fn from(products: Vec<Product>) -> Self {
        Self {
            total: products.len(),
            products,
        }
    }
}

async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<ProductList> {
    let products = state
        .agent
        .catalog()
        .search(&params.q, params.category, params.limit)
        .await;
    Ok(Json(products.into()))
}

#[derive(Debug, Serialize)]
struct CategoryList {
    categories: Vec<Category>,
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<CategoryList> {
    let categories = state.agent.catalog().categories().await;
    Ok(Json(CategoryList { categories }))
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    #[serde(default)]
    category: Option<u64>,
    #[serde(default)]
    price_max: Option<u64>,
    #[serde(default)]
    limit: Option<usize>,
}

async fn product_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> ApiResult<ProductList> {
    let products = state
        .agent
        .catalog()
        .recommendations_for(
            params.category,
            params.price_max,
            params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        )
        .await;
    Ok(Json(products.into()))
}

#[derive(Debug, Deserialize)]
struct ChatbotRequest {
    #[serde(alias = "query")]
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

async fn chatbot_query(
    State(state): State<AppState>,
    Json(request): Json<ChatbotRequest>,
) -> ApiResult<ChatbotReply> {
    let language = parse_language(request.language.as_deref())?;
    let reply = state
        .agent
        .query_chatbot(&request.text, language, request.session_id.as_deref())
        .await?;
    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    session_id: String,
    history: Vec<ConversationTurn>,
    count: usize,
}

async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<HistoryResponse> {
    let history = state
        .agent
        .sessions()
        .history(&id, params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
    Ok(Json(HistoryResponse {
        session_id: id,
        count: history.len(),
        history,
    }))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    match state.agent.sessions().clear(Some(&id)) {
        0 => Err(ServerError::NotFound(format!("session {id}"))),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

async fn clear_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cleared = state.agent.sessions().clear(None);
    Json(serde_json::json!({ "cleared": cleared }))
}

async fn insights(State(state): State<AppState>) -> Json<Insights> {
    Json(state.agent.sessions().insights())
}

/// Socket address string for the configured host and port
pub fn bind_address(server: &ServerConfig) -> String {
    format!("{}:{}", server.host, server.port)
}
