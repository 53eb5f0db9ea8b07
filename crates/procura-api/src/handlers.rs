//! Route handlers.
//!
//! The chat endpoint is stateless on the server: clients send their
//! conversation history with each question and get the extended history
//! back.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use procura_chat::prompts::{welcome_history, QUICK_QUERIES, WELCOME_MESSAGE};
use procura_chat::{ExecutiveSummary, Intent, KpiSnapshot, QuickQuery, ResponseSource};
use procura_core::types::ConversationHistory;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// "cortex" or "offline".
    pub mode: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub history: ConversationHistory,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub request_id: Uuid,
    pub answer: String,
    pub source: ResponseSource,
    pub intents: Vec<Intent>,
    /// The request history with this exchange appended.
    pub history: ConversationHistory,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub history: ConversationHistory,
}

#[derive(Debug, Serialize)]
pub struct QuickQueriesResponse {
    pub queries: Vec<QuickQuery>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        mode: state.mode.to_string(),
    })
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let limit = state.config.api.max_question_chars;
    let length = req.question.chars().count();
    if length > limit {
        return Err(ApiError::PayloadTooLarge {
            limit,
            actual: length,
        });
    }

    let request_id = Uuid::new_v4();
    let routed = state
        .router
        .respond_detailed(&req.question, &req.history)
        .await;
    info!(
        %request_id,
        source = ?routed.source,
        chars = length,
        "Answered chat question"
    );

    let mut history = req.history;
    history.record_exchange(req.question, routed.text.clone());

    Ok(Json(ChatResponse {
        request_id,
        answer: routed.text,
        source: routed.source,
        intents: routed.intents,
        history,
        answered_at: Utc::now(),
    }))
}

/// GET /chat/welcome
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
        history: welcome_history(),
    })
}

/// GET /chat/quick-queries
pub async fn quick_queries() -> Json<QuickQueriesResponse> {
    Json(QuickQueriesResponse {
        queries: QUICK_QUERIES.to_vec(),
    })
}

/// POST /summary
pub async fn summary(
    State(state): State<AppState>,
    Json(kpis): Json<KpiSnapshot>,
) -> Result<Json<ExecutiveSummary>, ApiError> {
    if !kpis.total_spend.is_finite() || kpis.total_spend < 0.0 {
        return Err(ApiError::BadRequest(
            "total_spend must be a non-negative number".to_string(),
        ));
    }
    Ok(Json(state.summarizer.summarize(&kpis).await))
}
