//! Cortex client against a local fake account.
//!
//! A small axum app stands in for the three REST endpoints so the client's
//! request shapes, status handling, and decoding run over real HTTP.

use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use procura_chat::prompts::{CANNED_DOCUMENT_SUMMARY, HELP_MESSAGE};
use procura_chat::{
    BackendError, CompletionBackend, QueryRouter, ResponseSource, StructuredQueryBackend,
};
use procura_core::config::{CortexConfig, RouterConfig};
use procura_core::types::{CellValue, ConversationHistory};
use procura_cortex::{connect, CortexClient};

const TOKEN: &str = "fake-token";

// =============================================================================
// Fake account
// =============================================================================

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
        && headers.contains_key("x-snowflake-authorization-token-type")
}

async fn analyst(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad token"})));
    }
    let question = body["messages"][0]["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_lowercase();

    let content = if question.contains("broken") {
        json!([
            {"type": "text", "text": "Spend by supplier"},
            {"type": "sql", "statement": "SELECT BROKEN"}
        ])
    } else if question.contains("ambiguous") {
        json!([{"type": "text", "text": "Please clarify the time period."}])
    } else if question.contains("nothing") {
        json!([])
    } else {
        json!([
            {"type": "text", "text": "Top suppliers by total spend"},
            {"type": "sql", "statement": "SELECT SUPPLIER_NAME, TOTAL_SPEND FROM V"}
        ])
    };

    (
        StatusCode::OK,
        Json(json!({"message": {"role": "analyst", "content": content}, "request_id": "r-1"})),
    )
}

async fn statements(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let statement = body["statement"].as_str().unwrap_or_default();
    if statement.contains("BROKEN") {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"code": "000904", "message": "SQL compilation error: invalid identifier 'BROKEN'"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "resultSetMetaData": {
                "numRows": 2,
                "rowType": [
                    {"name": "SUPPLIER_NAME", "type": "text"},
                    {"name": "TOTAL_SPEND", "type": "fixed", "scale": 0}
                ]
            },
            "data": [["Acme GmbH", "900"], ["Borealis", "450"]]
        })),
    )
}

async fn complete(Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    let text = if prompt.contains("Context:") {
        "Most contracts use Net 30."
    } else {
        "Procurement is the process of sourcing goods."
    };
    Json(json!({"choices": [{"message": {"content": text}}]}))
}

async fn spawn_fake_account() -> SocketAddr {
    let app = Router::new()
        .route("/api/v2/cortex/analyst/message", post(analyst))
        .route("/api/v2/statements", post(statements))
        .route("/api/v2/cortex/inference:complete", post(complete));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr, token: &str) -> CortexConfig {
    CortexConfig {
        account_url: format!("http://{}", addr),
        token: Some(token.to_string()),
        timeout_secs: 5,
        ..CortexConfig::default()
    }
}

// =============================================================================
// Client
// =============================================================================

#[tokio::test]
async fn structured_query_runs_generated_sql() {
    let addr = spawn_fake_account().await;
    let client = CortexClient::from_config(&config_for(addr, TOKEN)).unwrap();

    let answer = client.query_structured("top suppliers").await.unwrap();

    assert_eq!(
        answer.explanation.as_deref(),
        Some("Top suppliers by total spend")
    );
    let table = answer.table.unwrap();
    assert_eq!(table.columns, vec!["SUPPLIER_NAME", "TOTAL_SPEND"]);
    assert_eq!(table.rows[0][1], CellValue::Integer(900));
}

#[tokio::test]
async fn compilation_error_is_malformed_query() {
    let addr = spawn_fake_account().await;
    let client = CortexClient::from_config(&config_for(addr, TOKEN)).unwrap();

    let err = client.query_structured("broken spend").await.unwrap_err();

    assert!(matches!(err, BackendError::MalformedQuery(msg) if msg.contains("BROKEN")));
}

#[tokio::test]
async fn explanation_without_sql_and_empty_reply() {
    let addr = spawn_fake_account().await;
    let client = CortexClient::from_config(&config_for(addr, TOKEN)).unwrap();

    let answer = client.query_structured("ambiguous spend").await.unwrap();
    assert_eq!(
        answer.explanation.as_deref(),
        Some("Please clarify the time period.")
    );
    assert!(answer.table.is_none());

    assert_eq!(
        client.query_structured("nothing").await,
        Err(BackendError::EmptyResult)
    );
}

#[tokio::test]
async fn wrong_token_is_unavailable() {
    let addr = spawn_fake_account().await;
    let client = CortexClient::from_config(&config_for(addr, "wrong")).unwrap();

    let err = client.query_structured("top suppliers").await.unwrap_err();

    assert!(matches!(err, BackendError::Unavailable(msg) if msg.contains("401")));
}

#[tokio::test]
async fn completion_uses_persona_prompt() {
    let addr = spawn_fake_account().await;
    let client = CortexClient::from_config(&config_for(addr, TOKEN)).unwrap();

    assert_eq!(
        client.complete("what is procurement").await.unwrap(),
        "Procurement is the process of sourcing goods."
    );
}

// =============================================================================
// Router over the fake account
// =============================================================================

#[tokio::test]
async fn router_end_to_end() {
    let addr = spawn_fake_account().await;
    let conn = connect(&config_for(addr, TOKEN));
    assert_eq!(conn.mode(), "cortex");
    let router = QueryRouter::from_config(&RouterConfig::default(), conn.backends);
    let history = ConversationHistory::new();

    let table = router.respond_detailed("top suppliers by spend", &history).await;
    assert_eq!(table.source, ResponseSource::StructuredTable);
    assert!(table.text.contains("Acme GmbH"));

    // Analyst fails, so the contract keyword sends it to the document path.
    let docs = router
        .respond_detailed("broken spend per contract", &history)
        .await;
    assert_eq!(docs.source, ResponseSource::DocumentAnalysis);
    assert_eq!(docs.text, "**Document Analysis:**\n\nMost contracts use Net 30.");
    assert_ne!(docs.text, CANNED_DOCUMENT_SUMMARY);

    let general = router.respond("hello", &history).await;
    assert!(general.starts_with("**Assistant Response:**"));
    assert_ne!(general, HELP_MESSAGE);
}
