//! API error type and JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// JSON body returned with every error status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code, e.g. "bad_request".
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400: missing, blank, or oversized input.
    BadRequest(String),
    /// 401: missing or wrong bearer token.
    Unauthorized(String),
    /// 413: question longer than the configured limit.
    PayloadTooLarge { limit: usize, actual: usize },
    /// 429
    TooManyRequests,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::PayloadTooLarge { limit, actual } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "question_too_long",
                format!("Question is {} characters; the limit is {}", actual, limit),
                Some(serde_json::json!({ "limit": limit, "actual": actual })),
            ),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "too_many_requests",
                "Rate limit exceeded".to_string(),
                None,
            ),
        };

        let body = ErrorBody {
            error: code.to_string(),
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}
