//! HTTP API for the procurement assistant.
//!
//! Exposes the query router (`/chat`), the conversation opener and quick
//! queries, and the executive summary over axum, behind bearer-token auth
//! and a per-second rate limit.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
