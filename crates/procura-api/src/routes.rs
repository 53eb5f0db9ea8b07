//! Router assembly and server startup.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use procura_core::error::{ProcuraError, Result};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// Request bodies are small JSON documents; history dominates.
const MAX_BODY_BYTES: usize = 256 * 1024;

fn cors_layer(state: &AppState) -> CorsLayer {
    let port = state.config.general.port;
    let origins: Vec<HeaderValue> = ["127.0.0.1", "localhost"]
        .iter()
        .filter_map(|host| format!("http://{}:{}", host, port).parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the axum router with all routes and middleware.
///
/// `/health` is open; everything else needs the bearer token and is rate
/// limited.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);
    let limiter = RateLimiter::new(state.config.api.rate_limit_per_sec);

    let public_routes = Router::new().route("/health", get(handlers::health));

    let protected_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/welcome", get(handlers::welcome))
        .route("/chat/quick-queries", get(handlers::quick_queries))
        .route("/summary", post(handlers::summary))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind to `general.bind_address:port` and serve until the process exits.
pub async fn start_server(state: AppState, port: u16) -> Result<()> {
    let addr = format!("{}:{}", state.config.general.bind_address, port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ProcuraError::Api(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ProcuraError::Api(format!("Server error: {}", e)))?;
    Ok(())
}
