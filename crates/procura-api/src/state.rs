//! Shared state handed to every handler.

use std::sync::Arc;
use std::time::Instant;

use procura_chat::{Backends, CompletionBackend, ExecutiveSummarizer, QueryRouter};
use procura_core::config::ProcuraConfig;

/// Cloned per request; everything heavy sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProcuraConfig>,
    pub router: Arc<QueryRouter>,
    pub summarizer: Arc<ExecutiveSummarizer>,
    /// Bearer token required on protected routes.
    pub api_token: String,
    /// Whether backends are live Cortex clients or offline stand-ins.
    pub mode: &'static str,
    pub start_time: Instant,
}

impl AppState {
    /// Build state from config and already-connected backends. The token
    /// starts empty; callers set it from the token file.
    pub fn new(
        config: ProcuraConfig,
        backends: Backends,
        summary_completion: Arc<dyn CompletionBackend>,
    ) -> Self {
        let router = QueryRouter::from_config(&config.router, backends);
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
            summarizer: Arc::new(ExecutiveSummarizer::new(summary_completion)),
            api_token: String::new(),
            mode: "offline",
            start_time: Instant::now(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }

    pub fn with_mode(mut self, mode: &'static str) -> Self {
        self.mode = mode;
        self
    }

    /// Offline state for tests and demos.
    pub fn offline(config: ProcuraConfig) -> Self {
        let backends = Backends::offline();
        let completion = backends.completion.clone();
        Self::new(config, backends, completion)
    }
}
