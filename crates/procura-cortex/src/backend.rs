//! Router backend implementations on top of [`CortexClient`].

use std::sync::Arc;

use async_trait::async_trait;
use procura_chat::{
    BackendError, Backends, CompletionBackend, DocumentBackend, OfflineBackend, StructuredAnswer,
    StructuredQueryBackend,
};
use procura_core::config::CortexConfig;
use tracing::{info, warn};

use crate::client::CortexClient;
use crate::complete::build_prompt;

#[async_trait]
impl StructuredQueryBackend for CortexClient {
    async fn query_structured(&self, question: &str) -> Result<StructuredAnswer, BackendError> {
        let reply = self.analyst_message(question).await?;
        let explanation = reply.explanation_with_suggestions();

        let Some(sql) = reply.sql.as_deref() else {
            return match explanation {
                Some(text) => Ok(StructuredAnswer::explanation_only(text)),
                None => Err(BackendError::EmptyResult),
            };
        };

        let table = self.execute_statement(sql).await?;
        Ok(StructuredAnswer {
            explanation,
            table: Some(table),
        })
    }
}

#[async_trait]
impl DocumentBackend for CortexClient {
    async fn answer_with_context(
        &self,
        question: &str,
        context: &str,
    ) -> Result<String, BackendError> {
        let prompt = build_prompt(self.organization(), question, Some(context));
        Ok(self.complete_raw(&prompt).await?)
    }
}

#[async_trait]
impl CompletionBackend for CortexClient {
    async fn complete(&self, question: &str) -> Result<String, BackendError> {
        let prompt = build_prompt(self.organization(), question, None);
        Ok(self.complete_raw(&prompt).await?)
    }
}

/// Completion without the assistant persona, for callers that write their
/// own full prompt (the executive summary).
#[derive(Clone, Debug)]
pub struct RawCompletion(pub CortexClient);

#[async_trait]
impl CompletionBackend for RawCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        Ok(self.0.complete_raw(prompt).await?)
    }
}

/// Everything the app needs from Cortex.
#[derive(Clone)]
pub struct CortexConnection {
    /// Backends for the query router.
    pub backends: Backends,
    /// Persona-free completion for the executive summary.
    pub summary_completion: Arc<dyn CompletionBackend>,
    /// False when running on offline stand-ins.
    pub live: bool,
}

impl CortexConnection {
    pub fn offline(reason: impl Into<String>) -> Self {
        let offline = Arc::new(OfflineBackend::new(reason));
        let summary_completion: Arc<dyn CompletionBackend> = offline.clone();
        Self {
            backends: Backends::shared(offline),
            summary_completion,
            live: false,
        }
    }

    pub fn mode(&self) -> &'static str {
        if self.live {
            "cortex"
        } else {
            "offline"
        }
    }
}

/// Connect to Cortex, falling back to offline stand-ins when it is not
/// configured.
pub fn connect(config: &CortexConfig) -> CortexConnection {
    match CortexClient::from_config(config) {
        Ok(client) => {
            info!(account = %client.base_url(), "Using Cortex backends");
            CortexConnection {
                summary_completion: Arc::new(RawCompletion(client.clone())),
                backends: Backends::shared(Arc::new(client)),
                live: true,
            }
        }
        Err(e) => {
            warn!(error = %e, "Cortex not configured, running offline");
            CortexConnection::offline(e.to_string())
        }
    }
}
