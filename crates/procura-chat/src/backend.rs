//! Backend service contracts consumed by the router.
//!
//! Each trait is one external capability. Implementations own their own
//! connections, timeouts, and retries; the router only sees
//! `Result<_, BackendError>`.

use std::sync::Arc;

use async_trait::async_trait;
use procura_core::types::ResultTable;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// What the structured-query service returned for one question.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    /// How the service interpreted the question.
    pub explanation: Option<String>,
    /// Rows from running the generated query, if one was run.
    pub table: Option<ResultTable>,
}

impl StructuredAnswer {
    pub fn explanation_only(explanation: impl Into<String>) -> Self {
        Self {
            explanation: Some(explanation.into()),
            table: None,
        }
    }

    pub fn with_table(explanation: impl Into<String>, table: ResultTable) -> Self {
        Self {
            explanation: Some(explanation.into()),
            table: Some(table),
        }
    }

    /// Explanation with surrounding whitespace removed, if non-blank.
    pub fn usable_explanation(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Result table, if present and non-empty.
    pub fn usable_table(&self) -> Option<&ResultTable> {
        self.table.as_ref().filter(|t| !t.is_empty())
    }
}

/// Natural language to query to tabular results.
#[async_trait]
pub trait StructuredQueryBackend: Send + Sync {
    async fn query_structured(&self, question: &str) -> Result<StructuredAnswer, BackendError>;
}

/// Completion grounded in indexed documents plus a caller-supplied context.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn answer_with_context(
        &self,
        question: &str,
        context: &str,
    ) -> Result<String, BackendError>;
}

/// Plain completion with no retrieval grounding.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, question: &str) -> Result<String, BackendError>;
}

/// The three services the router dispatches to.
#[derive(Clone)]
pub struct Backends {
    pub structured: Arc<dyn StructuredQueryBackend>,
    pub documents: Arc<dyn DocumentBackend>,
    pub completion: Arc<dyn CompletionBackend>,
}

impl Backends {
    /// Use one implementation for all three roles.
    pub fn shared<B>(backend: Arc<B>) -> Self
    where
        B: StructuredQueryBackend + DocumentBackend + CompletionBackend + 'static,
    {
        Self {
            structured: backend.clone(),
            documents: backend.clone(),
            completion: backend,
        }
    }

    /// Every call fails with `Unavailable`; the router answers from canned text.
    pub fn offline() -> Self {
        Self::shared(Arc::new(OfflineBackend::default()))
    }
}

/// Stand-in used when no service connection is configured.
#[derive(Clone, Debug)]
pub struct OfflineBackend {
    reason: String,
}

impl OfflineBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable(&self) -> BackendError {
        BackendError::Unavailable(self.reason.clone())
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new("no active connection")
    }
}

#[async_trait]
impl StructuredQueryBackend for OfflineBackend {
    async fn query_structured(&self, _question: &str) -> Result<StructuredAnswer, BackendError> {
        Err(self.unavailable())
    }
}

#[async_trait]
impl DocumentBackend for OfflineBackend {
    async fn answer_with_context(
        &self,
        _question: &str,
        _context: &str,
    ) -> Result<String, BackendError> {
        Err(self.unavailable())
    }
}

#[async_trait]
impl CompletionBackend for OfflineBackend {
    async fn complete(&self, _question: &str) -> Result<String, BackendError> {
        Err(self.unavailable())
    }
}
