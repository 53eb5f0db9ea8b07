//! Scripted backend for tests and demos.
//!
//! `ScriptedBackend` returns preconfigured results for each capability and
//! records every call it receives, so callers can assert both on the final
//! answer and on which services were consulted.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{CompletionBackend, DocumentBackend, StructuredAnswer, StructuredQueryBackend};
use crate::error::BackendError;

/// One call observed by a [`ScriptedBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    Structured { question: String },
    Document { question: String, context: String },
    Completion { question: String },
}

/// Backend with fixed answers. Unscripted capabilities report `Unavailable`.
pub struct ScriptedBackend {
    structured: Result<StructuredAnswer, BackendError>,
    document: Result<String, BackendError>,
    completion: Result<String, BackendError>,
    calls: Mutex<Vec<BackendCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        let unscripted = || BackendError::Unavailable("not scripted".to_string());
        Self {
            structured: Err(unscripted()),
            document: Err(unscripted()),
            completion: Err(unscripted()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_structured(mut self, result: Result<StructuredAnswer, BackendError>) -> Self {
        self.structured = result;
        self
    }

    pub fn with_document(mut self, result: Result<String, BackendError>) -> Self {
        self.document = result;
        self
    }

    pub fn with_completion(mut self, result: Result<String, BackendError>) -> Self {
        self.completion = result;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(_) => vec![],
        }
    }

    fn record(&self, call: BackendCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StructuredQueryBackend for ScriptedBackend {
    async fn query_structured(&self, question: &str) -> Result<StructuredAnswer, BackendError> {
        self.record(BackendCall::Structured {
            question: question.to_string(),
        });
        self.structured.clone()
    }
}

#[async_trait]
impl DocumentBackend for ScriptedBackend {
    async fn answer_with_context(
        &self,
        question: &str,
        context: &str,
    ) -> Result<String, BackendError> {
        self.record(BackendCall::Document {
            question: question.to_string(),
            context: context.to_string(),
        });
        self.document.clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, question: &str) -> Result<String, BackendError> {
        self.record(BackendCall::Completion {
            question: question.to_string(),
        });
        self.completion.clone()
    }
}
