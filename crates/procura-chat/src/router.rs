//! Query router: classification, fallback chain, and response assembly.
//!
//! A question is tried against the structured-query backend, then the
//! document backend, then plain completion, stopping at the first step that
//! produces usable text. The help message closes the chain and needs no
//! backend, so [`QueryRouter::respond`] always returns a non-empty answer.

use procura_core::config::RouterConfig;
use procura_core::types::ConversationHistory;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::Backends;
use crate::classifier::{Intent, IntentClassifier};
use crate::error::BackendError;
use crate::prompts::{CANNED_DOCUMENT_SUMMARY, HELP_MESSAGE};
use crate::response::ResponseFormatter;

/// Which step of the chain produced the answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Explanation plus result table.
    StructuredTable,
    /// Explanation alone.
    StructuredExplanation,
    DocumentAnalysis,
    /// Canned document summary after the document backend came back empty.
    DocumentFallback,
    GeneralCompletion,
    Help,
}

/// An answer together with how it was produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutedResponse {
    pub text: String,
    pub source: ResponseSource,
    pub intents: Vec<Intent>,
}

/// Routes one question at a time to the backends.
///
/// Holds no per-conversation state; one router can serve any number of
/// sessions concurrently.
#[derive(Clone)]
pub struct QueryRouter {
    classifier: IntentClassifier,
    formatter: ResponseFormatter,
    document_context: String,
    backends: Backends,
}

impl QueryRouter {
    pub fn new(
        classifier: IntentClassifier,
        formatter: ResponseFormatter,
        document_context: impl Into<String>,
        backends: Backends,
    ) -> Self {
        Self {
            classifier,
            formatter,
            document_context: document_context.into(),
            backends,
        }
    }

    pub fn from_config(config: &RouterConfig, backends: Backends) -> Self {
        Self::new(
            IntentClassifier::from_config(config),
            ResponseFormatter::new(config.max_table_rows),
            config.document_context.clone(),
            backends,
        )
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Answer a question.
    ///
    /// `history` is accepted so callers hand over the full conversation, but
    /// each turn is answered on its own. The caller appends the returned text
    /// to its history.
    pub async fn respond(&self, question: &str, history: &ConversationHistory) -> String {
        self.respond_detailed(question, history).await.text
    }

    /// Answer a question and report which step produced the answer.
    pub async fn respond_detailed(
        &self,
        question: &str,
        _history: &ConversationHistory,
    ) -> RoutedResponse {
        let intents = self.classifier.classify(question);

        if question.trim().is_empty() {
            debug!("Blank question, answering with help");
            return RoutedResponse {
                text: HELP_MESSAGE.to_string(),
                source: ResponseSource::Help,
                intents,
            };
        }

        debug!(
            intents = ?intents,
            keywords = ?self.classifier.explain(question),
            "Classified question"
        );

        let (text, source) = self.run_chain(question, &intents).await;
        info!(source = ?source, "Resolved response");

        RoutedResponse {
            text,
            source,
            intents,
        }
    }

    async fn run_chain(&self, question: &str, intents: &[Intent]) -> (String, ResponseSource) {
        if intents.contains(&Intent::StructuredAnalytics) {
            if let Some(answer) = self.try_structured(question).await {
                return answer;
            }
        }

        if intents.contains(&Intent::DocumentSearch) {
            return self.document_answer(question).await;
        }

        if let Some(text) = self.try_completion(question).await {
            return (self.formatter.general(&text), ResponseSource::GeneralCompletion);
        }

        (HELP_MESSAGE.to_string(), ResponseSource::Help)
    }

    // =========================================================================
    // Steps
    // =========================================================================

    async fn try_structured(&self, question: &str) -> Option<(String, ResponseSource)> {
        let answer = match self.backends.structured.query_structured(question).await {
            Ok(answer) => answer,
            Err(e) => {
                log_step_failure("structured", &e);
                return None;
            }
        };

        // Rows without an explanation are not shown on their own.
        let explanation = answer.usable_explanation()?;
        match answer.usable_table() {
            Some(table) => Some((
                self.formatter.structured(explanation, table),
                ResponseSource::StructuredTable,
            )),
            None => Some((
                explanation.to_string(),
                ResponseSource::StructuredExplanation,
            )),
        }
    }

    /// The document step always answers, with the canned summary when the
    /// backend has nothing.
    async fn document_answer(&self, question: &str) -> (String, ResponseSource) {
        let result = self
            .backends
            .documents
            .answer_with_context(question, &self.document_context)
            .await
            .and_then(non_blank);

        match result {
            Ok(text) => (
                self.formatter.document(&text),
                ResponseSource::DocumentAnalysis,
            ),
            Err(e) => {
                log_step_failure("document", &e);
                (
                    CANNED_DOCUMENT_SUMMARY.to_string(),
                    ResponseSource::DocumentFallback,
                )
            }
        }
    }

    async fn try_completion(&self, question: &str) -> Option<String> {
        match self
            .backends
            .completion
            .complete(question)
            .await
            .and_then(non_blank)
        {
            Ok(text) => Some(text),
            Err(e) => {
                log_step_failure("completion", &e);
                None
            }
        }
    }
}

fn non_blank(text: String) -> Result<String, BackendError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(BackendError::EmptyResult)
    } else {
        Ok(trimmed.to_string())
    }
}

fn log_step_failure(step: &str, err: &BackendError) {
    if err.is_empty_result() {
        debug!(step, "Backend returned nothing, falling through");
    } else {
        warn!(step, error = %err, "Backend call failed, falling through");
    }
}

// =============================================================================
// Tests
// =============================================================================
