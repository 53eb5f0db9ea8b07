//! Conversational query routing for procurement analytics.
//!
//! Classifies free-text questions by keyword, dispatches them to the
//! structured-query, document, or completion backend, and assembles a
//! single markdown answer, degrading through canned responses when a
//! backend is unavailable.

pub mod backend;
pub mod classifier;
pub mod error;
pub mod mock;
pub mod prompts;
pub mod response;
pub mod router;
pub mod summary;

pub use backend::{
    Backends, CompletionBackend, DocumentBackend, OfflineBackend, StructuredAnswer,
    StructuredQueryBackend,
};
pub use classifier::{Intent, IntentClassifier, KeywordRule};
pub use error::BackendError;
pub use prompts::QuickQuery;
pub use response::ResponseFormatter;
pub use router::{QueryRouter, ResponseSource, RoutedResponse};
pub use summary::{ExecutiveSummarizer, ExecutiveSummary, KpiSnapshot, SummarySource};
