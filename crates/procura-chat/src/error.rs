//! Error types for backend service calls.

use procura_core::error::ProcuraError;

/// Why a backend call produced no usable answer.
///
/// The router treats every variant as "no result" and moves on to the next
/// step of the fallback chain; none of these ever reach the end user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("malformed generated query: {0}")]
    MalformedQuery(String),
    #[error("backend returned no usable content")]
    EmptyResult,
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Expected, non-exceptional outcome (logged at debug rather than warn).
    pub fn is_empty_result(&self) -> bool {
        matches!(self, BackendError::EmptyResult)
    }
}

impl From<BackendError> for ProcuraError {
    fn from(err: BackendError) -> Self {
        ProcuraError::Backend(err.to_string())
    }
}
