//! Error types for Cortex REST calls.

use procura_chat::BackendError;

/// Failure talking to a Cortex endpoint.
#[derive(Debug, thiserror::Error)]
pub enum CortexError {
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The statement was accepted but is still running after the timeout.
    #[error("statement still running: {0}")]
    Pending(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for CortexError {
    fn from(err: serde_json::Error) -> Self {
        CortexError::Decode(err.to_string())
    }
}

impl From<CortexError> for BackendError {
    fn from(err: CortexError) -> Self {
        match err {
            // SQL compilation errors come back as 422 from the statements API.
            CortexError::Status {
                endpoint: "statements",
                status: 422,
                body,
            } => BackendError::MalformedQuery(body),
            CortexError::Decode(msg) => BackendError::InvalidResponse(msg),
            other => BackendError::Unavailable(other.to_string()),
        }
    }
}
