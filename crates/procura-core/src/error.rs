use thiserror::Error;

/// Top-level error type for Procura.
///
/// Subsystem crates keep their own error enums (`BackendError`,
/// `CortexError`, `ApiError`) and convert into this one where they cross
/// into application code, so `?` works from the binary down.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProcuraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ProcuraError {
    fn from(err: toml::de::Error) -> Self {
        ProcuraError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ProcuraError {
    fn from(err: toml::ser::Error) -> Self {
        ProcuraError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ProcuraError {
    fn from(err: serde_json::Error) -> Self {
        ProcuraError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Procura operations.
pub type Result<T> = std::result::Result<T, ProcuraError>;
