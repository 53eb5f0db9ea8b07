use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ProcuraError, Result};

/// Keywords that mark a question as a structured-analytics request.
pub const DEFAULT_STRUCTURED_KEYWORDS: &[&str] = &[
    "spend", "cost", "price", "savings", "top", "highest", "supplier", "invoice", "risk",
    "health", "region", "category", "total", "average", "count", "how much", "how many",
    "show me",
];

/// Keywords that mark a question as a document-search request.
pub const DEFAULT_DOCUMENT_KEYWORDS: &[&str] = &[
    "contract",
    "terms",
    "clause",
    "payment",
    "indemnification",
    "document",
    "compliance",
    "regulatory",
    "audit",
    "certificate",
];

/// Preamble sent with document-search questions, describing what is indexed.
pub const DEFAULT_DOCUMENT_CONTEXT: &str = "Supplier contracts and compliance documents are indexed. \
Common clauses include payment terms (Net 30-60), indemnification, \
Force Majeure, and regulatory compliance requirements.";

/// Top-level configuration for Procura.
///
/// Loaded from `~/.procura/config.toml` by default. Every section falls back
/// to its defaults when omitted, so an empty file is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcuraConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub cortex: CortexConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl ProcuraConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ProcuraConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Where the API bearer token is stored.
    pub fn token_path(&self) -> PathBuf {
        let token_file = expand_home(&self.api.token_file);
        if token_file.is_absolute() {
            token_file
        } else {
            self.general.data_dir_path().join(token_file)
        }
    }

    /// Reject values the router or API cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.router.max_table_rows == 0 {
            return Err(ProcuraError::Config(
                "router.max_table_rows must be at least 1".to_string(),
            ));
        }
        if self.api.max_question_chars == 0 {
            return Err(ProcuraError::Config(
                "api.max_question_chars must be at least 1".to_string(),
            ));
        }
        if self.cortex.timeout_secs == 0 {
            return Err(ProcuraError::Config(
                "cortex.timeout_secs must be at least 1".to_string(),
            ));
        }
        let blank = |words: &[String]| words.iter().any(|w| w.trim().is_empty());
        if blank(&self.router.structured_keywords) || blank(&self.router.document_keywords) {
            return Err(ProcuraError::Config(
                "router keyword lists must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the API token and local state.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Address the API server binds to.
    pub bind_address: String,
    /// API server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.procura".to_string(),
            log_level: "info".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 8470,
        }
    }
}

impl GeneralConfig {
    /// `data_dir` with a leading `~` expanded to the home directory.
    pub fn data_dir_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// Expand a leading `~/` using `HOME` (`USERPROFILE` on Windows).
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => {
            #[cfg(target_os = "windows")]
            let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
            #[cfg(not(target_os = "windows"))]
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(rest)
        }
        None => PathBuf::from(path),
    }
}

/// Query routing rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Case-insensitive substrings that select the structured-analytics path.
    pub structured_keywords: Vec<String>,
    /// Case-insensitive substrings that select the document-search path.
    pub document_keywords: Vec<String>,
    /// Maximum result rows rendered in a structured answer.
    pub max_table_rows: usize,
    /// Preamble passed to the document backend alongside the question.
    pub document_context: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            structured_keywords: DEFAULT_STRUCTURED_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            document_keywords: DEFAULT_DOCUMENT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            max_table_rows: 10,
            document_context: DEFAULT_DOCUMENT_CONTEXT.to_string(),
        }
    }
}

/// Snowflake Cortex connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    /// Account base URL, e.g. `https://myorg-myaccount.snowflakecomputing.com`.
    /// Empty means no connection is configured.
    pub account_url: String,
    /// Bearer token (OAuth or key-pair JWT). Usually supplied via env.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Value for `X-Snowflake-Authorization-Token-Type`.
    pub token_type: String,
    /// Staged semantic model used by Cortex Analyst.
    pub semantic_model_file: String,
    /// Model used for completions.
    pub completion_model: String,
    /// Warehouse used to run generated SQL.
    pub warehouse: Option<String>,
    /// Role used to run generated SQL.
    pub role: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Organization named in the assistant persona.
    pub organization: String,
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            account_url: String::new(),
            token: None,
            token_type: "OAUTH".to_string(),
            semantic_model_file: "@SNOWCORE_PROCUREMENT.RAW.STAGE_INTERNAL/semantic_model.yaml"
                .to_string(),
            completion_model: "mistral-large2".to_string(),
            warehouse: None,
            role: None,
            timeout_secs: 60,
            organization: "Snowcore Industries".to_string(),
        }
    }
}

impl CortexConfig {
    /// Whether enough is configured to attempt a connection.
    pub fn is_configured(&self) -> bool {
        !self.account_url.trim().is_empty()
            && self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Token file, relative to `general.data_dir` unless absolute.
    pub token_file: String,
    /// Questions longer than this (in chars) are rejected with 413.
    pub max_question_chars: usize,
    /// Requests per second across protected routes.
    pub rate_limit_per_sec: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_file: "api_token".to_string(),
            max_question_chars: 4000,
            rate_limit_per_sec: 50,
        }
    }
}
