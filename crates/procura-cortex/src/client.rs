//! HTTP client shared by the Analyst, statements, and Complete endpoints.

use std::time::Duration;

use procura_core::config::CortexConfig;
use procura_core::types::ResultTable;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::analyst::{self, AnalystReply, ANALYST_PATH};
use crate::complete::{self, COMPLETE_PATH};
use crate::error::CortexError;
use crate::statements::{self, STATEMENTS_PATH};

const TOKEN_ENV: &str = "PROCURA_CORTEX_TOKEN";

/// Authenticated client for one Snowflake account.
#[derive(Clone)]
pub struct CortexClient {
    http: Client,
    base_url: String,
    token: String,
    token_type: String,
    semantic_model_file: String,
    completion_model: String,
    warehouse: Option<String>,
    role: Option<String>,
    timeout_secs: u64,
    organization: String,
}

impl std::fmt::Debug for CortexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CortexClient")
            .field("base_url", &self.base_url)
            .field("completion_model", &self.completion_model)
            .finish()
    }
}

impl CortexClient {
    /// Build a client from `[cortex]`. The token comes from the config or,
    /// failing that, from `PROCURA_CORTEX_TOKEN`.
    pub fn from_config(config: &CortexConfig) -> Result<Self, CortexError> {
        let base_url = config.account_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CortexError::MissingCredentials(
                "cortex.account_url is not set".to_string(),
            ));
        }
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CortexError::MissingCredentials(format!("cortex.token or {} is not set", TOKEN_ENV))
            })?;

        // Leave headroom over the server-side statement timeout.
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.saturating_add(10)))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token,
            token_type: config.token_type.clone(),
            semantic_model_file: config.semantic_model_file.clone(),
            completion_model: config.completion_model.clone(),
            warehouse: config.warehouse.clone(),
            role: config.role.clone(),
            timeout_secs: config.timeout_secs,
            organization: config.organization.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Ask the analyst to interpret a question against the semantic model.
    pub async fn analyst_message(&self, question: &str) -> Result<AnalystReply, CortexError> {
        let body = analyst::request_body(question, &self.semantic_model_file);
        let (_, text) = self.post("analyst", ANALYST_PATH, &body).await?;
        analyst::parse_reply(&text)
    }

    /// Run a SQL statement and return its first result partition.
    pub async fn execute_statement(&self, sql: &str) -> Result<ResultTable, CortexError> {
        let body = statements::request_body(
            sql,
            self.timeout_secs,
            self.warehouse.as_deref(),
            self.role.as_deref(),
        );
        let (status, text) = self.post("statements", STATEMENTS_PATH, &body).await?;
        if status == StatusCode::ACCEPTED {
            return Err(CortexError::Pending(text));
        }
        statements::parse_result(&text)
    }

    /// Send a prompt to the completion model as-is.
    pub async fn complete_raw(&self, prompt: &str) -> Result<String, CortexError> {
        let body = complete::request_body(&self.completion_model, prompt);
        let (_, text) = self.post("complete", COMPLETE_PATH, &body).await?;
        complete::parse_completion(&text)
    }

    /// POST a JSON body; non-2xx statuses become [`CortexError::Status`].
    async fn post(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &Value,
    ) -> Result<(StatusCode, String), CortexError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint, url = %url, "Calling Cortex");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("X-Snowflake-Authorization-Token-Type", &self.token_type)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CortexError::Status {
                endpoint,
                status: status.as_u16(),
                body: text,
            });
        }
        Ok((status, text))
    }
}
