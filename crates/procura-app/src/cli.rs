//! Command-line arguments.
//!
//! Priority for every setting: flag > environment variable > config file >
//! built-in default.

use std::path::PathBuf;

use clap::Parser;
use procura_core::config::expand_home;

/// Procura: ask procurement questions in plain language.
#[derive(Parser, Debug)]
#[command(name = "procura", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Answer one question, print it, and exit.
    #[arg(short = 'a', long = "ask", conflicts_with = "interactive")]
    pub ask: Option<String>,

    /// Chat on stdin/stdout instead of serving HTTP.
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Ignore `[cortex]` and answer from canned responses only.
    #[arg(long = "offline")]
    pub offline: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "write-config")]
    pub write_config: bool,
}

/// What the binary should do after setup.
#[derive(Debug, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Ask(String),
    Interactive,
    WriteConfig,
}

impl CliArgs {
    pub fn run_mode(&self) -> RunMode {
        if self.write_config {
            RunMode::WriteConfig
        } else if let Some(question) = &self.ask {
            RunMode::Ask(question.clone())
        } else if self.interactive {
            RunMode::Interactive
        } else {
            RunMode::Serve
        }
    }

    /// Priority: --config > PROCURA_CONFIG > ~/.procura/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(p) = &self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PROCURA_CONFIG") {
            return expand_home(&p);
        }
        default_config_path()
    }

    /// Priority: --port > PROCURA_PORT > config value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        std::env::var("PROCURA_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(config_port)
    }

    /// Priority: --log-level > config value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn default_config_path() -> PathBuf {
    expand_home("~/.procura/config.toml")
}
