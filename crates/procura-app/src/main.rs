//! Procura application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Connect the Cortex backends (or offline stand-ins)
//! 3. Serve the REST API, answer a single question, or chat on stdin

mod cli;

use std::path::Path;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use procura_api::auth::load_or_generate_token;
use procura_api::AppState;
use procura_chat::prompts::{quick_query, welcome_history, QUICK_QUERIES, WELCOME_MESSAGE};
use procura_chat::QueryRouter;
use procura_core::config::ProcuraConfig;
use procura_cortex::CortexConnection;

use cli::{CliArgs, RunMode};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load the config file before logging is up so its log level can apply.
/// A missing file is normal on first run.
fn read_config(path: &Path) -> (ProcuraConfig, Option<String>) {
    if !path.exists() {
        return (ProcuraConfig::default(), None);
    }
    match ProcuraConfig::load(path) {
        Ok(config) => (config, None),
        Err(e) => (ProcuraConfig::default(), Some(e.to_string())),
    }
}

/// Write `config` to `path`, unless the file there failed to load. Saving
/// defaults over an unreadable file would discard the user's settings.
fn write_config(path: &Path, config: &ProcuraConfig, load_error: Option<&str>) -> AppResult<()> {
    if let Some(e) = load_error {
        return Err(format!(
            "refusing to overwrite {}: it failed to load ({}); fix or remove it first",
            path.display(),
            e
        )
        .into());
    }
    config.save(path)?;
    Ok(())
}

fn init_tracing(level: &str) {
    // Logs go to stderr so `--ask` output stays clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn connect_backends(config: &ProcuraConfig, offline: bool) -> CortexConnection {
    if offline {
        tracing::info!("Offline mode requested, Cortex disabled");
        return CortexConnection::offline("offline mode");
    }
    procura_cortex::connect(&config.cortex)
}

/// Read questions from stdin until EOF or `exit`.
async fn interactive(router: QueryRouter) -> AppResult<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history = welcome_history();

    stdout
        .write_all(format!("{}\n\nQuick queries:\n", WELCOME_MESSAGE).as_bytes())
        .await?;
    for q in QUICK_QUERIES {
        stdout
            .write_all(format!("  {} -> {}\n", q.label, q.question).as_bytes())
            .await?;
    }

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        // Typing a quick-query label asks its question.
        let question = quick_query(input).map_or(input, |q| q.question);
        let answer = router.respond(question, &history).await;
        history.record_exchange(question, answer.clone());

        stdout.write_all(format!("\n{}\n", answer).as_bytes()).await?;
    }

    tracing::debug!(turns = history.len(), "Interactive session ended");
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();
    let (config, load_error) = read_config(&config_file);

    init_tracing(&args.resolve_log_level(&config.general.log_level));
    tracing::info!("Starting Procura v{}", env!("CARGO_PKG_VERSION"));
    match &load_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
    }

    let mode = args.run_mode();
    if mode == RunMode::WriteConfig {
        write_config(&config_file, &config, load_error.as_deref())?;
        println!("{}", config_file.display());
        return Ok(());
    }

    let conn = connect_backends(&config, args.offline);
    tracing::info!(mode = conn.mode(), "Backends ready");

    match mode {
        RunMode::Ask(question) => {
            let router = QueryRouter::from_config(&config.router, conn.backends);
            let answer = router.respond(&question, &welcome_history()).await;
            println!("{}", answer);
        }
        RunMode::Interactive => {
            let router = QueryRouter::from_config(&config.router, conn.backends);
            interactive(router).await?;
        }
        RunMode::Serve | RunMode::WriteConfig => {
            let token = load_or_generate_token(&config.token_path());
            let port = args.resolve_port(config.general.port);
            let live_mode = conn.mode();
            let state = AppState::new(config, conn.backends, conn.summary_completion)
                .with_token(token)
                .with_mode(live_mode);
            procura_api::start_server(state, port).await?;
        }
    }

    Ok(())
}
