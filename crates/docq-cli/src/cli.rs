//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use docq_core::api::ApiClient;
use docq_core::config::Config;

use crate::chat;

#[derive(Parser)]
#[command(name = "docq")]
#[command(version)]
#[command(about = "Terminal chat client for a document-grounded assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Ask the backend to answer without retrieved context
    #[arg(long = "no-rag")]
    no_rag: bool,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Check backend health and show index stats
    Health,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout_secs = secs;
    }
    if cli.no_rag {
        config.use_rag = false;
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    match cli.command {
        Some(Commands::Health) => runtime.block_on(health(&config)),
        None => runtime.block_on(chat::run(&config)),
    }
}

/// Prints the backend health report.
async fn health(config: &Config) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    let report = client
        .health()
        .await
        .map_err(|err| anyhow::anyhow!("Backend unreachable: {err}"))?;

    println!("status:     {}", report.status);
    println!("model:      {}", report.model);
    println!("collection: {}", report.collection);
    println!("documents:  {}", report.document_count);
    Ok(())
}

/// Logging goes to stderr so transcript output stays clean on stdout.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("DOCQ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
