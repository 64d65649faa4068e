//! Oilfield Insights service
//!
//! # Usage
//!
//! ```bash
//! # Run with ./oilfield.toml or built-in defaults
//! cargo run --release
//!
//! # Explicit config file and port
//! ./oilfield-insights --config /etc/oilfield.toml --port 9000
//!
//! # Show the effective configuration and exit
//! ./oilfield-insights --print-config
//! ```
//!
//! # Environment Variables
//!
//! - `OILFIELD_CONFIG`: Path to the TOML config file
//! - `DATABASE_URL` / `POSTGRES_*`: Tabular store
//! - `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD`: Graph store
//! - `QDRANT_URL` / `QDRANT_HOST` + `QDRANT_PORT`: Document store
//! - `OPENAI_API_KEY`: Enables generative synthesis when the endpoint answers
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use oilfield_insights::api::{create_app, AppState};
use oilfield_insights::config::{AppConfig, CONFIG_ENV_VAR};
use oilfield_insights::{llm, Orchestrator, Retrievers, Synthesizer};
use std::path::PathBuf;
use tracing::{info, warn};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "oilfield-insights")]
#[command(about = "Natural-language insights over oilfield production, asset and HSE data")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides OILFIELD_CONFIG and ./oilfield.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the server address (default: "0.0.0.0:8000")
    #[arg(short, long, value_name = "HOST:PORT", env = "OILFIELD_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Override only the listening port
    #[arg(short, long)]
    port: Option<u16>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Resolve configuration: file, then environment, then command line.
fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load(),
    };

    let mut config = config.with_env_overrides();

    if let Some(addr) = &args.bind_address {
        config.server.bind_address = addr.clone();
    }
    if let Some(port) = args.port {
        let host = config
            .server
            .bind_address
            .rsplit_once(':')
            .map_or("0.0.0.0", |(host, _)| host)
            .to_string();
        config.server.bind_address = format!("{host}:{port}");
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is normal outside development
    let dotenv = dotenvy::dotenv();

    let args = CliArgs::parse();
    init_logging(args.log_json);

    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "Loaded environment from .env");
    }

    let config = load_config(&args)?;

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Intelligent Oilfield Insights Platform v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if std::env::var(CONFIG_ENV_VAR).is_err() && args.config.is_none() {
        info!("Set {CONFIG_ENV_VAR} to point at a config file");
    }

    let retrievers =
        Retrievers::from_config(&config).context("Failed to initialise retriever backends")?;

    let backend = llm::probe_backend(&config.llm).await;
    let synthesizer = Synthesizer::from_probe(backend);
    info!(method = %synthesizer.preferred_method(), "Synthesis strategy selected");

    let orchestrator = Orchestrator::new(retrievers, synthesizer);
    let app = create_app(AppState::new(orchestrator), &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!("🎯 API available at: http://{}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            info!("🛑 Received Ctrl+C, initiating shutdown...");
        })
        .await
        .context("HTTP server error")?;

    info!("✓ Oilfield Insights shutdown complete");
    Ok(())
}
