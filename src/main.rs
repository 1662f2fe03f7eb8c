//! Health Assistant server
//!
//! Run with: cargo run -- [--config path/to/config.toml]
//!
//! # Configuration
//!
//! Environment variables:
//! - `SUPABASE_URL` / `SUPABASE_KEY`: Store credentials (fall back to `[store]` in the config file)
//! - `HEALTH_ASSISTANT_HOST`: Host to bind to (default: 0.0.0.0)
//! - `HEALTH_ASSISTANT_PORT`: Port to listen on (default: 8501)
//! - `HEALTH_ASSISTANT_LOG_LEVEL` / `HEALTH_ASSISTANT_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Log filter, wins over the configured level

use anyhow::Context;
use clap::Parser;
use health_assistant::api::{serve, AppState};
use health_assistant::config::{generate_default_config, Config, LoadedConfig, LoggingConfig};
use health_assistant::store;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "health-assistant")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal water and vitamin tracker backed by a Supabase table")]
struct Cli {
    /// Config file (default: searched in the user config dir and ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to, overrides the config
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides the config
    #[arg(short, long)]
    port: Option<u16>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::load_default(),
    };
    let mut config = loaded.config.clone();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.logging)?;

    tracing::info!("Starting health assistant v{}", env!("CARGO_PKG_VERSION"));
    loaded.report();

    // Missing credentials are shown on the page instead of stopping the server
    let state = match store::connect(&config) {
        Ok(store) => {
            tracing::info!("Store ready: {}", store.describe());
            AppState::new(store, &config)
        }
        Err(e) => {
            tracing::error!(error = %e, "Store unavailable, serving without it");
            AppState::without_store(e.to_string(), &config)
        }
    };

    serve(state, &config.server).await?;

    tracing::info!("Health assistant stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "health_assistant={level},tower_http={level}",
            level = logging.level
        ))
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    Ok(())
}
