//! Tipper-room snapshot cache (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                 TIPPER CACHE                      │
//!                       │                                                   │
//!                       │  ┌────────────┐   probe    ┌──────────────────┐   │
//!                       │  │ refresher  │───────────▶│ connectivity     │───┼──▶ probe host
//!                       │  │ (30s loop) │            │ monitor          │   │
//!                       │  └─────┬──────┘            └──────────────────┘   │
//!                       │        │ fetch                                    │
//!                       │        ▼                                          │
//!                       │  ┌────────────┐  token/data  ┌────────────────┐   │
//!                       │  │ upstream   │─────────────▶│ retrying       │───┼──▶ upstream API
//!                       │  │ client     │              │ transport      │   │
//!                       │  └─────┬──────┘              └────────────────┘   │
//!                       │        │ write            health ▲               │
//!                       │        ▼                          │               │
//!     GET /api/records  │  ┌────────────┐   read    ┌──────┴─────┐          │
//!     ──────────────────┼─▶│ snapshot   │──────────▶│ freshness  │          │
//!                       │  │ service    │           │ cache      │          │
//!                       │  └────────────┘           └────────────┘          │
//!                       └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use tipper_cache::config::loader::{default_config, load_config};
use tipper_cache::lifecycle::{self, Shutdown};
use tipper_cache::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "tipper-cache")]
#[command(about = "Caching front for the warehouse tipper-room API", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `http.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };
    if let Some(bind) = cli.bind {
        config.http.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("tipper-cache v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.http.bind_address,
        max_age_secs = config.cache.max_age_secs,
        fetch_interval_secs = config.refresher.fetch_interval_secs,
        config_file = ?cli.config,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown.clone().trigger_on_signal());

    lifecycle::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
