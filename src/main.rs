//! Gateway admin service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Admin client ──▶ admin router ──▶ handlers
//!                                          │
//!                       ┌──────────────────┼───────────────────┐
//!                       ▼                  ▼                   ▼
//!                  openapi::Projector  bundle::export    bundle::import
//!                       │                  │                   │
//!                       └──── resolve ─────┴── variables ──────┘
//!                                          │
//!                                          ▼
//!                                   store (in-memory)
//!
//!     gateway-admin.toml ──▶ config watcher ──▶ ArcSwap in AppState
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gateway_admin::admin::setup_admin_router;
use gateway_admin::config::{load_config, AdminServiceConfig, ConfigWatcher};
use gateway_admin::lifecycle::{build_state, signals, Shutdown};
use gateway_admin::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "gateway-admin")]
#[command(about = "Admin service for gateway configuration export and import", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_ADMIN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AdminServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gateway-admin starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.admin.request_timeout_secs,
        auth_enabled = !config.admin.api_key.is_empty(),
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

    let bind_address = config.listener.bind_address.clone();
    let state = build_state(config)?;

    // Keep the watcher handle alive for the lifetime of the server.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            let reload_state = state.clone();
            tokio::spawn(async move {
                while let Some(next) = updates.recv().await {
                    reload_state.reload(next);
                    tracing::info!("Configuration reloaded");
                }
            });
            Some(handle)
        }
        None => None,
    };

    let shutdown = Shutdown::new();
    tokio::spawn(signals::listen(shutdown.clone()));

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let app = setup_admin_router(state);
    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_shutdown.wait().await })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
