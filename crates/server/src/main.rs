//! Pallet server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use pallet_core::config::AppConfig;
use pallet_server::{create_router, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pallet - a hierarchical package repository server
#[derive(Parser, Debug)]
#[command(name = "palletd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "PALLET_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Pallet v{}", env!("CARGO_PKG_VERSION"));

    // Config file is optional; env vars can provide or override everything.
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("PALLET_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    pallet_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let store = pallet_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;

    // Verify store connectivity before accepting requests, so the server
    // never reports ready over an unreachable tree.
    store
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = store.backend_name(), "Storage backend initialized");

    if let Some(key_path) = &config.signing.key_path {
        tracing::info!(key_path = %key_path.display(), "Using fixed signing key");
    }

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let state = AppState::new(config, store);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
