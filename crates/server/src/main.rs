//! Locker server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use locker_core::AppConfig;
use locker_server::{AppState, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Locker - a password-gated file locker over object storage
#[derive(Parser, Debug)]
#[command(name = "lockerd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "LOCKER_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Startup banner
    tracing::info!("Locker v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    // Check for LOCKER_ environment variables (excluding LOCKER_CONFIG which is just the path)
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("LOCKER_") && key != "LOCKER_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: lockerd --config /path/to/config.toml\n  \
             2. Environment variables: LOCKER_SERVER__BIND=0.0.0.0:8080 \
             LOCKER_AUTH__PASSWORD=your-password lockerd\n\n\
             See config/server.example.toml for example configuration.\n\
             Set LOCKER_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("LOCKER_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Register Prometheus metrics
    locker_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    // Initialize storage backend
    let storage = locker_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    tracing::info!("Storage backend initialized");

    // Verify storage connectivity before accepting requests.
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!("Storage backend connectivity verified");

    // Initialize the session and rate-limit store
    let kv = locker_kv::from_config(&config.kv)
        .await
        .context("failed to initialize kv store")?;
    kv.health_check().await.context("kv health check failed")?;
    tracing::info!("KV store initialized");

    // Sweep expired sessions and counters in the background
    let _purge_handle = locker_kv::spawn_purge_task(kv.clone(), config.kv.purge_interval());
    tracing::info!(
        interval_secs = config.kv.purge_interval().as_secs(),
        "KV purge task spawned"
    );

    // Create application state
    let state = AppState::new(config.clone(), storage, kv);

    // Create router
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
