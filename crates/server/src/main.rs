//! cfipd server binary.

use anyhow::{Context, Result};
use cfipd_core::config::AppConfig;
use cfipd_server::cleanup::spawn_cleanup_task;
use cfipd_server::session::spawn_prune_task;
use cfipd_server::{AppState, create_router};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// cfipd - single-slot CSV/TXT upload service
#[derive(Parser, Debug)]
#[command(name = "cfipd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "CFIPD_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

/// Build the configuration from an optional TOML file and `CFIPD_` env vars.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();

    // The file is optional: defaults and env vars can provide everything.
    if std::path::Path::new(path).exists() {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::info!(config_path = %path, "No config file found, using defaults and environment");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("CFIPD_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    Ok(config)
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
    tracing::info!("cfipd v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    // Register Prometheus metrics
    cfipd_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    // Initialize slot storage
    let slot = cfipd_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    slot.health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(
        backend = slot.backend().backend_name(),
        path = %config.storage.path.display(),
        "Slot storage initialized"
    );

    // Initialize credential and API key stores
    let metadata = cfipd_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize credential stores")?;
    tracing::info!(
        users = %config.metadata.users_path.display(),
        api_keys = %config.metadata.api_keys_path.display(),
        "Credential stores initialized"
    );

    if config.auth.protect_open_routes {
        tracing::info!("API key issuance and clear-files require a session or API key");
    } else {
        tracing::warn!("API key issuance and clear-files are open to unauthenticated callers");
    }

    // Create application state
    let state = AppState::new(config.clone(), slot, metadata);

    spawn_prune_task(state.sessions.clone(), config.session.prune_interval());
    tracing::info!(
        interval_secs = config.session.prune_interval_secs,
        "Session prune task spawned"
    );

    if config.cleanup.enabled {
        spawn_cleanup_task(
            state.slot.clone(),
            config.cleanup.interval(),
            config.cleanup.max_age(),
        );
        tracing::info!(
            interval_secs = config.cleanup.interval_secs,
            max_age_secs = config.cleanup.max_age_secs,
            "Expiry sweep task spawned"
        );
    } else {
        tracing::info!("Expiry sweep disabled");
    }

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
