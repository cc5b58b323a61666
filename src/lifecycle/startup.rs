//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Bind the listener and begin accepting traffic
//! - Tie OS signals to reload and graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, load_from_env, ConfigError, ConfigWatcher, GatewayConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals::{spawn_reload_on_hangup, wait_for_shutdown_signal};
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build provider client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("config watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Resolve the configuration: the file when given, otherwise defaults.
/// Environment overrides apply either way.
pub fn resolve_config(path: Option<&PathBuf>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => load_from_env(),
    }
}

/// Run the gateway until a shutdown signal arrives.
pub async fn run(config_path: Option<PathBuf>) -> Result<(), StartupError> {
    let config = resolve_config(config_path.as_ref())?;

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "location-gateway starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        provider = %config.provider.base_url,
        api_key_configured = config.provider.api_key().is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.provider.api_key().is_none() {
        tracing::warn!("No provider API key configured; gateway calls will fail with 500");
    }

    if config.observability.metrics_enabled {
        // Address syntax is checked during validation.
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr)?;
        }
    }

    // Without a file there is nothing to reload; the sender is dropped and
    // the server's update loop ends immediately.
    let (config_updates, _watcher) = match &config_path {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            spawn_reload_on_hangup(path.clone(), watcher.sender());
            (rx, Some(watcher.run()?))
        }
        None => {
            let (_, rx) = mpsc::unbounded_channel();
            (rx, None)
        }
    };

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, config_updates, server_shutdown));

    wait_for_shutdown_signal().await;
    shutdown.trigger();

    match server_task.await {
        Ok(result) => result.map_err(StartupError::Serve)?,
        Err(e) => tracing::error!(error = %e, "Server task failed"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
