//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl-C) or SIGTERM
//! - Translate SIGHUP into a configuration reload
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::config::{load_config, GatewayConfig};

/// Resolve once the process is asked to stop.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Re-read `path` on every SIGHUP and forward valid configurations.
///
/// Invalid files are logged and skipped; the running configuration stays.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(path: PathBuf, tx: mpsc::UnboundedSender<GatewayConfig>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGHUP");
                return;
            }
        };

        while hangups.recv().await.is_some() {
            tracing::info!(path = ?path, "SIGHUP received, reloading configuration");
            match load_config(&path) {
                Ok(config) => {
                    if tx.send(config).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Reload failed, keeping current configuration"),
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_on_hangup(_path: PathBuf, _tx: mpsc::UnboundedSender<GatewayConfig>) {}
