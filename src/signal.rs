// src/signal.rs

//! Signal handling for graceful shutdown.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Wait for SIGINT or SIGTERM (Ctrl-C elsewhere).
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(int), Ok(term)) => (int, term),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "failed to install signal handlers; shutdown by signal disabled");
                return std::future::pending().await;
            }
        };

    tokio::select! {
        _ = sigint.recv() => {
            info!(signal = "SIGINT", "signal received");
        }
        _ = sigterm.recv() => {
            info!(signal = "SIGTERM", "signal received");
        }
    }
}

#[cfg(not(unix))]
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; shutdown by signal disabled");
        return std::future::pending().await;
    }
    info!(signal = "Ctrl+C", "signal received");
}

/// Cancel `token` when a shutdown signal arrives.
pub fn cancel_on_shutdown(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = shutdown_signal() => token.cancel(),
        }
    })
}
