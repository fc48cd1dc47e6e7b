//! Shutdown trigger for the relay.
//!
//! The web server stops accepting deliveries once either SIGINT (Ctrl+C) or,
//! on Unix, SIGTERM arrives. In-flight webhook requests, including a pending
//! Telegram call, are allowed to finish.

use tracing::{error, info};

/// Resolve on the first SIGINT or SIGTERM; passed to the server as its
/// graceful-shutdown future.
///
/// A signal whose handler cannot be registered is logged and ignored, so
/// the remaining one can still stop the relay.
pub async fn wait_for_shutdown() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("SIGINT received, stopping relay"),
        _ = terminate => info!("SIGTERM received, stopping relay"),
    }
}
