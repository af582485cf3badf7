//! Build cancellation on interrupt.
//!
//! The receiver is handed to [`BuildPipeline::run`](crate::commands::build::BuildPipeline::run),
//! which kills a running executor or abandons artifact reporting when the
//! message arrives.

use tokio::sync::broadcast;
use tracing::{info, warn};

/// Subscribe to build cancellation, triggered by SIGINT or SIGTERM.
pub fn cancellation_signal() -> broadcast::Receiver<()> {
    let (tx, rx) = broadcast::channel(1);

    tokio::spawn(async move {
        let signal = wait_for_interrupt().await;
        info!(signal, "Interrupted, cancelling build");
        let _ = tx.send(());
    });

    rx
}

/// Resolves with the name of the first interrupt received.
///
/// A handler that cannot be installed is logged and never fires.
async fn wait_for_interrupt() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
