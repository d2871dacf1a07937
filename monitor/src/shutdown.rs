//! Graceful shutdown signalling.
//!
//! A `tokio::sync::broadcast` channel fans the stop request out to the
//! monitor loop (and anything else that subscribed). Stopping is the
//! only way the loop ever terminates; no internal condition ends it.

use tokio::signal;
use tokio::sync::broadcast;

/// Broadcasts a single shutdown notification to all subscribers.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that resolves once shutdown has been requested.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Request shutdown. Idempotent; safe to call with no subscribers.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Block until SIGINT or SIGTERM arrives, then request shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
            _ = terminate => tracing::info!("received SIGTERM, shutting down"),
        }

        self.trigger();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
