//! Signal handling for the API server.
//!
//! Shutdown runs in two phases: the listener drains in-flight HTTP
//! requests, while a cleanup task closes the realtime WebSocket
//! connections and drops the MongoDB client under a deadline. The
//! coordinator fans the termination signal out so both phases start
//! together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;

/// Fans a termination signal out to the serve loop and the cleanup task.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: broadcast::Sender<()>,
    initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Receiver that resolves once shutdown begins.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.initiated.load(Ordering::Relaxed)
    }

    /// Mark shutdown as started and wake all subscribers. Idempotent.
    pub fn shutdown(&self) {
        if self
            .initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutting down task API");
            let _ = self.tx.send(());
        }
    }

    /// Block until SIGINT or SIGTERM, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        termination_signal().await;
        self.shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve when the process receives SIGINT (Ctrl+C) or SIGTERM.
async fn termination_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, draining requests"),
        _ = terminate => info!("Received SIGTERM, draining requests"),
    }
}

/// Plain signal future for `axum::serve(...).with_graceful_shutdown`.
///
/// Drains in-flight requests but runs no cleanup phase; servers that
/// hold realtime connections or a database client should go through
/// `create_production_app` instead.
pub async fn shutdown_signal() {
    termination_signal().await;
}

/// Shutdown future for axum that also listens for signals.
///
/// Used internally by `create_production_app`; resolving it triggers
/// the coordinator so cleanup subscribers wake at the same time.
pub(crate) async fn coordinated_shutdown(coordinator: ShutdownCoordinator) {
    coordinator.wait_for_signal().await;
}
