//! Shutdown coordination for the watcher.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait up to `grace` for a task to finish after shutdown was triggered, then abort it.
///
/// Returns true if the task finished on its own.
pub async fn drain(name: &str, handle: JoinHandle<()>, grace: Duration) -> bool {
    let abort = handle.abort_handle();
    match tokio::time::timeout(grace, handle).await {
        Ok(Ok(())) => {
            tracing::debug!(task = %name, "Task finished");
            true
        }
        Ok(Err(e)) => {
            tracing::error!(task = %name, error = %e, "Task ended abnormally");
            true
        }
        Err(_) => {
            tracing::warn!(
                task = %name,
                grace_ms = grace.as_millis() as u64,
                "Task did not stop within grace period, aborting"
            );
            abort.abort();
            false
        }
    }
}
