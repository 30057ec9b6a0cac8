//! Shutdown signalling for the background refresh loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Shared stop flag plus wake-up for tasks waiting on it
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_requested: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("shutdown_requested", &self.is_shutdown_requested())
            .finish()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            shutdown_notify: Arc::new(Notify::new()),
        }
    }

    /// Request shutdown; repeated calls are no-ops
    pub fn request_shutdown(&self) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            info!("Shutdown requested");
            self.shutdown_notify.notify_waiters();
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown has been requested
    pub async fn wait_for_shutdown(&self) {
        let notified = self.shutdown_notify.notified();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }

    /// Request shutdown on Ctrl+C
    pub fn install_signal_handler(&self) -> tokio::task::JoinHandle<()> {
        let coordinator = self.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("Received Ctrl+C, stopping");
                    coordinator.request_shutdown();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
            }
        })
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_request_is_idempotent() {
        let coordinator = ShutdownCoordinator::new();
        assert!(!coordinator.is_shutdown_requested());

        coordinator.request_shutdown();
        coordinator.request_shutdown();
        assert!(coordinator.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_wait_after_request_returns_immediately() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.request_shutdown();

        let result = tokio::time::timeout(Duration::from_millis(50), coordinator.wait_for_shutdown()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_waiter_wakes_on_request() {
        let coordinator = ShutdownCoordinator::new();
        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        coordinator.request_shutdown();

        let result = tokio::time::timeout(Duration::from_millis(100), waiter).await;
        assert!(result.is_ok());
    }
}
