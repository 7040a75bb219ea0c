//! Cancellation and graceful shutdown

use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Owns the cancellation token shared by every wait in a process
pub struct ShutdownManager {
    token: CancellationToken,
}

impl ShutdownManager {
    /// Create a new shutdown manager with running state
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Spawn a Ctrl+C signal handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("");
                info!("Received shutdown signal (Ctrl+C)");
                info!("Cancelling in-flight operations...");
                token.cancel();
            }
        });
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Token to thread through long-running operations
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Sleep for a duration, but wake early if shutdown is triggered
    pub async fn interruptible_sleep(&self, duration: Duration) -> bool {
        cancellable_sleep(duration, &self.token).await
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep unless cancelled first
///
/// Returns `true` when the full duration elapsed, `false` when cancelled.
pub async fn cancellable_sleep(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
