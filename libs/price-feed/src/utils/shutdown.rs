//! Graceful shutdown management

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tracing::info;

/// Shutdown flag for long-running processes.
///
/// Cloned handles share one flag; triggering any of them wakes every
/// waiter immediately.
#[derive(Clone)]
pub struct ShutdownManager {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    /// Create a new manager in the running state
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Spawn a Ctrl+C handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal (Ctrl+C), shutting down gracefully...");
                this.trigger();
            }
        });
    }

    /// Flip the flag and wake every waiter
    pub fn trigger(&self) {
        self.running.store(false, Ordering::Release);
        self.wake.notify_waiters();
    }

    /// Check if the process should continue running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Sleep for a duration, returning early the moment shutdown triggers
    pub async fn interruptible_sleep(&self, duration: Duration) {
        if !self.is_running() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.wake.notified() => {}
        }
    }
}
