//! Signal handling for graceful shutdown

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::debug;

/// Resolves when SIGTERM or SIGINT arrives
pub struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

impl ShutdownSignal {
    /// Register the signal handlers
    pub fn new() -> Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?,
            sigint: signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?,
        })
    }

    /// Wait for a shutdown signal
    pub async fn wait(&mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = self.sigint.recv() => {
                debug!("received SIGINT");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_pending_without_signal() {
        let mut shutdown = ShutdownSignal::new().unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(20), shutdown.wait()).await;
        assert!(waited.is_err());
    }
}
