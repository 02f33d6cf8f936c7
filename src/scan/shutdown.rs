//! Cooperative shutdown flag shared between signal handlers and scans.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Process-wide cancellation request.
///
/// Cloning yields another handle to the same flag. Once requested the flag
/// stays set for the rest of the process.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownSignal {
    /// Creates a flag that is not yet set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes every task waiting in [`Self::notified`].
    pub fn request(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns true once shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Completes when shutdown is requested, immediately if it already was.
    pub async fn notified(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent request is not missed.
        notified.as_mut().enable();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_new_signal_is_not_requested() {
        assert!(!ShutdownSignal::new().is_requested());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let signal = ShutdownSignal::new();
        let handle = signal.clone();
        handle.request();
        assert!(signal.is_requested());
    }

    #[tokio::test]
    async fn test_notified_returns_immediately_when_already_requested() {
        let signal = ShutdownSignal::new();
        signal.request();
        tokio::time::timeout(Duration::from_millis(100), signal.notified())
            .await
            .unwrap_or_else(|_| panic!("notified should not block once requested"));
    }

    #[tokio::test]
    async fn test_notified_wakes_waiter() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.notified().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.request();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap_or_else(|_| panic!("waiter should wake on request"))
            .unwrap_or_else(|e| panic!("waiter task failed: {e}"));
    }
}
