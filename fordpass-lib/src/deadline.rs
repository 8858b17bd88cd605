//! Deadline and cancellation for a whole client operation
//!
//! A [`Deadline`] bounds every blocking step of an operation: HTTP requests, the
//! token lock and the wait between status polls. Racing a future through
//! [`Deadline::guard`] returns as soon as the deadline passes or the paired
//! [`CancelHandle`] fires, dropping the in-flight future.

use crate::error::{FordPassError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Point in time by which an operation must finish, optionally cancellable
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    cancel: Option<watch::Receiver<bool>>,
}

/// Triggers cancellation of every [`Deadline`] cloned from its pair
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Deadline {
    /// Deadline `timeout` from now, not cancellable
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            cancel: None,
        }
    }

    /// Deadline `timeout` from now, plus a handle for explicit cancellation
    pub fn cancellable(timeout: Duration) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let deadline = Self {
            at: Instant::now() + timeout,
            cancel: Some(rx),
        };
        (deadline, CancelHandle { tx })
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run `fut` unless the deadline passes or cancellation fires first
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output> {
        if self.is_cancelled() {
            return Err(FordPassError::Cancelled);
        }

        let mut cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = wait_cancelled(&mut cancel) => Err(FordPassError::Cancelled),
            _ = tokio::time::sleep_until(self.at) => Err(FordPassError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }

    /// Wait for `interval`, or less if the deadline or cancellation comes first
    pub async fn sleep(&self, interval: Duration) -> Result<()> {
        self.guard(tokio::time::sleep(interval)).await
    }
}

async fn wait_cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
            return;
        }
    }
    // No handle, or the handle was dropped without cancelling
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_guard_passes_through_fast_future() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let value = deadline.guard(async { 42 }).await.expect("completes");
        assert_eq!(value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_cut_short_by_deadline() {
        let start = Instant::now();
        let deadline = Deadline::after(Duration::from_secs(3));

        let err = deadline.sleep(Duration::from_secs(60)).await.unwrap_err();

        assert!(matches!(err, FordPassError::DeadlineExceeded));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unblocks_wait() {
        let start = Instant::now();
        let (deadline, handle) = Deadline::cancellable(Duration::from_secs(60));

        let waiter = tokio::spawn({
            let deadline = deadline.clone();
            async move { deadline.sleep(Duration::from_secs(30)).await }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();

        let result = waiter.await.expect("join waiter");
        assert!(matches!(result, Err(FordPassError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(deadline.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_skips_future() {
        let (deadline, handle) = Deadline::cancellable(Duration::from_secs(60));
        handle.cancel();

        let result = deadline.guard(async { "ran" }).await;
        assert!(matches!(result, Err(FordPassError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_does_not_cancel() {
        let (deadline, handle) = Deadline::cancellable(Duration::from_secs(10));
        drop(handle);

        deadline
            .sleep(Duration::from_secs(2))
            .await
            .expect("sleep completes normally");
        let remaining = deadline.remaining();
        assert!(remaining <= Duration::from_secs(8));
        assert!(remaining > Duration::from_secs(7));
    }
}
