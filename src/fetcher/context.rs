//! Per-call deadline and cancellation
//!
//! A [`FetchContext`] travels with every fetch. Its deadline and cancel signal
//! are raced against the in-flight request, so cancelling interrupts a pending
//! HTTP call or backoff sleep rather than waiting for it to finish.

use super::{FetcherError, FetcherResult};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable cancel signal shared between a caller and its fetches
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    state: Arc<CancelState>,
}

impl CancelHandle {
    /// Create a handle that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Wakes all waiters exactly once.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until cancellation is requested. Returns immediately if already set.
    pub async fn cancelled(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Deadline and cancellation for one logical operation
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    deadline: Option<Instant>,
    cancel: CancelHandle,
}

impl FetchContext {
    /// Context without deadline and with a fresh cancel handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire the context `timeout` from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Expire the context at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Observe an externally owned cancel handle
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// The cancel handle this context observes
    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail if the context is already cancelled or expired
    ///
    /// # Errors
    /// [`FetcherError::Cancelled`] or [`FetcherError::ContextTimeoutExceeded`]
    pub fn check(&self) -> FetcherResult<()> {
        if self.cancel.is_cancelled() {
            return Err(FetcherError::Cancelled);
        }
        if self.is_expired() {
            return Err(FetcherError::ContextTimeoutExceeded);
        }
        Ok(())
    }

    /// Run `fut` bounded by this context.
    ///
    /// If the deadline has passed once `fut` completes, the result is discarded and
    /// [`FetcherError::ContextTimeoutExceeded`] is returned instead.
    ///
    /// # Errors
    /// The future's own error, [`FetcherError::Cancelled`] or
    /// [`FetcherError::ContextTimeoutExceeded`]
    pub async fn run<T, F>(&self, fut: F) -> FetcherResult<T>
    where
        F: Future<Output = FetcherResult<T>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(FetcherError::Cancelled),
            _ = deadline => return Err(FetcherError::ContextTimeoutExceeded),
            result = fut => result,
        };

        if self.is_expired() {
            return Err(FetcherError::ContextTimeoutExceeded);
        }
        result
    }

    /// Sleep for `duration` unless the context ends first
    ///
    /// # Errors
    /// [`FetcherError::Cancelled`] or [`FetcherError::ContextTimeoutExceeded`]
    pub async fn sleep(&self, duration: Duration) -> FetcherResult<()> {
        self.run(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}
