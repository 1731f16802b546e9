//! Request pacing
//!
//! The remote API allows one request per second per key pair. A [`RateLimiter`]
//! hands out a fixed number of permits per window; each permit stays checked
//! out until its window elapses, so at most `max_requests` requests start in
//! any window, however fast the responses come back.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::trace;

/// Request-based rate limiter shared by every call through one transport
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Allow `max_requests` request starts per `window`
    pub fn request_based(max_requests: usize, window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_requests)),
            max_requests,
            window,
        }
    }

    /// Space consecutive requests at least `interval` apart
    pub fn spacing(interval: Duration) -> Self {
        Self::request_based(1, interval)
    }

    /// Requests allowed per window
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait for a request slot.
    ///
    /// The permit is returned to the pool once the window has elapsed, not when
    /// the request completes.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| RateLimitError::AcquireError(e.to_string()))?;

        let window = self.window;
        if window.is_zero() {
            return Ok(());
        }

        trace!(window_ms = window.as_millis() as u64, "Rate limit permit acquired");
        tokio::spawn(async move {
            sleep(window).await;
            drop(permit);
        });

        Ok(())
    }
}

/// Rate limiter errors
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Failed to acquire a permit
    #[error("failed to acquire rate limit permit: {0}")]
    AcquireError(String),
}
