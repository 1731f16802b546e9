//! Retry configuration and failure classification for the HTTP transport

use reqwest::{Error as ReqwestError, StatusCode};
use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default lower bound of the backoff between attempts
pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_secs(5);
/// Default upper bound of the backoff between attempts
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(15);
/// Default overall timeout of one HTTP request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport retry and timeout settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub retry_count: u32,
    /// Lower bound of the backoff
    pub min_backoff: Duration,
    /// Upper bound of the backoff
    pub max_backoff: Duration,
    /// Overall timeout of one HTTP request
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            min_backoff: DEFAULT_MIN_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryConfig {
    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.retry_count + 1
    }

    /// Backoff before retry number `retry` (0-based): `min * 2^retry`, clamped to `[min, max]`
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.min_backoff
            .saturating_mul(factor)
            .clamp(self.min_backoff, self.max_backoff.max(self.min_backoff))
    }
}

/// Classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// HTTP 408
    RequestTimeout,
    /// HTTP 429
    RateLimit,
    /// HTTP 5xx
    ServerError(u16),
    /// Other HTTP 4xx
    ClientError(u16),
    /// The request timed out locally
    NetworkTimeout,
    /// Connection refused, DNS failure and the like
    NetworkOffline,
    /// Anything else
    NetworkGeneric,
}

impl RetryErrorType {
    /// Label used in logs and metrics
    pub fn description(&self) -> &'static str {
        match self {
            Self::RequestTimeout => "request timeout",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::ClientError(code) => match code {
                401 | 403 => "authentication failed",
                404 => "resource not found",
                _ => "client error",
            },
            Self::NetworkTimeout => "network timeout",
            Self::NetworkOffline => "connection failed",
            Self::NetworkGeneric => "network error",
        }
    }

    /// 408, 429, 5xx and network-level failures are retried
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RetryErrorType::ClientError(_))
    }
}

/// Classify a failed attempt from its HTTP status or reqwest error
pub fn extract_error_type(
    status: Option<StatusCode>,
    err: Option<&ReqwestError>,
) -> RetryErrorType {
    if let Some(status) = status {
        match status.as_u16() {
            408 => return RetryErrorType::RequestTimeout,
            429 => return RetryErrorType::RateLimit,
            _ => {}
        }

        if status.is_server_error() {
            return RetryErrorType::ServerError(status.as_u16());
        }

        if status.is_client_error() {
            return RetryErrorType::ClientError(status.as_u16());
        }
    }

    if let Some(err) = err {
        if err.is_timeout() {
            return RetryErrorType::NetworkTimeout;
        }

        if err.is_connect() {
            return RetryErrorType::NetworkOffline;
        }
    }

    RetryErrorType::NetworkGeneric
}
