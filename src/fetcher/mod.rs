//! Request building, transport and single-window fetching

use crate::WindowResponse;
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

pub mod awn;
pub mod awn_http;
pub mod awn_parser;
pub mod context;
pub mod rate_limit;
pub mod request;
pub mod retry;

use context::FetchContext;
use request::RequestParams;

/// Which half of the credential pair is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// The account API key
    ApiKey,
    /// The application key
    ApplicationKey,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKind::ApiKey => write!(f, "API key"),
            CredentialKind::ApplicationKey => write!(f, "application key"),
        }
    }
}

/// Fetcher errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetcherError {
    /// A credential was empty before any request was made
    #[error("{0} is missing")]
    MissingCredential(CredentialKind),

    /// A device-scoped call was made without a MAC address
    #[error("device MAC address is missing")]
    MissingDeviceAddress,

    /// Record limit outside `1..=288`
    #[error("record limit {0} is out of range, expected 1..=288")]
    InvalidLimit(u16),

    /// The context deadline expired around a call
    #[error("context timeout exceeded")]
    ContextTimeoutExceeded,

    /// The context was cancelled
    #[error("request cancelled")]
    Cancelled,

    /// Remote reported `apiKey-missing`
    #[error("remote API reports the API key is missing")]
    ApiKeyMissing,

    /// Remote reported `applicationKey-missing`
    #[error("remote API reports the application key is missing")]
    AppKeyMissing,

    /// Remote reported `macAddress-missing`
    #[error("remote API reports the MAC address is missing")]
    MacAddressMissing,

    /// Remote reported `date-invalid`
    #[error("remote API rejected the end date, expected epoch milliseconds: {message}")]
    InvalidDateFormat {
        /// Remote diagnostic, empty when none was sent
        message: String,
    },

    /// Any other remote-reported error, preserved verbatim
    #[error("remote API rejected the request: {error}{}", message_suffix(.message))]
    RemoteRejected {
        /// The `error` field of the response body
        error: String,
        /// The `message` field, when present
        message: Option<String>,
    },

    /// Retries exhausted or a non-retryable HTTP failure
    #[error("transport failure{}: {message}", status_suffix(.status))]
    TransportFailure {
        /// HTTP status of the last response, if one arrived
        status: Option<u16>,
        /// Description of the last failure
        message: String,
    },

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    ParseError(String),
}

impl FetcherError {
    /// Short stable name of the error kind, used in CLI output and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            FetcherError::MissingCredential(_) => "MissingCredential",
            FetcherError::MissingDeviceAddress => "MissingDeviceAddress",
            FetcherError::InvalidLimit(_) => "InvalidLimit",
            FetcherError::ContextTimeoutExceeded => "ContextTimeoutExceeded",
            FetcherError::Cancelled => "Cancelled",
            FetcherError::ApiKeyMissing => "APIKeyMissing",
            FetcherError::AppKeyMissing => "AppKeyMissing",
            FetcherError::MacAddressMissing => "MacAddressMissing",
            FetcherError::InvalidDateFormat { .. } => "InvalidDateFormat",
            FetcherError::RemoteRejected { .. } => "RemoteRejected",
            FetcherError::TransportFailure { .. } => "TransportFailure",
            FetcherError::ParseError(_) => "ParseError",
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// One fetched historical window
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// End-boundary checkpoint the window was requested with (ms since epoch)
    pub checkpoint: i64,
    /// Records the remote returned for the window
    pub records: WindowResponse,
}

/// Stream of windows from the streaming pagination mode.
///
/// An `Err` item is always the last one.
pub type WindowStream = Pin<Box<dyn Stream<Item = FetcherResult<Window>> + Send>>;

/// Fetches exactly one historical window
#[async_trait]
pub trait WindowFetcher: Send + Sync {
    /// Fetch the records of the window ending at `params.end_date`
    ///
    /// # Errors
    /// Any [`FetcherError`]; the pagination engine aborts on the first one.
    async fn fetch_window(
        &self,
        ctx: &FetchContext,
        params: &RequestParams,
    ) -> FetcherResult<WindowResponse>;
}
