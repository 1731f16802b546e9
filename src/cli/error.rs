//! CLI error types and conversions

use crate::epoch::DateError;
use crate::fetcher::FetcherError;
use crate::metrics::MetricsError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Start date could not be converted
    #[error("date error: {0}")]
    Date(#[from] DateError),

    /// Request building, transport or remote error
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Metrics exporter could not be installed
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Records could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// Short stable name printed ahead of the message on failure
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Date(DateError::MalformedDate { .. }) => "MalformedDate",
            CliError::Date(DateError::RegexEngineFailure(_)) => "RegexEngineFailure",
            CliError::Fetcher(e) => e.kind(),
            CliError::Metrics(_) => "Metrics",
            CliError::Io(_) => "Io",
            CliError::Serialization(_) => "Serialization",
        }
    }
}
