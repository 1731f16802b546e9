//! Endpoint configuration and environment lookup

use std::collections::HashMap;
use std::time::Duration;

/// Public REST endpoint of the Ambient Weather network
pub const DEFAULT_BASE_URL: &str = "https://rt.ambientweather.net";
/// API version path appended to the base URL
pub const DEFAULT_API_VERSION: &str = "/v1";
/// The remote allows one request per second per key pair
pub const DEFAULT_MIN_REQUEST_SPACING: Duration = Duration::from_secs(1);

/// Environment variable holding the account API key
pub const ENV_API_KEY: &str = "AWN_API_KEY";
/// Environment variable holding the application key
pub const ENV_APPLICATION_KEY: &str = "AWN_APPLICATION_KEY";
/// Environment variable holding the log level
pub const ENV_LOG_LEVEL: &str = "AWN_LOG_LEVEL";
/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "AWN_BASE_URL";

/// Where and how fast to talk to the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme and host, e.g. `https://rt.ambientweather.net`
    pub base_url: String,
    /// Version path, e.g. `/v1`
    pub api_version: String,
    /// Minimum time between the starts of two requests
    pub min_request_spacing: Duration,
}

impl ApiConfig {
    /// Configure an endpoint with the default one-second request spacing
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: api_version.into(),
            min_request_spacing: DEFAULT_MIN_REQUEST_SPACING,
        }
    }

    /// Override the request spacing
    pub fn with_min_request_spacing(mut self, spacing: Duration) -> Self {
        self.min_request_spacing = spacing;
        self
    }

    /// Base URL joined with the version path
    pub fn url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let version = self.api_version.trim_matches('/');
        if version.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{version}")
        }
    }
}

/// Read `key` from the environment, or `fallback` when it is unset
pub fn env_var(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Read every key in `keys`, mapping unset ones to an empty string
pub fn env_vars(keys: &[&str]) -> HashMap<String, String> {
    keys.iter()
        .map(|key| (key.to_string(), env_var(key, "")))
        .collect()
}
