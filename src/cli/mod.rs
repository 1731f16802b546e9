//! `awn` command line
//!
//! Global flags configure the endpoint, credentials and transport; each
//! subcommand builds its own client from them.

pub mod devices;
pub mod error;
pub mod history;
pub mod logging;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::fetcher::awn::AwnClient;
use crate::fetcher::retry::RetryConfig;

pub use devices::DevicesArgs;
pub use error::CliError;
pub use history::HistoryArgs;

/// Ambient Weather network CLI
#[derive(Parser, Debug)]
#[command(name = "awn")]
#[command(about = "Fetch weather station data from the Ambient Weather network", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Account API key
    #[arg(long, global = true, env = "AWN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Application key
    #[arg(long, global = true, env = "AWN_APPLICATION_KEY", hide_env_values = true)]
    pub app_key: Option<String>,

    /// API base URL
    #[arg(
        long,
        global = true,
        env = "AWN_BASE_URL",
        default_value = "https://rt.ambientweather.net"
    )]
    pub base_url: String,

    /// API version path
    #[arg(long, global = true, default_value = "/v1")]
    pub api_version: String,

    /// Retries after a failed request (range: 0-10)
    #[arg(
        long,
        global = true,
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(0..=10)
    )]
    pub max_retries: u32,

    /// Timeout of a single HTTP request in seconds
    #[arg(
        long,
        global = true,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..=600)
    )]
    pub timeout_secs: u64,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9000)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List account devices with their latest observation
    Devices(DevicesArgs),

    /// Download a device's history from a start date up to now
    History(HistoryArgs),
}

impl Cli {
    /// API key, empty when not given
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Application key, empty when not given
    pub fn app_key(&self) -> &str {
        self.app_key.as_deref().unwrap_or_default()
    }

    /// Endpoint configuration from the global flags
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url, &self.api_version)
    }

    /// Retry settings from the global flags
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            retry_count: self.max_retries,
            timeout: Duration::from_secs(self.timeout_secs),
            ..RetryConfig::default()
        }
    }

    /// Build the API client
    ///
    /// # Errors
    /// [`CliError::Fetcher`] if the base URL is invalid
    pub fn client(&self) -> Result<AwnClient, CliError> {
        Ok(AwnClient::new(self.api_config(), self.retry_config())?)
    }
}
