//! Ambient Weather API client
//!
//! Combines the transport, the request builder and the response parser into the
//! two remote operations: the device listing (latest snapshot) and the
//! single-window history fetch. Historical pagination over many windows is
//! delegated to [`crate::pagination::HistoricalPaginator`].

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::awn_http::AwnHttpClient;
use super::awn_parser::AwnParser;
use super::context::FetchContext;
use super::rate_limit::RateLimiter;
use super::request::{credential_query, FunctionData, RequestParams};
use super::retry::RetryConfig;
use super::{FetcherResult, WindowFetcher, WindowStream};
use crate::config::ApiConfig;
use crate::pagination::HistoricalPaginator;
use crate::{DeviceRecord, DeviceSummary, WindowResponse};

/// Device listing and history resource
const DEVICES_ENDPOINT: &str = "devices";

/// Client for the Ambient Weather REST API
#[derive(Debug, Clone)]
pub struct AwnClient {
    http: Arc<AwnHttpClient>,
}

impl AwnClient {
    /// Create a client for the configured endpoint
    ///
    /// # Errors
    /// [`super::FetcherError::TransportFailure`] if the endpoint URL is invalid
    pub fn new(config: ApiConfig, retry: RetryConfig) -> FetcherResult<Self> {
        let rate_limiter = Arc::new(RateLimiter::spacing(config.min_request_spacing));
        let http = AwnHttpClient::new(&config.url(), retry, rate_limiter)?;
        Ok(Self::from_transport(http))
    }

    /// Create a client around an existing transport
    pub fn from_transport(http: AwnHttpClient) -> Self {
        Self {
            http: Arc::new(http),
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> &AwnHttpClient {
        &self.http
    }

    /// Fetch every device on the account together with its latest observation
    ///
    /// # Errors
    /// - [`super::FetcherError::MissingCredential`] before any request for an empty key
    /// - Context, transport and remote errors as for a window fetch
    pub async fn fetch_latest(
        &self,
        ctx: &FetchContext,
        api_key: &str,
        application_key: &str,
    ) -> FetcherResult<Vec<DeviceSummary>> {
        let params = credential_query(api_key, application_key)?;
        let url = self.http.endpoint_url(&[DEVICES_ENDPOINT])?;

        let body = self.http.get(ctx, url, "devices", &params).await?;
        let devices = AwnParser::parse_devices(body)?;

        info!(devices = devices.len(), "Fetched device list");
        Ok(devices)
    }

    /// Collect all records from the session's start checkpoint up to now
    ///
    /// # Errors
    /// The first window failure; no partial results are returned.
    pub async fn history(
        &self,
        ctx: &FetchContext,
        data: &FunctionData,
    ) -> FetcherResult<Vec<DeviceRecord>> {
        HistoricalPaginator::new(self.clone()).collect(ctx, data).await
    }

    /// Stream the session's windows, oldest first
    ///
    /// `ready` is signalled once the background producer is running.
    ///
    /// # Errors
    /// Request-building errors before the producer is started
    pub fn history_stream(
        &self,
        ctx: &FetchContext,
        data: &FunctionData,
        ready: oneshot::Sender<()>,
    ) -> FetcherResult<WindowStream> {
        HistoricalPaginator::new(self.clone()).stream(ctx, data, ready)
    }
}

#[async_trait]
impl WindowFetcher for AwnClient {
    async fn fetch_window(
        &self,
        ctx: &FetchContext,
        params: &RequestParams,
    ) -> FetcherResult<WindowResponse> {
        let url = self
            .http
            .endpoint_url(&[DEVICES_ENDPOINT, params.mac_address()])?;

        let body = self.http.get(ctx, url, "device_data", &params.query()).await?;
        let records = AwnParser::parse_window(body)?;

        debug!(
            end_date = params.end_date(),
            records = records.len(),
            "Fetched window"
        );
        Ok(records)
    }
}
