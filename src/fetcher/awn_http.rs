//! HTTP transport for the Ambient Weather API
//!
//! Provides one authenticated GET with:
//! - Request pacing through a shared [`RateLimiter`]
//! - Retry with bounded exponential backoff on 408, 429, 5xx and network errors
//! - Deadline and cancellation from the caller's [`FetchContext`], observed
//!   during the request, the body read and the backoff sleeps

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::awn_parser::AwnParser;
use super::context::FetchContext;
use super::rate_limit::RateLimiter;
use super::retry::{extract_error_type, RetryConfig};
use super::{FetcherError, FetcherResult};
use crate::metrics;

/// Time allowed to establish a TCP connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for every call to the remote API
#[derive(Debug, Clone)]
pub struct AwnHttpClient {
    client: Client,
    base_url: Url,
    retry: RetryConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl AwnHttpClient {
    /// Create a transport rooted at `base_url` (endpoint plus version path)
    ///
    /// # Errors
    /// [`FetcherError::TransportFailure`] if the URL is invalid or the client cannot be built
    pub fn new(
        base_url: &str,
        retry: RetryConfig,
        rate_limiter: Arc<RateLimiter>,
    ) -> FetcherResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT.min(retry.timeout))
            .timeout(retry.timeout)
            .user_agent(concat!("ambient-weather-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetcherError::TransportFailure {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Self::with_client(client, base_url, retry, rate_limiter)
    }

    /// Create a transport around an existing reqwest client
    ///
    /// # Errors
    /// [`FetcherError::TransportFailure`] if the URL is invalid
    pub fn with_client(
        client: Client,
        base_url: &str,
        retry: RetryConfig,
        rate_limiter: Arc<RateLimiter>,
    ) -> FetcherResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| FetcherError::TransportFailure {
            status: None,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetcherError::TransportFailure {
                status: None,
                message: format!("base URL '{base_url}' cannot carry a path"),
            });
        }

        Ok(Self {
            client,
            base_url,
            retry,
            rate_limiter,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Retry settings in effect
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Build the URL of `segments` below the base URL, escaping each segment
    pub fn endpoint_url(&self, segments: &[&str]) -> FetcherResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetcherError::TransportFailure {
                status: None,
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute a GET and return the decoded JSON body
    ///
    /// `label` names the endpoint in logs and metrics.
    ///
    /// # Errors
    /// - Context errors when the deadline passes or the context is cancelled
    /// - The mapped remote error for a non-retryable 4xx with an error-shaped body
    /// - [`FetcherError::TransportFailure`] once retries are exhausted
    /// - [`FetcherError::ParseError`] when a successful body is not JSON
    pub async fn get(
        &self,
        ctx: &FetchContext,
        url: Url,
        label: &'static str,
        params: &[(&'static str, String)],
    ) -> FetcherResult<Value> {
        ctx.run(async {
            self.rate_limiter
                .acquire()
                .await
                .map_err(|e| FetcherError::TransportFailure {
                    status: None,
                    message: e.to_string(),
                })
        })
        .await?;

        debug!(endpoint = label, path = url.path(), "Making GET request");

        self.request_with_retry(ctx, &url, label, params).await
    }

    async fn request_with_retry(
        &self,
        ctx: &FetchContext,
        url: &Url,
        label: &'static str,
        params: &[(&'static str, String)],
    ) -> FetcherResult<Value> {
        let max_attempts = self.retry.max_attempts();
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let backoff = self.retry.backoff(attempt - 1);
                debug!("Retrying after {:?}", backoff);
                ctx.sleep(backoff).await?;
            }

            let started = Instant::now();
            let sent = ctx
                .run(async { Ok(self.client.get(url.clone()).query(params).send().await) })
                .await?;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    metrics::record_request(label, None, started.elapsed());
                    let error_type = extract_error_type(None, Some(&e));
                    warn!(
                        "{} on attempt {}/{}: {}",
                        error_type.description(),
                        attempt + 1,
                        max_attempts,
                        e
                    );
                    metrics::record_retry(error_type.description());
                    last_error = Some(FetcherError::TransportFailure {
                        status: None,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let status = response.status();
            metrics::record_request(label, Some(status.as_u16()), started.elapsed());

            if status.is_success() {
                let body = ctx.run(async { Ok(response.json::<Value>().await) }).await?;
                return body.map_err(|e| {
                    FetcherError::ParseError(format!("failed to decode response body: {e}"))
                });
            }

            let error_type = extract_error_type(Some(status), None);
            let text = read_text(ctx, response).await?;

            if !error_type.is_retryable() {
                if let Some(remote) = serde_json::from_str::<Value>(&text)
                    .ok()
                    .as_ref()
                    .and_then(AwnParser::remote_error)
                {
                    return Err(remote);
                }
                return Err(FetcherError::TransportFailure {
                    status: Some(status.as_u16()),
                    message: non_empty(text, status.canonical_reason()),
                });
            }

            warn!(
                "{} ({}) on attempt {}/{}",
                error_type.description(),
                status,
                attempt + 1,
                max_attempts
            );
            metrics::record_retry(error_type.description());
            last_error = Some(FetcherError::TransportFailure {
                status: Some(status.as_u16()),
                message: non_empty(text, status.canonical_reason()),
            });
        }

        Err(last_error.unwrap_or_else(|| FetcherError::TransportFailure {
            status: None,
            message: "all retries exhausted".to_string(),
        }))
    }
}

async fn read_text(ctx: &FetchContext, response: Response) -> FetcherResult<String> {
    let text = ctx.run(async { Ok(response.text().await) }).await?;
    Ok(text.unwrap_or_default())
}

fn non_empty(text: String, fallback: Option<&str>) -> String {
    if text.trim().is_empty() {
        fallback.unwrap_or("no response body").to_string()
    } else {
        text
    }
}
