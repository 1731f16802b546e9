//! Request and pagination metrics
//!
//! Metrics are recorded through the `metrics` facade and are no-ops until a
//! recorder is installed. [`init_metrics`] installs a Prometheus exporter with
//! a scrape endpoint; the CLI calls it when `--metrics-addr` is given.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

static METRICS_ADDR: OnceCell<SocketAddr> = OnceCell::new();

/// Metrics setup errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The exporter could not be installed
    #[error("failed to install Prometheus exporter: {0}")]
    Install(String),
}

/// Install the Prometheus exporter listening on `addr`.
///
/// Idempotent: later calls are ignored once an exporter is running.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if let Some(existing) = METRICS_ADDR.get() {
        debug!(%existing, "Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    describe_counter!(
        "awn_http_requests_total",
        Unit::Count,
        "HTTP requests made to the Ambient Weather API"
    );
    describe_counter!(
        "awn_http_retries_total",
        Unit::Count,
        "Retried HTTP attempts"
    );
    describe_histogram!(
        "awn_http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration"
    );
    describe_counter!(
        "awn_windows_fetched_total",
        Unit::Count,
        "Historical windows fetched"
    );
    describe_counter!(
        "awn_records_fetched_total",
        Unit::Count,
        "Device records received in historical windows"
    );
    describe_counter!(
        "awn_pagination_failures_total",
        Unit::Count,
        "Pagination sessions aborted by a window failure"
    );

    let _ = METRICS_ADDR.set(addr);
    info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Whether [`init_metrics`] has succeeded
pub fn is_initialized() -> bool {
    METRICS_ADDR.get().is_some()
}

/// Record one completed HTTP attempt
pub fn record_request(endpoint: &'static str, status: Option<u16>, duration: Duration) {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    counter!("awn_http_requests_total", "endpoint" => endpoint, "status" => status).increment(1);
    histogram!("awn_http_request_duration_seconds", "endpoint" => endpoint)
        .record(duration.as_secs_f64());
}

/// Record a retry caused by `reason`
pub fn record_retry(reason: &'static str) {
    counter!("awn_http_retries_total", "reason" => reason).increment(1);
}

/// Record one fetched window and its record count
pub fn record_window(records: usize) {
    counter!("awn_windows_fetched_total").increment(1);
    counter!("awn_records_fetched_total").increment(records as u64);
}

/// Record a pagination session aborted with error kind `kind`
pub fn record_pagination_failure(kind: &'static str) {
    counter!("awn_pagination_failures_total", "kind" => kind).increment(1);
}
