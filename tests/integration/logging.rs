//! Integration tests for logging and tracing setup

use ambient_weather_client::cli::logging::{
    json_format, log_directives, log_filter, DEFAULT_LOG_DIRECTIVE,
};
use tracing::{debug, info, warn};

#[test]
fn test_subscriber_with_resolved_filter() {
    // try_init: another test may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(None, Some("debug")))
        .with_test_writer()
        .try_init();

    info!(
        mac = "00:11:22:33:44:55",
        start = 1_388_534_400_000i64,
        "Starting historical pagination"
    );
    debug!(checkpoint = 1_388_534_400_000i64, "Fetching window");
    warn!("service unavailable (503 Service Unavailable) on attempt 1/4");
}

#[test]
fn test_json_subscriber_from_log_format() {
    assert!(json_format(Some("json")));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(log_filter(None, None))
        .with_test_writer()
        .try_init();

    info!(windows = 3, records = 864, "Historical pagination complete");
}

#[test]
fn test_resolution_order() {
    let rust_log = "ambient_weather_client::fetcher=debug,ambient_weather_client=info";

    assert_eq!(log_directives(Some(rust_log), Some("error")), rust_log);
    assert_eq!(
        log_directives(None, Some("trace")),
        "ambient_weather_client=trace"
    );
    assert_eq!(
        log_directives(Some(" "), Some("verbose")),
        DEFAULT_LOG_DIRECTIVE
    );
}
