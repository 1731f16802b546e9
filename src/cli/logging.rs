//! Tracing setup for the binary
//!
//! The filter comes from `RUST_LOG`, else from `AWN_LOG_LEVEL` applied to this
//! crate, else `ambient_weather_client=info`. Blank or unparsable values are
//! skipped. `LOG_FORMAT=json` switches to JSON lines. Logs go to stderr.

use tracing_subscriber::EnvFilter;

use crate::config::ENV_LOG_LEVEL;

/// Filter used when neither `RUST_LOG` nor `AWN_LOG_LEVEL` gives a usable value
pub const DEFAULT_LOG_DIRECTIVE: &str = "ambient_weather_client=info";

/// Environment variable selecting the output format
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Resolve the filter directives from the `RUST_LOG` and `AWN_LOG_LEVEL` values
pub fn log_directives(rust_log: Option<&str>, level: Option<&str>) -> String {
    if let Some(rust_log) = non_blank(rust_log) {
        if EnvFilter::try_new(rust_log).is_ok() {
            return rust_log.to_string();
        }
    }

    if let Some(level) = non_blank(level) {
        if LEVELS.iter().any(|known| known.eq_ignore_ascii_case(level)) {
            return format!("ambient_weather_client={}", level.to_ascii_lowercase());
        }
    }

    DEFAULT_LOG_DIRECTIVE.to_string()
}

/// Build the filter from the `RUST_LOG` and `AWN_LOG_LEVEL` values
pub fn log_filter(rust_log: Option<&str>, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_new(log_directives(rust_log, level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// Whether a `LOG_FORMAT` value selects JSON output
pub fn json_format(log_format: Option<&str>) -> bool {
    log_format.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

/// Install the global subscriber from the process environment
pub fn init_tracing() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let level = std::env::var(ENV_LOG_LEVEL).ok();
    let filter = log_filter(rust_log.as_deref(), level.as_deref());

    if json_format(std::env::var(ENV_LOG_FORMAT).ok().as_deref()) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
