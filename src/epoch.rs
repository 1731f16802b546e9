//! Calendar date to epoch conversion
//!
//! The only accepted external date form is `YYYY-MM-DD`, interpreted at UTC midnight.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Shape every date must have before a calendar parse is attempted
const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

static DATE_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(DATE_PATTERN));

/// Date conversion errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Input does not have the `YYYY-MM-DD` shape or is not a real calendar date
    #[error("date format is malformed, expected YYYY-MM-DD: {input}")]
    MalformedDate {
        /// The rejected input
        input: String,
    },

    /// The pattern engine itself failed
    #[error("date pattern could not be evaluated: {0}")]
    RegexEngineFailure(String),
}

/// Convert a `YYYY-MM-DD` date into milliseconds since the Unix epoch (UTC midnight).
///
/// # Examples
///
/// ```
/// use ambient_weather_client::epoch::convert;
///
/// assert_eq!(convert("2014-01-01").unwrap(), 1388534400000);
/// assert!(convert("11-15-2021").is_err());
/// ```
///
/// # Errors
///
/// [`DateError::MalformedDate`] when the input fails the shape check or the calendar
/// parse, [`DateError::RegexEngineFailure`] when the pattern cannot be compiled.
pub fn convert(input: &str) -> Result<i64, DateError> {
    let pattern = DATE_REGEX
        .as_ref()
        .map_err(|e| DateError::RegexEngineFailure(e.to_string()))?;

    if !pattern.is_match(input) {
        return Err(malformed(input));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| malformed(input))?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| malformed(input))?;

    Ok(midnight.and_utc().timestamp_millis())
}

fn malformed(input: &str) -> DateError {
    DateError::MalformedDate {
        input: input.to_string(),
    }
}
