//! Response decoding
//!
//! The remote API answers successful calls with a JSON array. Failures are
//! reported as an object such as `{"error": "apiKey-missing"}`, sometimes with
//! a `message`, and sometimes with a 200 status. Both shapes are handled here
//! so the transport only needs to deliver a [`serde_json::Value`].

use super::{FetcherError, FetcherResult};
use crate::{DeviceSummary, WindowResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Stateless parser for remote API responses
pub struct AwnParser;

impl AwnParser {
    /// Decode one historical window
    ///
    /// # Errors
    /// The mapped remote error for an error-shaped body, [`FetcherError::ParseError`]
    /// for anything else that is not an array of records
    pub fn parse_window(body: Value) -> FetcherResult<WindowResponse> {
        Self::parse_array(body, "device data")
    }

    /// Decode the device listing
    ///
    /// # Errors
    /// See [`AwnParser::parse_window`]
    pub fn parse_devices(body: Value) -> FetcherResult<Vec<DeviceSummary>> {
        Self::parse_array(body, "device list")
    }

    /// Map an error-shaped body to its error kind, or `None` if the body is not one
    pub fn remote_error(body: &Value) -> Option<FetcherError> {
        let error = body.as_object()?.get("error")?;
        let error = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self::classify(&error, message))
    }

    /// Map the remote's `error` identifier to an error kind
    pub fn classify(error: &str, message: Option<String>) -> FetcherError {
        match error {
            "apiKey-missing" => FetcherError::ApiKeyMissing,
            "applicationKey-missing" => FetcherError::AppKeyMissing,
            "macAddress-missing" => FetcherError::MacAddressMissing,
            "date-invalid" => FetcherError::InvalidDateFormat {
                message: message.unwrap_or_default(),
            },
            _ => FetcherError::RemoteRejected {
                error: error.to_string(),
                message,
            },
        }
    }

    fn parse_array<T: DeserializeOwned>(body: Value, what: &str) -> FetcherResult<Vec<T>> {
        if let Some(err) = Self::remote_error(&body) {
            return Err(err);
        }

        if !body.is_array() {
            return Err(FetcherError::ParseError(format!(
                "expected {what} array, got {}",
                json_type(&body)
            )));
        }

        serde_json::from_value(body)
            .map_err(|e| FetcherError::ParseError(format!("invalid {what}: {e}")))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
