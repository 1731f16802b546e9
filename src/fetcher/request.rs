//! Request context and per-fetch parameter building
//!
//! [`FunctionData`] is the caller's session context: credentials, the initial
//! epoch checkpoint, the per-window record limit and the device MAC address.
//! [`RequestParams`] is what one fetch actually sends. The pagination engine
//! never mutates a `FunctionData`; it builds fresh `RequestParams` per checkpoint.

use super::{CredentialKind, FetcherError, FetcherResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Smallest record limit the remote accepts
pub const MIN_LIMIT: u16 = 1;
/// Largest record limit the remote accepts (one record every 5 minutes for 24 hours)
pub const MAX_LIMIT: u16 = 288;

/// Session request context
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct FunctionData {
    /// Account API key
    #[serde(rename = "api")]
    pub api_key: String,
    /// Application key
    #[serde(rename = "app")]
    pub application_key: String,
    /// Initial checkpoint (ms since Unix epoch)
    pub epoch: i64,
    /// Records per window, `1..=288`
    pub limit: u16,
    /// Device MAC address
    pub mac: String,
}

impl FunctionData {
    /// Create a context with the given credentials, epoch 0, limit 1 and no MAC address
    pub fn new(api_key: impl Into<String>, application_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            application_key: application_key.into(),
            epoch: 0,
            limit: MIN_LIMIT,
            mac: String::new(),
        }
    }

    /// Set the device MAC address
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = mac.into();
        self
    }

    /// Set the initial checkpoint
    pub fn with_epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Set the per-window record limit
    ///
    /// # Errors
    /// [`FetcherError::InvalidLimit`] outside `1..=288`
    pub fn with_limit(mut self, limit: u16) -> FetcherResult<Self> {
        validate_limit(limit)?;
        self.limit = limit;
        Ok(self)
    }

    /// Query parameters a fetch at the current epoch would send, keyed by wire name
    pub fn to_query_map(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("apiKey", self.api_key.clone()),
            ("applicationKey", self.application_key.clone()),
            ("endDate", self.epoch.to_string()),
            ("limit", self.limit.to_string()),
        ])
    }

    fn redacted(&self) -> Self {
        Self {
            api_key: redact(&self.api_key),
            application_key: redact(&self.application_key),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for FunctionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(&self.redacted()).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

impl std::fmt::Debug for FunctionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionData")
            .field("api_key", &redact(&self.api_key))
            .field("application_key", &redact(&self.application_key))
            .field("epoch", &self.epoch)
            .field("limit", &self.limit)
            .field("mac", &self.mac)
            .finish()
    }
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}

fn validate_limit(limit: u16) -> FetcherResult<()> {
    if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        Ok(())
    } else {
        Err(FetcherError::InvalidLimit(limit))
    }
}

/// Credential query parameters shared by every call, with surrounding whitespace removed
///
/// # Errors
/// [`FetcherError::MissingCredential`] naming the empty or blank key
pub fn credential_query(
    api_key: &str,
    application_key: &str,
) -> FetcherResult<Vec<(&'static str, String)>> {
    let (api_key, application_key) = trimmed_credentials(api_key, application_key)?;

    Ok(vec![
        ("apiKey", api_key.to_string()),
        ("applicationKey", application_key.to_string()),
    ])
}

fn trimmed_credentials<'a>(
    api_key: &'a str,
    application_key: &'a str,
) -> FetcherResult<(&'a str, &'a str)> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(FetcherError::MissingCredential(CredentialKind::ApiKey));
    }
    let application_key = application_key.trim();
    if application_key.is_empty() {
        return Err(FetcherError::MissingCredential(
            CredentialKind::ApplicationKey,
        ));
    }
    Ok((api_key, application_key))
}

/// Parameters for exactly one device-scoped window fetch
#[derive(Clone, PartialEq, Eq)]
pub struct RequestParams {
    api_key: String,
    application_key: String,
    end_date: i64,
    limit: u16,
    mac_address: String,
}

impl RequestParams {
    /// Build the parameters for the window ending at `checkpoint`
    ///
    /// # Errors
    /// - [`FetcherError::MissingCredential`] for an empty or blank API or application key
    /// - [`FetcherError::MissingDeviceAddress`] for an empty MAC address
    /// - [`FetcherError::InvalidLimit`] for a limit outside `1..=288`
    pub fn for_window(data: &FunctionData, checkpoint: i64) -> FetcherResult<Self> {
        let (api_key, application_key) =
            trimmed_credentials(&data.api_key, &data.application_key)?;
        if data.mac.trim().is_empty() {
            return Err(FetcherError::MissingDeviceAddress);
        }
        validate_limit(data.limit)?;

        Ok(Self {
            api_key: api_key.to_string(),
            application_key: application_key.to_string(),
            end_date: checkpoint,
            limit: data.limit,
            mac_address: data.mac.trim().to_string(),
        })
    }

    /// Build the parameters for the window ending at the context's own epoch
    ///
    /// # Errors
    /// See [`RequestParams::for_window`]
    pub fn from_function_data(data: &FunctionData) -> FetcherResult<Self> {
        Self::for_window(data, data.epoch)
    }

    /// Window end-boundary (ms since epoch)
    pub fn end_date(&self) -> i64 {
        self.end_date
    }

    /// Records requested for the window
    pub fn limit(&self) -> u16 {
        self.limit
    }

    /// Device path parameter
    pub fn mac_address(&self) -> &str {
        &self.mac_address
    }

    /// Query parameters in wire form
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("apiKey", self.api_key.clone()),
            ("applicationKey", self.application_key.clone()),
            ("endDate", self.end_date.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl std::fmt::Debug for RequestParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestParams")
            .field("end_date", &self.end_date)
            .field("limit", &self.limit)
            .field("mac_address", &self.mac_address)
            .finish_non_exhaustive()
    }
}
