//! # Ambient Weather Client Library
//!
//! A client for the Ambient Weather network REST API. It authenticates with an
//! API key / application key pair, fetches the latest snapshot of every device
//! registered to an account, and walks a device's history in 24-hour windows.
//!
//! ## Features
//!
//! - **Latest snapshot**: [`fetcher::awn::AwnClient::fetch_latest`] lists devices
//!   and their MAC addresses
//! - **Historical pagination**: one request per 24-hour checkpoint, oldest first
//! - **Two modes**: collect everything ([`pagination::HistoricalPaginator::collect`]) or
//!   stream window by window ([`pagination::HistoricalPaginator::stream`])
//! - **Rate limiting**: requests through one transport are spaced to honor the
//!   remote one-request-per-second budget
//! - **Retries**: 408, 429 and 5xx responses are retried with bounded exponential backoff
//! - **Cancellation**: deadlines and cancel signals interrupt in-flight requests
//!
//! ## Quick Start
//!
//! ```no_run
//! use ambient_weather_client::config::ApiConfig;
//! use ambient_weather_client::epoch::convert;
//! use ambient_weather_client::fetcher::awn::AwnClient;
//! use ambient_weather_client::fetcher::context::FetchContext;
//! use ambient_weather_client::fetcher::request::FunctionData;
//! use ambient_weather_client::fetcher::retry::RetryConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::new("https://rt.ambientweather.net", "/v1");
//! let client = AwnClient::new(config, RetryConfig::default())?;
//!
//! let data = FunctionData::new("api-key", "application-key")
//!     .with_mac("00:11:22:33:44:55")
//!     .with_epoch(convert("2024-01-01")?)
//!     .with_limit(288)?;
//!
//! let records = client.history(&FetchContext::new(), &data).await?;
//! println!("fetched {} records", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`epoch`] - `YYYY-MM-DD` to epoch-millisecond conversion
//! - [`fetcher`] - request parameters, HTTP transport, response decoding and the
//!   single-window fetcher
//! - [`pagination`] - the historical pagination engine
//! - [`config`] - API endpoint configuration and environment lookup
//! - [`metrics`] - request and pagination metrics
//! - [`cli`] - the `awn` command line

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CLI command implementations
pub mod cli;

/// Endpoint configuration and environment lookup
pub mod config;

/// Calendar date to epoch conversion
pub mod epoch;

/// Request building, transport and single-window fetching
pub mod fetcher;

/// Metrics emission
pub mod metrics;

/// Historical pagination engine
pub mod pagination;

/// Version of this client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One weather observation uploaded by a station.
///
/// Stations only report the sensors they carry, so every measurement is optional.
/// Field names follow the remote API's JSON keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceRecord {
    /// Observation time (Unix timestamp in milliseconds)
    #[serde(rename = "dateutc")]
    pub date_utc: i64,
    /// Observation time as reported in ISO form
    pub date: Option<DateTime<Utc>>,
    /// IANA timezone label of the station
    pub tz: Option<String>,

    /// Absolute barometric pressure (inHg)
    #[serde(rename = "baromabsin")]
    pub barom_abs_in: Option<f64>,
    /// Relative barometric pressure (inHg)
    #[serde(rename = "baromrelin")]
    pub barom_rel_in: Option<f64>,

    /// Rain over the last hour (in)
    #[serde(rename = "hourlyrainin")]
    pub hourly_rain_in: Option<f64>,
    /// Rain today (in)
    #[serde(rename = "dailyrainin")]
    pub daily_rain_in: Option<f64>,
    /// Rain this week (in)
    #[serde(rename = "weeklyrainin")]
    pub weekly_rain_in: Option<f64>,
    /// Rain this month (in)
    #[serde(rename = "monthlyrainin")]
    pub monthly_rain_in: Option<f64>,
    /// Rain this year (in)
    #[serde(rename = "yearlyrainin")]
    pub yearly_rain_in: Option<f64>,
    /// Rain in the current event (in)
    #[serde(rename = "eventrainin")]
    pub event_rain_in: Option<f64>,
    /// Time of the last rain
    #[serde(rename = "lastRain")]
    pub last_rain: Option<DateTime<Utc>>,

    /// Outdoor temperature (°F)
    #[serde(rename = "tempf")]
    pub temp_f: Option<f64>,
    /// Indoor temperature (°F)
    #[serde(rename = "tempinf")]
    pub temp_in_f: Option<f64>,
    /// Outdoor humidity (%)
    pub humidity: Option<u8>,
    /// Indoor humidity (%)
    #[serde(rename = "humidityin")]
    pub humidity_in: Option<u8>,
    /// Outdoor "feels like" temperature (°F)
    #[serde(rename = "feelsLike")]
    pub feels_like: Option<f64>,
    /// Indoor "feels like" temperature (°F)
    #[serde(rename = "feelsLikein")]
    pub feels_like_in: Option<f64>,
    /// Outdoor dew point (°F)
    #[serde(rename = "dewPoint")]
    pub dew_point: Option<f64>,
    /// Indoor dew point (°F)
    #[serde(rename = "dewPointin")]
    pub dew_point_in: Option<f64>,

    /// Instantaneous wind speed (mph)
    #[serde(rename = "windspeedmph")]
    pub wind_speed_mph: Option<f64>,
    /// Wind gust (mph)
    #[serde(rename = "windgustmph")]
    pub wind_gust_mph: Option<f64>,
    /// Maximum gust today (mph)
    #[serde(rename = "maxdailygust")]
    pub max_daily_gust: Option<f64>,
    /// Instantaneous wind direction (degrees)
    #[serde(rename = "winddir")]
    pub wind_dir: Option<u16>,
    /// 10-minute average wind speed (mph)
    #[serde(rename = "windspdmph_avg10m")]
    pub wind_speed_mph_avg_10m: Option<f64>,
    /// 10-minute average wind direction (degrees)
    #[serde(rename = "winddir_avg10m")]
    pub wind_dir_avg_10m: Option<u16>,

    /// UV index
    pub uv: Option<u8>,
    /// Solar radiation (W/m²)
    #[serde(rename = "solarradiation")]
    pub solar_radiation: Option<f64>,

    /// Lightning strikes in the last hour
    pub lightning_hour: Option<u32>,
    /// Lightning strikes today
    pub lightning_day: Option<u32>,
    /// Distance of the last strike (miles)
    pub lightning_distance: Option<f64>,
    /// Time of the last strike (Unix timestamp in milliseconds)
    pub lightning_time: Option<i64>,
    /// Lightning sensor battery state (1 = ok)
    pub batt_lightning: Option<u8>,
}

impl DeviceRecord {
    /// Observation time as a UTC datetime
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.date_utc)
    }
}

impl std::fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

/// Records returned for one historical window. Empty is a valid outcome.
pub type WindowResponse = Vec<DeviceRecord>;

/// A device registered to the account, as returned by the device listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceSummary {
    /// MAC address used to request the device's history
    #[serde(rename = "macAddress")]
    pub mac_address: String,
    /// Name and location metadata
    #[serde(default)]
    pub info: DeviceInfo,
    /// Most recent observation
    #[serde(rename = "lastData", default)]
    pub last_data: Option<DeviceRecord>,
}

impl std::fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

/// Descriptive device metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceInfo {
    /// User-assigned station name
    pub name: Option<String>,
    /// Where the station is installed
    pub coords: Option<DeviceLocation>,
}

/// Station installation site
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceLocation {
    /// Street address
    pub address: Option<String>,
    /// Short place name
    pub location: Option<String>,
    /// Elevation (m)
    pub elevation: Option<f64>,
    /// Latitude/longitude
    pub coords: Option<LatLon>,
    /// GeoJSON point
    pub geo: Option<GeoPoint>,
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LatLon {
    /// Latitude (degrees)
    pub lat: f64,
    /// Longitude (degrees)
    pub lon: f64,
}

/// GeoJSON point geometry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    /// `[lon, lat]`
    pub coordinates: Vec<f64>,
    /// Geometry type, normally "Point"
    #[serde(rename = "type")]
    pub kind: String,
}
