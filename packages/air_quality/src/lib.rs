#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fail-soft air pollution fetcher.
//!
//! Each provider implements [`AirQualityProvider`]. Fetching never returns
//! an error: a current-conditions fetch yields [`FetchOutcome::Live`] or
//! [`FetchOutcome::Unavailable`] with the reason, and a forecast fetch
//! yields an empty list on any failure. Callers always have a value to act
//! on, so the synthetic fallback is an ordinary branch rather than an
//! error handler.

pub mod aqi;
pub mod config;
pub mod openweather;

use async_trait::async_trait;
use city_monitor_observation_models::{CurrentAirQuality, ForecastPoint};
use thiserror::Error;

pub use config::FetcherConfig;
pub use openweather::OpenWeatherProvider;

/// Why live air quality could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnavailableReason {
    /// No API key is configured.
    #[error("no API key configured")]
    NoApiKey,

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The provider answered with a non-200 status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The response body was not in the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response contained no readings.
    #[error("response contained no readings")]
    Empty,

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Request(String),
}

impl UnavailableReason {
    /// Returns `true` for [`Self::Timeout`].
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Result of a current-conditions fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The provider returned a usable reading.
    Live(CurrentAirQuality),
    /// No reading could be obtained.
    Unavailable(UnavailableReason),
}

impl FetchOutcome {
    /// Returns the live reading, if any.
    #[must_use]
    pub fn live(self) -> Option<CurrentAirQuality> {
        match self {
            Self::Live(reading) => Some(reading),
            Self::Unavailable(_) => None,
        }
    }

    /// Returns `true` if this is [`FetchOutcome::Live`].
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// A source of current and forecast air pollution for coordinates.
///
/// Implementations must bound every network call (≤10s) and must absorb
/// all failures into the return value.
#[async_trait]
pub trait AirQualityProvider: Send + Sync {
    /// Returns a short identifier for logs (e.g. `"openweather"`).
    fn id(&self) -> &str;

    /// Fetches current conditions at `(latitude, longitude)`.
    async fn fetch_current(&self, latitude: f64, longitude: f64) -> FetchOutcome;

    /// Fetches forecast steps up to `horizon_hours` from now. Returns an
    /// empty list if the forecast is unavailable.
    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        horizon_hours: u32,
    ) -> Vec<ForecastPoint>;
}

/// Provider that never has live data. Used when running without network
/// access; every observation is then simulated.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

#[async_trait]
impl AirQualityProvider for OfflineProvider {
    fn id(&self) -> &str {
        "offline"
    }

    async fn fetch_current(&self, _latitude: f64, _longitude: f64) -> FetchOutcome {
        FetchOutcome::Unavailable(UnavailableReason::NoApiKey)
    }

    async fn fetch_forecast(
        &self,
        _latitude: f64,
        _longitude: f64,
        _horizon_hours: u32,
    ) -> Vec<ForecastPoint> {
        Vec::new()
    }
}
