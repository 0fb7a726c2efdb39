//! `OpenWeather` Air Pollution API client.
//!
//! - Current: `GET /data/2.5/air_pollution?lat=..&lon=..&appid=..`
//! - Forecast: `GET /data/2.5/air_pollution/forecast?lat=..&lon=..&appid=..`
//!
//! Both return `{"list": [{"dt", "main": {"aqi"}, "components": {..}}]}`.
//! The categorical `main.aqi` (1-5) is mapped to a numeric AQI and CO is
//! converted from µg/m³ to mg/m³.
//!
//! See <https://openweathermap.org/api/air-pollution>

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use city_monitor_observation_models::{CurrentAirQuality, ForecastPoint, Pollutants};

use crate::aqi::{category_to_aqi, pm25_to_aqi};
use crate::{AirQualityProvider, FetchOutcome, FetcherConfig, UnavailableReason};

/// Category assumed when a current reading omits `main.aqi`.
const DEFAULT_CATEGORY: u8 = 1;

/// Provider reports CO in µg/m³; observations carry mg/m³.
const CO_UG_PER_MG: f64 = 1000.0;

/// `OpenWeather` air pollution provider.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    config: FetcherConfig,
    client: reqwest::Client,
}

impl OpenWeatherProvider {
    /// Creates a provider with the given configuration.
    #[must_use]
    pub fn new(config: FetcherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("city-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client ({e}); using defaults");
                reqwest::Client::new()
            });

        Self { config, client }
    }

    /// Creates a provider configured from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(FetcherConfig::from_env())
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Issues one bounded GET and decodes the body as JSON.
    async fn get_json(
        &self,
        url: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<serde_json::Value, UnavailableReason> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(UnavailableReason::NoApiKey)?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", api_key.to_string()),
            ])
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(UnavailableReason::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(|e| classify(&e))?;
        serde_json::from_str(&text).map_err(|e| UnavailableReason::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AirQualityProvider for OpenWeatherProvider {
    fn id(&self) -> &str {
        "openweather"
    }

    async fn fetch_current(&self, latitude: f64, longitude: f64) -> FetchOutcome {
        let result = self
            .get_json(&self.config.current_url, latitude, longitude)
            .await
            .and_then(|body| parse_current(&body));

        match result {
            Ok(reading) => FetchOutcome::Live(reading),
            Err(reason) => {
                log::warn!("Current air quality unavailable at ({latitude}, {longitude}): {reason}");
                FetchOutcome::Unavailable(reason)
            }
        }
    }

    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        horizon_hours: u32,
    ) -> Vec<ForecastPoint> {
        let result = self
            .get_json(&self.config.forecast_url, latitude, longitude)
            .await
            .and_then(|body| parse_forecast(&body, Utc::now(), horizon_hours));

        match result {
            Ok(points) => points,
            Err(reason) => {
                log::warn!("Air quality forecast unavailable at ({latitude}, {longitude}): {reason}");
                Vec::new()
            }
        }
    }
}

/// Maps a transport error onto an [`UnavailableReason`].
fn classify(e: &reqwest::Error) -> UnavailableReason {
    if e.is_timeout() {
        UnavailableReason::Timeout
    } else if e.is_connect() {
        UnavailableReason::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
        UnavailableReason::Malformed(e.to_string())
    } else {
        UnavailableReason::Request(e.to_string())
    }
}

/// Returns the `list` array of a response body.
fn entries(body: &serde_json::Value) -> Result<&Vec<serde_json::Value>, UnavailableReason> {
    body["list"]
        .as_array()
        .ok_or_else(|| UnavailableReason::Malformed("missing list array".to_string()))
}

/// Reads `dt` (unix seconds) as a timestamp, defaulting to the epoch.
fn entry_timestamp(entry: &serde_json::Value) -> DateTime<Utc> {
    entry["dt"]
        .as_i64()
        .and_then(|dt| DateTime::from_timestamp(dt, 0))
        .unwrap_or_default()
}

/// Reads `main.aqi` as a category. Integral floats (`3.0`) count as their
/// integer; other numbers read as an unknown category.
fn entry_category(entry: &serde_json::Value) -> Option<u8> {
    let value = &entry["main"]["aqi"];
    if let Some(v) = value.as_u64() {
        return Some(u8::try_from(v).unwrap_or(u8::MAX));
    }
    value.as_f64().map(|v| {
        if v.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&v) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let category = v as u8;
            category
        } else {
            u8::MAX
        }
    })
}

/// Reads a component concentration.
fn component(entry: &serde_json::Value, key: &str) -> Option<f64> {
    entry["components"][key].as_f64()
}

/// Parses a current-conditions response. Uses the first entry of `list`;
/// missing components read as zero.
///
/// # Errors
///
/// Returns [`UnavailableReason::Malformed`] if `list` is missing and
/// [`UnavailableReason::Empty`] if it has no entries.
pub fn parse_current(body: &serde_json::Value) -> Result<CurrentAirQuality, UnavailableReason> {
    let first = entries(body)?.first().ok_or(UnavailableReason::Empty)?;

    let aqi_category = entry_category(first).unwrap_or(DEFAULT_CATEGORY);
    let reading = |key| component(first, key).unwrap_or(0.0);

    Ok(CurrentAirQuality {
        measured_at: entry_timestamp(first),
        aqi_category,
        aqi: category_to_aqi(aqi_category),
        pollutants: Pollutants {
            pm2_5: reading("pm2_5"),
            pm10: reading("pm10"),
            no2: reading("no2"),
            so2: reading("so2"),
            co: reading("co") / CO_UG_PER_MG,
            o3: reading("o3"),
        },
    })
}

/// Parses a forecast response, keeping steps no later than
/// `now + horizon_hours`, sorted by time.
///
/// # Errors
///
/// Returns [`UnavailableReason::Malformed`] if `list` is missing.
pub fn parse_forecast(
    body: &serde_json::Value,
    now: DateTime<Utc>,
    horizon_hours: u32,
) -> Result<Vec<ForecastPoint>, UnavailableReason> {
    let max_time = now + TimeDelta::hours(i64::from(horizon_hours));

    let mut points: Vec<ForecastPoint> = entries(body)?
        .iter()
        .filter_map(|entry| {
            let timestamp = entry_timestamp(entry);
            if timestamp > max_time {
                return None;
            }

            let pm2_5 = component(entry, "pm2_5");
            Some(ForecastPoint {
                timestamp,
                aqi_category: entry_category(entry),
                pm2_5,
                pm10: component(entry, "pm10"),
                no2: component(entry, "no2"),
                so2: component(entry, "so2"),
                co: component(entry, "co").map(|co| co / CO_UG_PER_MG),
                o3: component(entry, "o3"),
                aqi_estimated: pm2_5.map(pm25_to_aqi),
            })
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}
