#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the city monitor server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the realtime core's types so the API contract can evolve on its
//! own.

use city_monitor_geography_models::Coverage;
use city_monitor_observation_models::{ForecastPoint, Observation};
use city_monitor_realtime::{Snapshot, WindowSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Forecast horizon used when a request does not name one.
pub const DEFAULT_FORECAST_HOURS: u32 = 48;

/// Shortest forecast horizon a request may ask for.
pub const MIN_FORECAST_HOURS: u32 = 6;

/// Longest forecast horizon a request may ask for.
pub const MAX_FORECAST_HOURS: u32 = 96;

/// Trend length used when a request does not name one.
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Longest trend a request may ask for.
pub const MAX_TREND_DAYS: u32 = 30;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Identifier of the air quality provider in use.
    pub provider: String,
}

/// Query parameters for endpoints that list places.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageParams {
    /// `cities` (default) or `all`.
    pub detail: Option<Coverage>,
}

impl CoverageParams {
    /// Requested coverage, defaulting to cities only.
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        self.detail.unwrap_or_default()
    }
}

/// Query parameters naming a place. Session endpoints fall back to the
/// session's selected place when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceParams {
    /// Place name.
    pub place: Option<String>,
}

/// Query parameters for `GET /api/forecast`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastParams {
    /// Place name.
    pub place: String,
    /// Forecast horizon in hours.
    pub hours: Option<u32>,
}

impl ForecastParams {
    /// Requested horizon, defaulted and clamped to the supported range.
    #[must_use]
    pub fn horizon_hours(&self) -> u32 {
        self.hours
            .unwrap_or(DEFAULT_FORECAST_HOURS)
            .clamp(MIN_FORECAST_HOURS, MAX_FORECAST_HOURS)
    }
}

/// Query parameters for `GET /api/analytics/trends`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendParams {
    /// Number of days of hourly history.
    pub days: Option<u32>,
}

impl TrendParams {
    /// Requested trend length, defaulted and clamped to 1..=30 days.
    #[must_use]
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_TREND_DAYS).clamp(1, MAX_TREND_DAYS)
    }
}

/// A monitoring session as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSession {
    /// Session ID.
    pub id: Uuid,
    /// Place refreshed when no place is given.
    pub selected_place: String,
    /// Place list coverage.
    pub coverage: Coverage,
}

/// Headline figures of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWindowSummary {
    /// AQI of the newest observation.
    pub latest_aqi: u16,
    /// Change in AQI against the previous observation.
    pub aqi_delta: i32,
    /// Traffic density of the newest observation.
    pub latest_traffic: f64,
    /// Change in traffic density against the previous observation.
    pub traffic_delta: f64,
    /// Average speed of the newest observation.
    pub latest_speed: f64,
    /// Incidents across the snapshot.
    pub total_incidents: u32,
    /// Observations with live air quality.
    pub live_count: usize,
    /// Observations with simulated air quality.
    pub simulated_count: usize,
}

impl From<WindowSummary> for ApiWindowSummary {
    fn from(summary: WindowSummary) -> Self {
        Self {
            latest_aqi: summary.latest_aqi,
            aqi_delta: summary.aqi_delta,
            latest_traffic: summary.latest_traffic,
            traffic_delta: summary.traffic_delta,
            latest_speed: summary.latest_speed,
            total_incidents: summary.total_incidents,
            live_count: summary.live_count,
            simulated_count: summary.simulated_count,
        }
    }
}

/// Rolling window contents for one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSnapshot {
    /// Place the snapshot was requested for.
    pub place_name: String,
    /// `true` when the place had no observations and `observations` holds
    /// the most recent entries across all places instead.
    pub fallback: bool,
    /// Observations in arrival order.
    pub observations: Vec<Observation>,
    /// Headline figures, absent for an empty snapshot.
    pub summary: Option<ApiWindowSummary>,
}

impl From<Snapshot> for ApiSnapshot {
    fn from(snapshot: Snapshot) -> Self {
        let summary = snapshot.summary().map(ApiWindowSummary::from);
        Self {
            fallback: snapshot.is_fallback(),
            place_name: snapshot.place_name,
            observations: snapshot.observations,
            summary,
        }
    }
}

/// Air quality forecast for one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiForecast {
    /// Place name.
    pub place_name: String,
    /// Horizon the forecast was requested for.
    pub horizon_hours: u32,
    /// `false` when the provider returned nothing.
    pub available: bool,
    /// Forecast steps, oldest first.
    pub points: Vec<ForecastPoint>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use city_monitor_observation_models::{DataSource, Pollutants};
    use city_monitor_realtime::SnapshotScope;

    use super::*;

    fn observation(aqi: u16, traffic: f64) -> Observation {
        Observation {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap(),
            place_name: "Warangal".to_string(),
            latitude: 17.9689,
            longitude: 79.5941,
            traffic_density: traffic,
            air_quality_index: aqi,
            pollutants: Pollutants::default(),
            vehicle_count: 2000,
            average_speed: 35.0,
            incident_count: 1,
            source: DataSource::Simulated,
        }
    }

    #[test]
    fn forecast_hours_default_and_clamp() {
        let params = |hours| ForecastParams {
            place: "Hyderabad".to_string(),
            hours,
        };
        assert_eq!(params(None).horizon_hours(), 48);
        assert_eq!(params(Some(1)).horizon_hours(), 6);
        assert_eq!(params(Some(24)).horizon_hours(), 24);
        assert_eq!(params(Some(500)).horizon_hours(), 96);
    }

    #[test]
    fn trend_days_default_and_clamp() {
        assert_eq!(TrendParams::default().days(), 7);
        assert_eq!(TrendParams { days: Some(0) }.days(), 1);
        assert_eq!(TrendParams { days: Some(90) }.days(), 30);
    }

    #[test]
    fn coverage_defaults_to_cities() {
        assert_eq!(CoverageParams::default().coverage(), Coverage::Cities);
    }

    #[test]
    fn snapshot_conversion_keeps_scope_and_summary() {
        let snapshot = Snapshot {
            place_name: "Guntur".to_string(),
            scope: SnapshotScope::Fallback,
            observations: vec![observation(100, 40.0), observation(120, 55.0)],
        };
        let api = ApiSnapshot::from(snapshot);
        assert!(api.fallback);
        assert_eq!(api.place_name, "Guntur");
        assert_eq!(api.observations.len(), 2);

        let summary = api.summary.unwrap();
        assert_eq!(summary.latest_aqi, 120);
        assert_eq!(summary.aqi_delta, 20);
        assert_eq!(summary.total_incidents, 2);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let api = ApiSnapshot::from(Snapshot {
            place_name: "Warangal".to_string(),
            scope: SnapshotScope::Place,
            observations: Vec::new(),
        });
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["placeName"], "Warangal");
        assert_eq!(json["fallback"], false);
        assert!(json["summary"].is_null());
    }
}
