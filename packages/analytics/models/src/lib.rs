#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for the analytics views.
//!
//! Every type serializes as camelCase JSON so the HTTP layer can return
//! them unchanged.

use chrono::{DateTime, Utc};
use city_monitor_observation_models::{AqiBand, DataSource};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Congestion band of a traffic density percentage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficBand {
    /// Below 30%.
    FreeFlowing,
    /// 30-50%.
    Light,
    /// 50-70%.
    Moderate,
    /// 70-85%.
    Heavy,
    /// 85% and above.
    Severe,
}

impl TrafficBand {
    /// Classifies a traffic density percentage.
    #[must_use]
    pub fn from_density(density: f64) -> Self {
        if density < 30.0 {
            Self::FreeFlowing
        } else if density < 50.0 {
            Self::Light
        } else if density < 70.0 {
            Self::Moderate
        } else if density < 85.0 {
            Self::Heavy
        } else {
            Self::Severe
        }
    }

    /// Hex colour used on traffic heatmaps.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::FreeFlowing => "#0000ff",
            Self::Light => "#00ff00",
            Self::Moderate => "#ffff00",
            Self::Heavy => "#ffa500",
            Self::Severe => "#ff0000",
        }
    }
}

/// Synthetic traffic and pollution profile of one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySnapshot {
    /// Place name.
    pub place_name: String,
    /// State or parent region.
    pub region: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Whether the place is a major city.
    pub major: bool,
    /// Air quality index.
    pub aqi: u16,
    /// Traffic density percentage.
    pub traffic_density: f64,
    /// Congestion band of `traffic_density`.
    pub traffic_band: TrafficBand,
    /// Heatmap colour of `traffic_band`.
    pub traffic_color: String,
    /// Daily vehicle count.
    pub vehicle_count: u32,
    /// Cars in the daily count.
    pub cars: u32,
    /// Two-wheelers in the daily count.
    pub bikes: u32,
    /// Trucks in the daily count.
    pub trucks: u32,
    /// Average speed (km/h).
    pub average_speed: f64,
    /// Incidents reported today.
    pub incident_count: u32,
    /// Resident population.
    pub population: u32,
}

/// One hour of the historical trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Start of the hour.
    pub timestamp: DateTime<Utc>,
    /// Local hour of day (0-23).
    pub hour: u32,
    /// Vehicles per hour.
    pub traffic_volume: f64,
    /// Air quality index.
    pub aqi: f64,
}

/// Hourly trend series with headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    /// Hourly points, oldest first.
    pub points: Vec<TrendPoint>,
    /// Mean traffic volume across the series.
    pub average_traffic: Option<f64>,
    /// Mean AQI across the series.
    pub average_aqi: Option<f64>,
    /// Pearson correlation of traffic volume and AQI.
    pub correlation: Option<f64>,
    /// Hour of day with the highest traffic volume.
    pub peak_hour: Option<u32>,
}

/// AQI by day of week (rows, Monday first) and hour of day (columns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollutionMatrix {
    /// Row labels.
    pub days: Vec<String>,
    /// Column labels (0-23).
    pub hours: Vec<u32>,
    /// `values[day][hour]`.
    pub values: Vec<Vec<i32>>,
}

/// Alert level of a sensor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorStatus {
    /// AQI below 100.
    Normal,
    /// AQI 100-149.
    Elevated,
    /// AQI 150 and above.
    Critical,
}

impl SensorStatus {
    /// Classifies a sensor AQI reading.
    #[must_use]
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi < 100.0 {
            Self::Normal
        } else if aqi < 150.0 {
            Self::Elevated
        } else {
            Self::Critical
        }
    }
}

/// A simulated roadside sensor near a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// Sensor identifier (`APTG-####`).
    pub sensor_id: String,
    /// Place the sensor belongs to.
    pub place_name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Air quality index reading.
    pub aqi: f64,
    /// Traffic density reading.
    pub traffic_density: f64,
    /// Alert level.
    pub status: SensorStatus,
}

/// Sensors around every place with counts per alert level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorClusterReport {
    /// All sensors.
    pub sensors: Vec<Sensor>,
    /// Sensors at [`SensorStatus::Normal`].
    pub normal: usize,
    /// Sensors at [`SensorStatus::Elevated`].
    pub elevated: usize,
    /// Sensors at [`SensorStatus::Critical`].
    pub critical: usize,
}

/// Descriptive statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Sample size.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Sample standard deviation (n - 1). `None` for a single value.
    pub std_dev: Option<f64>,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// AQI samples for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDistribution {
    /// Place name.
    pub place_name: String,
    /// AQI samples.
    pub samples: Vec<f64>,
    /// Statistics of `samples`.
    pub summary: Option<StatsSummary>,
}

/// Least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearFit {
    /// Slope.
    pub slope: f64,
    /// Intercept.
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
}

/// How traffic measures relate to AQI across places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    /// Number of places compared.
    pub sample_size: usize,
    /// Pearson r of daily vehicle count and AQI.
    pub vehicles_aqi: Option<f64>,
    /// Pearson r of traffic density and AQI.
    pub density_aqi: Option<f64>,
    /// Pearson r of average speed and AQI.
    pub speed_aqi: Option<f64>,
    /// Fit of AQI against daily vehicle count.
    pub vehicles_fit: Option<LinearFit>,
}

/// A weighted traffic corridor between two places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEdge {
    /// Origin place name.
    pub from: String,
    /// Destination place name.
    pub to: String,
    /// Relative traffic volume on the corridor.
    pub weight: u32,
}

/// Corridors connecting every pair of the leading places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNetwork {
    /// Place names, in input order.
    pub nodes: Vec<String>,
    /// One edge per unordered pair of `nodes`.
    pub edges: Vec<RouteEdge>,
}

/// Kind of reported road incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentCategory {
    Congestion,
    Accident,
    PollutionSpike,
    RoadWork,
    HeavyTraffic,
    AirQualityAlert,
    VehicleBreakdown,
    WeatherImpact,
}

impl IncidentCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Congestion,
        Self::Accident,
        Self::PollutionSpike,
        Self::RoadWork,
        Self::HeavyTraffic,
        Self::AirQualityAlert,
        Self::VehicleBreakdown,
        Self::WeatherImpact,
    ];
}

/// How often one incident category was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentFrequency {
    pub category: IncidentCategory,
    pub count: usize,
}

/// Incident reports grouped by category, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    /// Number of reports drawn.
    pub total: usize,
    /// Categories with at least one report.
    pub frequencies: Vec<IncidentFrequency>,
}

/// Current AQI of one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiOverviewEntry {
    /// Place name.
    pub place_name: String,
    /// State or parent region.
    pub region: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Air quality index.
    pub aqi: u16,
    /// Health band of `aqi`.
    pub band: AqiBand,
    /// Hex colour of `band`.
    pub color: String,
    /// Provenance of `aqi`.
    pub source: DataSource,
}

/// Current AQI across places, worst first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiOverview {
    /// Entries sorted by descending AQI.
    pub entries: Vec<AqiOverviewEntry>,
    /// Mean AQI across entries.
    pub average_aqi: Option<f64>,
    /// Entries with live readings.
    pub live_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_band_thresholds() {
        assert_eq!(TrafficBand::from_density(0.0), TrafficBand::FreeFlowing);
        assert_eq!(TrafficBand::from_density(29.9), TrafficBand::FreeFlowing);
        assert_eq!(TrafficBand::from_density(30.0), TrafficBand::Light);
        assert_eq!(TrafficBand::from_density(50.0), TrafficBand::Moderate);
        assert_eq!(TrafficBand::from_density(70.0), TrafficBand::Heavy);
        assert_eq!(TrafficBand::from_density(85.0), TrafficBand::Severe);
        assert_eq!(TrafficBand::Severe.color(), "#ff0000");
    }

    #[test]
    fn sensor_status_thresholds() {
        assert_eq!(SensorStatus::from_aqi(99.9), SensorStatus::Normal);
        assert_eq!(SensorStatus::from_aqi(100.0), SensorStatus::Elevated);
        assert_eq!(SensorStatus::from_aqi(149.0), SensorStatus::Elevated);
        assert_eq!(SensorStatus::from_aqi(150.0), SensorStatus::Critical);
        assert_eq!(SensorStatus::Critical.to_string(), "CRITICAL");
    }
}
