#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Observation, pollutant, and forecast types.
//!
//! An [`Observation`] is the unit of monitoring data: one traffic and air
//! quality reading for one place at one instant. Every observation records
//! whether its air quality came from the live provider or the synthetic
//! fallback so that consumers can badge or filter by provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Upper bound of the air quality index scale used for observations.
pub const MAX_AQI: u16 = 300;

/// Upper bound of the traffic density percentage.
pub const MAX_TRAFFIC_DENSITY: f64 = 100.0;

/// Where an observation's air quality readings came from.
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
pub enum DataSource {
    /// Fetched from the external air pollution provider.
    Live,
    /// Produced by the synthetic generator because the provider was
    /// unavailable.
    Simulated,
}

/// Pollutant concentrations. All values are µg/m³ except `co`, which is
/// mg/m³.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pollutants {
    /// Fine particulate matter (≤2.5µm).
    #[serde(rename = "pm25")]
    pub pm2_5: f64,
    /// Coarse particulate matter (≤10µm).
    pub pm10: f64,
    /// Nitrogen dioxide.
    pub no2: f64,
    /// Sulphur dioxide.
    pub so2: f64,
    /// Carbon monoxide (mg/m³).
    pub co: f64,
    /// Ozone.
    pub o3: f64,
}

impl Pollutants {
    /// Returns a copy with every reading floored at zero.
    #[must_use]
    pub fn clamp_non_negative(self) -> Self {
        Self {
            pm2_5: self.pm2_5.max(0.0),
            pm10: self.pm10.max(0.0),
            no2: self.no2.max(0.0),
            so2: self.so2.max(0.0),
            co: self.co.max(0.0),
            o3: self.o3.max(0.0),
        }
    }

    /// Returns `true` if no reading is negative or NaN.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        [self.pm2_5, self.pm10, self.no2, self.so2, self.co, self.o3]
            .iter()
            .all(|v| *v >= 0.0)
    }
}

/// A single monitoring observation for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// When the observation was produced.
    pub timestamp: DateTime<Utc>,
    /// Name of the registered place this observation belongs to.
    pub place_name: String,
    /// Latitude of the place.
    pub latitude: f64,
    /// Longitude of the place.
    pub longitude: f64,
    /// Traffic density percentage in [0, 100].
    pub traffic_density: f64,
    /// Air quality index in [0, 300].
    pub air_quality_index: u16,
    /// Pollutant readings, all non-negative.
    #[serde(flatten)]
    pub pollutants: Pollutants,
    /// Vehicles counted in the sampling period.
    pub vehicle_count: u32,
    /// Average traffic speed in km/h.
    pub average_speed: f64,
    /// Traffic incidents reported in the sampling period.
    pub incident_count: u8,
    /// Provenance of the air quality readings.
    pub source: DataSource,
}

/// A current air quality reading from the live provider, already
/// normalized (numeric AQI, CO in mg/m³).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAirQuality {
    /// Time the provider reports the reading for.
    pub measured_at: DateTime<Utc>,
    /// Provider's categorical index (1-5).
    pub aqi_category: u8,
    /// Approximate numeric AQI derived from the category.
    pub aqi: u16,
    /// Pollutant readings.
    pub pollutants: Pollutants,
}

/// One forecast step from the provider.
///
/// Readings are optional because the provider may omit components; the
/// estimated AQI is only present when PM2.5 is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Forecast instant.
    pub timestamp: DateTime<Utc>,
    /// Provider's categorical index (1-5).
    pub aqi_category: Option<u8>,
    /// PM2.5 (µg/m³).
    #[serde(rename = "pm25")]
    pub pm2_5: Option<f64>,
    /// PM10 (µg/m³).
    pub pm10: Option<f64>,
    /// NO2 (µg/m³).
    pub no2: Option<f64>,
    /// SO2 (µg/m³).
    pub so2: Option<f64>,
    /// CO (mg/m³).
    pub co: Option<f64>,
    /// O3 (µg/m³).
    pub o3: Option<f64>,
    /// AQI estimated from PM2.5 via the piecewise-linear breakpoint table.
    pub aqi_estimated: Option<f64>,
}

/// Health band of an AQI value.
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
pub enum AqiBand {
    /// 0-50: air quality is satisfactory.
    Good,
    /// 51-100: acceptable quality.
    Moderate,
    /// 101-150: unhealthy for sensitive groups.
    UnhealthySensitive,
    /// 151-200: health effects for everyone.
    Unhealthy,
    /// 201-300: serious health effects.
    VeryUnhealthy,
    /// 301+: emergency conditions.
    Hazardous,
}

impl AqiBand {
    /// Classifies an AQI value.
    #[must_use]
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            Self::Good
        } else if aqi <= 100.0 {
            Self::Moderate
        } else if aqi <= 150.0 {
            Self::UnhealthySensitive
        } else if aqi <= 200.0 {
            Self::Unhealthy
        } else if aqi <= 300.0 {
            Self::VeryUnhealthy
        } else {
            Self::Hazardous
        }
    }

    /// Hex colour used for this band on maps and charts.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Good => "#00e400",
            Self::Moderate => "#ffff00",
            Self::UnhealthySensitive => "#ff7e00",
            Self::Unhealthy => "#ff0000",
            Self::VeryUnhealthy => "#8f3f97",
            Self::Hazardous => "#7e0023",
        }
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    /// Returns all variants in ascending severity.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Good,
            Self::Moderate,
            Self::UnhealthySensitive,
            Self::Unhealthy,
            Self::VeryUnhealthy,
            Self::Hazardous,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(AqiBand::from_aqi(0.0), AqiBand::Good);
        assert_eq!(AqiBand::from_aqi(50.0), AqiBand::Good);
        assert_eq!(AqiBand::from_aqi(50.5), AqiBand::Moderate);
        assert_eq!(AqiBand::from_aqi(100.0), AqiBand::Moderate);
        assert_eq!(AqiBand::from_aqi(150.0), AqiBand::UnhealthySensitive);
        assert_eq!(AqiBand::from_aqi(200.0), AqiBand::Unhealthy);
        assert_eq!(AqiBand::from_aqi(300.0), AqiBand::VeryUnhealthy);
        assert_eq!(AqiBand::from_aqi(301.0), AqiBand::Hazardous);
    }

    #[test]
    fn bands_are_ordered_by_severity() {
        let bands = AqiBand::all();
        for pair in bands.windows(2) {
            assert!(pair[0] < pair[1], "{:?} should sort before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn clamps_negative_pollutants() {
        let p = Pollutants {
            pm2_5: -1.0,
            pm10: 20.0,
            no2: -0.1,
            so2: 0.0,
            co: 0.5,
            o3: -30.0,
        }
        .clamp_non_negative();
        assert!(p.is_non_negative());
        assert!((p.pm10 - 20.0).abs() < f64::EPSILON);
        assert!((p.co - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn source_string_form() {
        assert_eq!(DataSource::Live.to_string(), "LIVE");
        assert_eq!("SIMULATED".parse::<DataSource>().ok(), Some(DataSource::Simulated));
    }

    #[test]
    fn observation_serializes_flat_pollutants() {
        let obs = Observation {
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            place_name: "Guntur".to_string(),
            latitude: 16.3067,
            longitude: 80.4365,
            traffic_density: 40.0,
            air_quality_index: 80,
            pollutants: Pollutants {
                pm2_5: 26.0,
                ..Pollutants::default()
            },
            vehicle_count: 1000,
            average_speed: 30.0,
            incident_count: 1,
            source: DataSource::Simulated,
        };
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["placeName"], "Guntur");
        assert_eq!(json["pm25"], 26.0);
        assert_eq!(json["source"], "SIMULATED");
    }
}
