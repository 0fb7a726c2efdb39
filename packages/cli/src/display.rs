//! Plain-text rendering of places, observations, and forecasts.

use chrono::Local;
use city_monitor_geography_models::Place;
use city_monitor_observation_models::{AqiBand, ForecastPoint, Observation};
use city_monitor_realtime::WindowSummary;

/// One registry entry.
pub fn place_line(place: &Place) -> String {
    let region = place.region.as_deref().unwrap_or("-");
    let marker = if place.major { "*" } else { " " };
    format!(
        "{marker} {:<22} {:<16} {:>8.4} {:>8.4}  {}",
        place.name, region, place.latitude, place.longitude, place.detail
    )
}

/// One observation, timestamped in local time.
pub fn observation_line(obs: &Observation) -> String {
    let band = AqiBand::from_aqi(f64::from(obs.air_quality_index));
    format!(
        "{}  {:<18} AQI {:>3} ({})  traffic {:>5.1}%  {:>4.1} km/h  {:>4} vehicles  {} incidents  [{}]",
        obs.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        obs.place_name,
        obs.air_quality_index,
        band.label(),
        obs.traffic_density,
        obs.average_speed,
        obs.vehicle_count,
        obs.incident_count,
        obs.source,
    )
}

/// Headline figures of a window snapshot.
pub fn summary_line(summary: &WindowSummary, len: usize, fallback: bool) -> String {
    let scope = if fallback { " (all places)" } else { "" };
    format!(
        "  window{scope}: {len} obs  AQI {:+}  traffic {:+.1}  incidents {}  live {} / simulated {}",
        summary.aqi_delta,
        summary.traffic_delta,
        summary.total_incidents,
        summary.live_count,
        summary.simulated_count,
    )
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

/// One forecast step.
pub fn forecast_line(point: &ForecastPoint) -> String {
    format!(
        "{}  AQI~{:>5}  PM2.5 {:>6}  PM10 {:>6}  NO2 {:>6}  O3 {:>6}",
        point.timestamp.with_timezone(&Local).format("%a %d %H:%M"),
        reading(point.aqi_estimated),
        reading(point.pm2_5),
        reading(point.pm10),
        reading(point.no2),
        reading(point.o3),
    )
}
