//! Synthetic analytics datasets.
//!
//! These stand in for historical and fleet-wide measurements the monitor
//! does not collect. All generators take an explicit RNG so tests can seed
//! them.

use std::f64::consts::PI;

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike as _, Utc, Weekday};
use city_monitor_analytics_models::{
    CitySnapshot, CorrelationReport, IncidentCategory, IncidentFrequency, IncidentReport,
    PlaceDistribution, PollutionMatrix, RouteEdge, RouteNetwork, Sensor, SensorClusterReport,
    SensorStatus, TrafficBand, TrendPoint, TrendReport,
};
use city_monitor_geography_models::Place;
use rand::Rng;
use rand_distr::{Distribution as _, Normal};

use crate::stats;

/// Samples drawn per place for distribution analysis.
pub const SAMPLES_PER_PLACE: usize = 40;

/// Spread of distribution samples around a place's AQI.
pub const SAMPLE_STD_DEV: f64 = 18.0;

/// Places compared in distribution analysis, by highest AQI.
pub const TOP_PLACES: usize = 12;

/// Maximum latitude/longitude offset of a sensor from its place.
pub const SENSOR_SPREAD: f64 = 0.08;

/// Places included in the route network.
pub const NETWORK_NODES: usize = 8;

/// Incident reports drawn per frequency report.
pub const INCIDENT_SAMPLES: usize = 100;

/// Weekday hours with elevated pollution in the day-by-hour matrix.
const MATRIX_PEAK_HOURS: [u32; 5] = [8, 9, 17, 18, 19];

/// Day labels of the pollution matrix, Monday first.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

const fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Generates a daily traffic and pollution profile for each place. Major
/// cities get higher AQI, traffic, vehicle, and population baselines.
pub fn city_snapshots<R: Rng + ?Sized>(places: &[&Place], rng: &mut R) -> Vec<CitySnapshot> {
    places
        .iter()
        .map(|place| {
            let (aqi, traffic, vehicles, population) = if place.major {
                (
                    rng.random_range(100_u16..=200),
                    rng.random_range(60_u32..=90),
                    rng.random_range(5_000..=50_000),
                    rng.random_range(100_000..=5_000_000),
                )
            } else {
                (
                    rng.random_range(50_u16..=120),
                    rng.random_range(30_u32..=60),
                    rng.random_range(1_000..=10_000),
                    rng.random_range(50_000..=500_000),
                )
            };
            let traffic_density = f64::from(traffic);
            let traffic_band = TrafficBand::from_density(traffic_density);

            CitySnapshot {
                place_name: place.name.clone(),
                region: place.region.clone(),
                latitude: place.latitude,
                longitude: place.longitude,
                major: place.major,
                aqi,
                traffic_density,
                traffic_band,
                traffic_color: traffic_band.color().to_string(),
                vehicle_count: vehicles,
                cars: rng.random_range(2_000..=25_000),
                bikes: rng.random_range(2_000..=20_000),
                trucks: rng.random_range(500..=5_000),
                average_speed: f64::from(rng.random_range(20_u32..=55)),
                incident_count: rng.random_range(0..=12),
                population,
            }
        })
        .collect()
}

/// Diurnal traffic curve peaking mid-morning.
fn traffic_curve(hour: u32) -> f64 {
    35.0f64.mul_add(((f64::from(hour) - 9.0) * PI / 12.0).sin(), 40.0)
}

/// Diurnal AQI curve peaking mid-afternoon.
fn aqi_curve(hour: u32) -> f64 {
    50.0f64.mul_add(((f64::from(hour) - 14.0) * PI / 12.0).sin(), 90.0)
}

/// Generates `days * 24` hourly points ending at the hour containing `end`,
/// oldest first, with headline figures.
pub fn hourly_trend<R: Rng + ?Sized>(
    end: DateTime<FixedOffset>,
    days: u32,
    rng: &mut R,
) -> TrendReport {
    let end = end
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(end);
    let count = i64::from(days) * 24;

    let points: Vec<TrendPoint> = (0..count)
        .map(|i| {
            let at = end - TimeDelta::hours(count - 1 - i);
            let hour = at.hour();
            TrendPoint {
                timestamp: at.with_timezone(&Utc),
                hour,
                traffic_volume: (traffic_curve(hour) + f64::from(rng.random_range(-10_i32..=10)))
                    .max(15.0),
                aqi: (aqi_curve(hour) + f64::from(rng.random_range(-20_i32..=20))).clamp(30.0, 280.0),
            }
        })
        .collect();

    let traffic: Vec<f64> = points.iter().map(|p| p.traffic_volume).collect();
    let aqi: Vec<f64> = points.iter().map(|p| p.aqi).collect();
    let peak_hour = points
        .iter()
        .max_by(|a, b| a.traffic_volume.total_cmp(&b.traffic_volume))
        .map(|p| p.hour);

    TrendReport {
        average_traffic: stats::mean(&traffic),
        average_aqi: stats::mean(&aqi),
        correlation: stats::pearson(&traffic, &aqi),
        peak_hour,
        points,
    }
}

/// Generates the day-of-week by hour-of-day AQI matrix. Weekdays sit
/// higher than weekends and spike during commute hours.
pub fn pollution_matrix<R: Rng + ?Sized>(rng: &mut R) -> PollutionMatrix {
    let hours: Vec<u32> = (0..24).collect();

    let values = WEEKDAYS
        .iter()
        .map(|&day| {
            hours
                .iter()
                .map(|hour| {
                    let mut base = if is_weekend(day) { 65 } else { 90 };
                    if !is_weekend(day) && MATRIX_PEAK_HOURS.contains(hour) {
                        base += 45;
                    }
                    base + rng.random_range(-15..=15)
                })
                .collect()
        })
        .collect();

    PollutionMatrix {
        days: WEEKDAYS.iter().map(|&d| day_name(d).to_string()).collect(),
        hours,
        values,
    }
}

/// Scatters 3-7 sensors around each place with readings near the place's
/// own AQI and traffic.
pub fn sensor_clusters<R: Rng + ?Sized>(
    snapshots: &[CitySnapshot],
    rng: &mut R,
) -> SensorClusterReport {
    let mut sensors = Vec::new();

    for snapshot in snapshots {
        let count = rng.random_range(3_usize..=7);
        for _ in 0..count {
            let latitude = snapshot.latitude + rng.random_range(-SENSOR_SPREAD..=SENSOR_SPREAD);
            let longitude = snapshot.longitude + rng.random_range(-SENSOR_SPREAD..=SENSOR_SPREAD);
            let aqi = f64::from(snapshot.aqi) + f64::from(rng.random_range(-20_i32..=20));
            let traffic_density = snapshot.traffic_density + f64::from(rng.random_range(-15_i32..=15));

            sensors.push(Sensor {
                sensor_id: format!("APTG-{}", rng.random_range(1000_u16..=9999)),
                place_name: snapshot.place_name.clone(),
                latitude,
                longitude,
                aqi,
                traffic_density,
                status: SensorStatus::from_aqi(aqi),
            });
        }
    }

    let count = |status| sensors.iter().filter(|s| s.status == status).count();
    SensorClusterReport {
        normal: count(SensorStatus::Normal),
        elevated: count(SensorStatus::Elevated),
        critical: count(SensorStatus::Critical),
        sensors,
    }
}

/// Draws AQI samples for the [`TOP_PLACES`] worst places, plus
/// `always_include` if it is not already among them.
pub fn distributions<R: Rng + ?Sized>(
    snapshots: &[CitySnapshot],
    always_include: &str,
    rng: &mut R,
) -> Vec<PlaceDistribution> {
    let mut ranked: Vec<&CitySnapshot> = snapshots.iter().collect();
    ranked.sort_by(|a, b| b.aqi.cmp(&a.aqi));

    let mut selected: Vec<&CitySnapshot> = ranked.iter().take(TOP_PLACES).copied().collect();
    if !selected.iter().any(|s| s.place_name == always_include)
        && let Some(extra) = snapshots.iter().find(|s| s.place_name == always_include)
    {
        selected.push(extra);
    }

    selected
        .into_iter()
        .map(|snapshot| {
            let samples: Vec<f64> = match Normal::new(f64::from(snapshot.aqi), SAMPLE_STD_DEV) {
                Ok(normal) => (0..SAMPLES_PER_PLACE)
                    .map(|_| normal.sample(rng).clamp(10.0, 300.0))
                    .collect(),
                Err(e) => {
                    log::warn!("Invalid distribution for {}: {e}", snapshot.place_name);
                    Vec::new()
                }
            };

            PlaceDistribution {
                place_name: snapshot.place_name.clone(),
                summary: stats::summarize(&samples),
                samples,
            }
        })
        .collect()
}

/// Relates daily vehicle count, traffic density, and speed to AQI across
/// places.
#[must_use]
pub fn correlation_report(snapshots: &[CitySnapshot]) -> CorrelationReport {
    let aqi: Vec<f64> = snapshots.iter().map(|s| f64::from(s.aqi)).collect();
    let vehicles: Vec<f64> = snapshots.iter().map(|s| f64::from(s.vehicle_count)).collect();
    let density: Vec<f64> = snapshots.iter().map(|s| s.traffic_density).collect();
    let speed: Vec<f64> = snapshots.iter().map(|s| s.average_speed).collect();

    CorrelationReport {
        sample_size: snapshots.len(),
        vehicles_aqi: stats::pearson(&vehicles, &aqi),
        density_aqi: stats::pearson(&density, &aqi),
        speed_aqi: stats::pearson(&speed, &aqi),
        vehicles_fit: stats::linear_fit(&vehicles, &aqi),
    }
}

/// Connects every pair of the first [`NETWORK_NODES`] places with a corridor
/// weighted 50-500.
pub fn route_network<R: Rng + ?Sized>(snapshots: &[CitySnapshot], rng: &mut R) -> RouteNetwork {
    let nodes: Vec<String> = snapshots
        .iter()
        .take(NETWORK_NODES)
        .map(|s| s.place_name.clone())
        .collect();

    let mut edges = Vec::new();
    for (i, from) in nodes.iter().enumerate() {
        for to in &nodes[i + 1..] {
            edges.push(RouteEdge {
                from: from.clone(),
                to: to.clone(),
                weight: rng.random_range(50..=500),
            });
        }
    }

    RouteNetwork { nodes, edges }
}

/// Draws [`INCIDENT_SAMPLES`] incident reports uniformly over the categories
/// and counts them, most frequent first.
pub fn incident_frequencies<R: Rng + ?Sized>(rng: &mut R) -> IncidentReport {
    let mut counts = [0_usize; IncidentCategory::ALL.len()];
    for _ in 0..INCIDENT_SAMPLES {
        counts[rng.random_range(0..counts.len())] += 1;
    }

    let mut frequencies: Vec<IncidentFrequency> = IncidentCategory::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| IncidentFrequency { category, count })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

    IncidentReport {
        total: INCIDENT_SAMPLES,
        frequencies,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use city_monitor_geography::Registry;
    use city_monitor_geography_models::Coverage;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn snapshots(rng: &mut StdRng) -> Vec<CitySnapshot> {
        let registry = Registry::builtin();
        city_snapshots(&registry.at_coverage(Coverage::Cities), rng)
    }

    #[test]
    fn snapshots_respect_major_baselines() {
        let mut rng = rng();
        for _ in 0..20 {
            for s in snapshots(&mut rng) {
                if s.major {
                    assert!((100..=200).contains(&s.aqi), "{}: {}", s.place_name, s.aqi);
                    assert!((60.0..=90.0).contains(&s.traffic_density));
                    assert!((5_000..=50_000).contains(&s.vehicle_count));
                } else {
                    assert!((50..=120).contains(&s.aqi), "{}: {}", s.place_name, s.aqi);
                    assert!((30.0..=60.0).contains(&s.traffic_density));
                    assert!((50_000..=500_000).contains(&s.population));
                }
                assert!(s.incident_count <= 12);
                assert_eq!(s.traffic_band, TrafficBand::from_density(s.traffic_density));
                assert_eq!(s.traffic_color, s.traffic_band.color());
            }
        }
    }

    #[test]
    fn trend_covers_requested_days() {
        let end = FixedOffset::east_opt(19_800)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 12, 15, 40, 0)
            .unwrap();
        let report = hourly_trend(end, 7, &mut rng());

        assert_eq!(report.points.len(), 168);
        assert_eq!(report.points.last().unwrap().hour, 15);
        assert_eq!(report.points.first().unwrap().hour, 16);
        for pair in report.points.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, TimeDelta::hours(1));
        }
        for p in &report.points {
            assert!(p.traffic_volume >= 15.0);
            assert!((30.0..=280.0).contains(&p.aqi));
        }
        assert!(report.average_aqi.is_some());
        assert!(report.correlation.is_some());
        assert!(report.peak_hour.is_some_and(|h| h < 24));
    }

    #[test]
    fn empty_trend() {
        let end = Utc::now().fixed_offset();
        let report = hourly_trend(end, 0, &mut rng());
        assert!(report.points.is_empty());
        assert!(report.average_traffic.is_none());
        assert!(report.peak_hour.is_none());
    }

    #[test]
    fn matrix_shape_and_pattern() {
        let matrix = pollution_matrix(&mut rng());
        assert_eq!(matrix.days.len(), 7);
        assert_eq!(matrix.days[0], "Monday");
        assert_eq!(matrix.hours.len(), 24);

        for (row, day) in matrix.values.iter().zip(&matrix.days) {
            assert_eq!(row.len(), 24);
            let weekend = day == "Saturday" || day == "Sunday";
            for (hour, value) in row.iter().enumerate() {
                let peak = !weekend && [8, 9, 17, 18, 19].contains(&hour);
                let base = match (weekend, peak) {
                    (true, _) => 65,
                    (false, true) => 135,
                    (false, false) => 90,
                };
                assert!((base - 15..=base + 15).contains(value), "{day} {hour}: {value}");
            }
        }
    }

    #[test]
    fn sensors_stay_near_their_place() {
        let mut rng = rng();
        let snaps = snapshots(&mut rng);
        let report = sensor_clusters(&snaps, &mut rng);

        assert!(report.sensors.len() >= snaps.len() * 3);
        assert!(report.sensors.len() <= snaps.len() * 7);
        assert_eq!(
            report.normal + report.elevated + report.critical,
            report.sensors.len()
        );

        for sensor in &report.sensors {
            let place = snaps.iter().find(|s| s.place_name == sensor.place_name).unwrap();
            assert!((sensor.latitude - place.latitude).abs() <= SENSOR_SPREAD + 1e-9);
            assert!((sensor.aqi - f64::from(place.aqi)).abs() <= 20.0);
            assert!(sensor.sensor_id.starts_with("APTG-"));
            assert_eq!(sensor.sensor_id.len(), 9);
            assert_eq!(sensor.status, SensorStatus::from_aqi(sensor.aqi));
        }
    }

    #[test]
    fn distributions_pick_worst_places_and_anchor() {
        let mut rng = rng();
        let mut snaps = snapshots(&mut rng);
        for s in &mut snaps {
            s.aqi = if s.place_name == "Hyderabad" { 1 } else { 150 };
        }

        let dists = distributions(&snaps, "Hyderabad", &mut rng);
        assert_eq!(dists.len(), TOP_PLACES + 1);
        assert_eq!(dists.last().unwrap().place_name, "Hyderabad");

        for d in &dists {
            assert_eq!(d.samples.len(), SAMPLES_PER_PLACE);
            assert!(d.samples.iter().all(|v| (10.0..=300.0).contains(v)));
            let summary = d.summary.unwrap();
            assert!(summary.min <= summary.median && summary.median <= summary.max);
        }
    }

    #[test]
    fn distributions_do_not_duplicate_anchor() {
        let mut rng = rng();
        let mut snaps = snapshots(&mut rng);
        for s in &mut snaps {
            s.aqi = if s.place_name == "Hyderabad" { 250 } else { 60 };
        }
        let dists = distributions(&snaps, "Hyderabad", &mut rng);
        assert_eq!(dists.len(), TOP_PLACES);
        assert_eq!(dists[0].place_name, "Hyderabad");
    }

    #[test]
    fn correlation_over_snapshots() {
        let mut rng = rng();
        let snaps = snapshots(&mut rng);
        let report = correlation_report(&snaps);
        assert_eq!(report.sample_size, snaps.len());
        let r = report.vehicles_aqi.unwrap();
        assert!((-1.0..=1.0).contains(&r));
        let fit = report.vehicles_fit.unwrap();
        assert!((fit.r_squared - r * r).abs() < 1e-9);
    }

    #[test]
    fn route_network_connects_leading_places() {
        let mut rng = rng();
        let snaps = snapshots(&mut rng);
        let network = route_network(&snaps, &mut rng);

        assert_eq!(network.nodes.len(), NETWORK_NODES);
        assert_eq!(network.nodes[0], snaps[0].place_name);
        assert_eq!(network.edges.len(), NETWORK_NODES * (NETWORK_NODES - 1) / 2);
        for edge in &network.edges {
            assert!((50..=500).contains(&edge.weight));
            assert_ne!(edge.from, edge.to);
            let from = network.nodes.iter().position(|n| *n == edge.from).unwrap();
            let to = network.nodes.iter().position(|n| *n == edge.to).unwrap();
            assert!(from < to);
        }
    }

    #[test]
    fn route_network_with_few_places() {
        let mut rng = rng();
        let snaps = snapshots(&mut rng);

        let network = route_network(&snaps[..3], &mut rng);
        assert_eq!(network.nodes.len(), 3);
        assert_eq!(network.edges.len(), 3);

        let network = route_network(&[], &mut rng);
        assert!(network.nodes.is_empty());
        assert!(network.edges.is_empty());
    }

    #[test]
    fn incident_frequencies_account_for_every_report() {
        let report = incident_frequencies(&mut rng());

        assert_eq!(report.total, INCIDENT_SAMPLES);
        assert_eq!(
            report.frequencies.iter().map(|f| f.count).sum::<usize>(),
            INCIDENT_SAMPLES
        );
        assert!(report.frequencies.len() <= IncidentCategory::ALL.len());
        assert!(report.frequencies.iter().all(|f| f.count > 0));
        assert!(report.frequencies.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn incident_frequencies_are_seeded() {
        assert_eq!(incident_frequencies(&mut rng()), incident_frequencies(&mut rng()));
    }
}
