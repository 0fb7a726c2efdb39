//! Rolling window of recent observations.
//!
//! Entries are kept in arrival order. Every [`RollingWindow::record`] first
//! prunes the whole store at the incoming observation's timestamp, so the
//! window never grows past what the retention allows.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use city_monitor_observation_models::{DataSource, Observation};

use crate::{DEFAULT_FALLBACK_COUNT, DEFAULT_RETENTION};

/// Whether a snapshot holds the requested place or a fallback sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope {
    /// Entries for the requested place.
    Place,
    /// The requested place had no entries; holds the most recent entries
    /// across all places.
    Fallback,
}

/// Read view of a window for one place.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Place the snapshot was requested for.
    pub place_name: String,
    /// Whether `observations` belong to `place_name`.
    pub scope: SnapshotScope,
    /// Entries in arrival order.
    pub observations: Vec<Observation>,
}

/// Headline figures for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    /// AQI of the newest entry.
    pub latest_aqi: u16,
    /// Change in AQI against the previous entry (0 with a single entry).
    pub aqi_delta: i32,
    /// Traffic density of the newest entry.
    pub latest_traffic: f64,
    /// Change in traffic density against the previous entry.
    pub traffic_delta: f64,
    /// Average speed of the newest entry.
    pub latest_speed: f64,
    /// Sum of incidents across the snapshot.
    pub total_incidents: u32,
    /// Entries whose air quality came from the provider.
    pub live_count: usize,
    /// Entries whose air quality was simulated.
    pub simulated_count: usize,
}

impl Snapshot {
    /// Returns `true` if the requested place had no entries.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.scope == SnapshotScope::Fallback
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns `true` if the snapshot has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Computes headline figures. `None` for an empty snapshot.
    #[must_use]
    pub fn summary(&self) -> Option<WindowSummary> {
        let latest = self.observations.last()?;
        let previous = self
            .observations
            .len()
            .checked_sub(2)
            .map_or(latest, |idx| &self.observations[idx]);

        let live_count = self
            .observations
            .iter()
            .filter(|o| o.source == DataSource::Live)
            .count();

        Some(WindowSummary {
            latest_aqi: latest.air_quality_index,
            aqi_delta: i32::from(latest.air_quality_index) - i32::from(previous.air_quality_index),
            latest_traffic: latest.traffic_density,
            traffic_delta: latest.traffic_density - previous.traffic_density,
            latest_speed: latest.average_speed,
            total_incidents: self
                .observations
                .iter()
                .map(|o| u32::from(o.incident_count))
                .sum(),
            live_count,
            simulated_count: self.observations.len() - live_count,
        })
    }
}

/// Append-only observation buffer bounded by a retention duration.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    entries: VecDeque<Observation>,
    retention: TimeDelta,
    fallback_count: usize,
    in_order: bool,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl RollingWindow {
    /// Creates an empty window keeping entries for `retention`.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            retention: TimeDelta::from_std(retention).unwrap_or(TimeDelta::MAX),
            fallback_count: DEFAULT_FALLBACK_COUNT,
            in_order: true,
        }
    }

    /// Sets how many entries a fallback snapshot returns.
    #[must_use]
    pub const fn with_fallback_count(mut self, fallback_count: usize) -> Self {
        self.fallback_count = fallback_count;
        self
    }

    /// Retention duration.
    #[must_use]
    pub fn retention(&self) -> Duration {
        self.retention.to_std().unwrap_or(Duration::MAX)
    }

    /// Prunes at the observation's timestamp, then appends it.
    pub fn record(&mut self, observation: Observation) {
        self.prune(observation.timestamp);

        if self
            .entries
            .back()
            .is_some_and(|last| observation.timestamp < last.timestamp)
        {
            self.in_order = false;
        }
        self.entries.push_back(observation);
    }

    /// Removes entries older than `now - retention`. Idempotent.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let Some(cutoff) = now.checked_sub_signed(self.retention) else {
            return;
        };
        let before = self.entries.len();

        if self.in_order {
            while self.entries.front().is_some_and(|o| o.timestamp < cutoff) {
                self.entries.pop_front();
            }
        } else {
            self.entries.retain(|o| o.timestamp >= cutoff);
            self.in_order = self
                .entries
                .iter()
                .zip(self.entries.iter().skip(1))
                .all(|(a, b)| a.timestamp <= b.timestamp);
        }

        let removed = before - self.entries.len();
        if removed > 0 {
            log::trace!("Pruned {removed} observation(s) older than {cutoff}");
        }
    }

    /// Entries for `place_name` in arrival order. If there are none, the
    /// most recent entries across all places, flagged as a fallback.
    #[must_use]
    pub fn snapshot(&self, place_name: &str) -> Snapshot {
        let observations: Vec<Observation> = self
            .entries
            .iter()
            .filter(|o| o.place_name == place_name)
            .cloned()
            .collect();

        if !observations.is_empty() {
            return Snapshot {
                place_name: place_name.to_string(),
                scope: SnapshotScope::Place,
                observations,
            };
        }

        let skip = self.entries.len().saturating_sub(self.fallback_count);
        Snapshot {
            place_name: place_name.to_string(),
            scope: SnapshotScope::Fallback,
            observations: self.entries.iter().skip(skip).cloned().collect(),
        }
    }

    /// All entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use city_monitor_observation_models::Pollutants;

    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn obs(place: &str, secs: i64, aqi: u16) -> Observation {
        Observation {
            timestamp: t0() + TimeDelta::seconds(secs),
            place_name: place.to_string(),
            latitude: 16.5,
            longitude: 80.6,
            traffic_density: 40.0,
            air_quality_index: aqi,
            pollutants: Pollutants::default(),
            vehicle_count: 2000,
            average_speed: 35.0,
            incident_count: 1,
            source: DataSource::Simulated,
        }
    }

    #[test]
    fn record_prunes_old_entries() {
        let mut window = RollingWindow::new(Duration::from_secs(180));
        window.record(obs("Guntur", 0, 80));
        window.record(obs("Guntur", 100, 80));
        window.record(obs("Guntur", 200, 80));

        assert_eq!(window.len(), 2);
        let cutoff = t0() + TimeDelta::seconds(20);
        assert!(window.iter().all(|o| o.timestamp >= cutoff));
    }

    #[test]
    fn record_prunes_other_places() {
        let mut window = RollingWindow::new(Duration::from_secs(180));
        window.record(obs("Guntur", 0, 80));
        window.record(obs("Warangal", 200, 90));

        assert_eq!(window.len(), 1);
        assert!(window.iter().all(|o| o.place_name == "Warangal"));
        assert!(window.snapshot("Guntur").is_fallback());
    }

    #[test]
    fn entry_exactly_at_cutoff_is_kept() {
        let mut window = RollingWindow::new(Duration::from_secs(180));
        window.record(obs("Guntur", 0, 80));
        window.prune(t0() + TimeDelta::seconds(180));
        assert_eq!(window.len(), 1);
        window.prune(t0() + TimeDelta::seconds(181));
        assert!(window.is_empty());
    }

    #[test]
    fn prune_is_idempotent() {
        let mut window = RollingWindow::new(Duration::from_secs(60));
        for secs in 0..30 {
            window.record(obs("Eluru", secs * 5, 70));
        }
        let now = t0() + TimeDelta::seconds(150);
        window.prune(now);
        let once: Vec<_> = window.iter().cloned().collect();
        window.prune(now);
        let twice: Vec<_> = window.iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn retention_holds_after_every_record() {
        let retention = Duration::from_secs(30);
        let mut window = RollingWindow::new(retention);
        for step in 0..100 {
            let o = obs("Kurnool", step * 2, 90);
            let now = o.timestamp;
            window.record(o);
            let cutoff = now - TimeDelta::seconds(30);
            assert!(window.iter().all(|o| o.timestamp >= cutoff));
        }
    }

    #[test]
    fn out_of_order_records_are_pruned() {
        let mut window = RollingWindow::new(Duration::from_secs(60));
        window.record(obs("Ongole", 50, 80));
        window.record(obs("Ongole", 10, 80));
        window.record(obs("Ongole", 55, 80));
        window.prune(t0() + TimeDelta::seconds(100));
        assert_eq!(window.len(), 2);
        assert!(window.iter().all(|o| o.timestamp >= t0() + TimeDelta::seconds(40)));
    }

    #[test]
    fn snapshot_filters_by_place_in_arrival_order() {
        let mut window = RollingWindow::default();
        window.record(obs("Guntur", 0, 60));
        window.record(obs("Kakinada", 1, 70));
        window.record(obs("Guntur", 2, 80));

        let snapshot = window.snapshot("Guntur");
        assert!(!snapshot.is_fallback());
        let aqis: Vec<u16> = snapshot.observations.iter().map(|o| o.air_quality_index).collect();
        assert_eq!(aqis, vec![60, 80]);
    }

    #[test]
    fn snapshot_falls_back_to_most_recent_ten() {
        let mut window = RollingWindow::default();
        for i in 0..15 {
            window.record(obs("Guntur", i, u16::try_from(i).unwrap()));
        }

        let snapshot = window.snapshot("Vijayawada");
        assert!(snapshot.is_fallback());
        assert_eq!(snapshot.place_name, "Vijayawada");
        assert_eq!(snapshot.len(), 10);
        assert!(snapshot.observations.iter().all(|o| o.place_name == "Guntur"));
        let aqis: Vec<u16> = snapshot.observations.iter().map(|o| o.air_quality_index).collect();
        assert_eq!(aqis, (5..15).collect::<Vec<u16>>());
    }

    #[test]
    fn fallback_of_empty_window_is_empty() {
        let snapshot = RollingWindow::default().snapshot("Guntur");
        assert!(snapshot.is_fallback());
        assert!(snapshot.is_empty());
        assert!(snapshot.summary().is_none());
    }

    #[test]
    fn fallback_count_is_configurable() {
        let mut window = RollingWindow::default().with_fallback_count(3);
        for i in 0..5 {
            window.record(obs("Guntur", i, 50));
        }
        assert_eq!(window.snapshot("Chittoor").len(), 3);
    }

    #[test]
    fn summary_reports_latest_and_deltas() {
        let mut window = RollingWindow::default();
        let mut first = obs("Nellore", 0, 90);
        first.traffic_density = 50.0;
        let mut second = obs("Nellore", 2, 110);
        second.traffic_density = 45.5;
        second.average_speed = 28.0;
        second.incident_count = 3;
        second.source = DataSource::Live;
        window.record(first);
        window.record(second);

        let summary = window.snapshot("Nellore").summary().unwrap();
        assert_eq!(summary.latest_aqi, 110);
        assert_eq!(summary.aqi_delta, 20);
        assert!((summary.latest_traffic - 45.5).abs() < f64::EPSILON);
        assert!((summary.traffic_delta + 4.5).abs() < f64::EPSILON);
        assert!((summary.latest_speed - 28.0).abs() < f64::EPSILON);
        assert_eq!(summary.total_incidents, 4);
        assert_eq!(summary.live_count, 1);
        assert_eq!(summary.simulated_count, 1);
    }

    #[test]
    fn single_entry_summary_has_zero_delta() {
        let mut window = RollingWindow::default();
        window.record(obs("Kadapa", 0, 75));
        let summary = window.snapshot("Kadapa").summary().unwrap();
        assert_eq!(summary.aqi_delta, 0);
        assert!(summary.traffic_delta.abs() < f64::EPSILON);
    }
}
