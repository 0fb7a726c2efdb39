//! Per-session monitoring state.
//!
//! A [`Session`] is created when a viewer starts watching, mutated on every
//! refresh, and dropped when the viewer leaves. Nothing in it is shared with
//! other sessions except the read-only registry and the generator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use city_monitor_geography::{DEFAULT_PLACE, Registry};
use city_monitor_geography_models::{Coverage, Place};
use city_monitor_observation_models::Observation;

use crate::generator::Generator;
use crate::window::{RollingWindow, Snapshot};
use crate::{MonitorConfig, MonitorError};

/// State owned by one viewer.
#[derive(Debug)]
pub struct Session {
    registry: Arc<Registry>,
    generator: Arc<Generator>,
    window: RollingWindow,
    selected: String,
    coverage: Coverage,
}

impl Session {
    /// Creates a session with an empty window, city-level coverage, and the
    /// default place selected.
    #[must_use]
    pub fn new(registry: Arc<Registry>, generator: Arc<Generator>, config: &MonitorConfig) -> Self {
        let selected = if registry.contains(DEFAULT_PLACE) {
            DEFAULT_PLACE.to_string()
        } else {
            registry
                .all()
                .first()
                .map(|p| p.name.clone())
                .unwrap_or_default()
        };

        Self {
            registry,
            generator,
            window: RollingWindow::new(config.retention).with_fallback_count(config.fallback_count),
            selected,
            coverage: Coverage::default(),
        }
    }

    /// Generates and records a fresh observation for `place_name`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error before any fetch if the place is unknown.
    pub async fn refresh(&mut self, place_name: &str) -> Result<Observation, MonitorError> {
        let place = self.registry.lookup(place_name)?.clone();
        let observation = self.generator.generate(&place).await;
        self.window.record(observation.clone());
        Ok(observation)
    }

    /// Refreshes the selected place.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the selected place is unknown.
    pub async fn refresh_selected(&mut self) -> Result<Observation, MonitorError> {
        let selected = self.selected.clone();
        self.refresh(&selected).await
    }

    /// Records an externally generated observation.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the observation's place is not
    /// registered.
    pub fn record(&mut self, observation: Observation) -> Result<(), MonitorError> {
        self.registry.lookup(&observation.place_name)?;
        self.window.record(observation);
        Ok(())
    }

    /// Prunes at `now`, then snapshots `place_name`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the place is unknown.
    pub fn view(&mut self, place_name: &str, now: DateTime<Utc>) -> Result<Snapshot, MonitorError> {
        self.registry.lookup(place_name)?;
        self.window.prune(now);
        Ok(self.window.snapshot(place_name))
    }

    /// Selects the place watched by [`Self::refresh_selected`].
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the place is unknown.
    pub fn select_place(&mut self, place_name: &str) -> Result<&Place, MonitorError> {
        let place = self.registry.lookup(place_name)?;
        self.selected.clone_from(&place.name);
        Ok(place)
    }

    /// Name of the selected place.
    #[must_use]
    pub fn selected_place(&self) -> &str {
        &self.selected
    }

    /// Switches between city-only and city-plus-area place lists.
    pub const fn set_detail_level(&mut self, coverage: Coverage) {
        self.coverage = coverage;
    }

    /// Current place list coverage.
    #[must_use]
    pub const fn coverage(&self) -> Coverage {
        self.coverage
    }

    /// Places for the viewer's selector under the current coverage.
    #[must_use]
    pub fn places(&self) -> Vec<&Place> {
        self.registry.at_coverage(self.coverage)
    }

    /// The session's window.
    #[must_use]
    pub const fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// The generator shared by this session.
    #[must_use]
    pub const fn generator(&self) -> &Arc<Generator> {
        &self.generator
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeDelta;
    use city_monitor_observation_models::{DataSource, Pollutants};

    use super::*;

    fn session() -> Session {
        Session::new(
            Arc::new(Registry::builtin()),
            Arc::new(Generator::offline()),
            &MonitorConfig::default(),
        )
    }

    fn obs(place: &str, timestamp: DateTime<Utc>) -> Observation {
        Observation {
            timestamp,
            place_name: place.to_string(),
            latitude: 16.3,
            longitude: 80.4,
            traffic_density: 50.0,
            air_quality_index: 90,
            pollutants: Pollutants::default(),
            vehicle_count: 3000,
            average_speed: 40.0,
            incident_count: 0,
            source: DataSource::Simulated,
        }
    }

    #[test]
    fn starts_on_default_place_with_city_coverage() {
        let session = session();
        assert_eq!(session.selected_place(), "Hyderabad");
        assert_eq!(session.coverage(), Coverage::Cities);
        assert_eq!(session.places().len(), 23);
        assert!(session.window().is_empty());
    }

    #[tokio::test]
    async fn refresh_unknown_place_fails_without_recording() {
        let mut session = session();
        let err = session.refresh("Atlantis").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(session.window().is_empty());
    }

    #[tokio::test]
    async fn refresh_records_observation() {
        let mut session = session();
        let observation = session.refresh("Guntur").await.unwrap();
        assert_eq!(observation.place_name, "Guntur");
        assert_eq!(session.window().len(), 1);

        let snapshot = session.view("Guntur", Utc::now()).unwrap();
        assert!(!snapshot.is_fallback());
        assert_eq!(snapshot.observations, vec![observation]);
    }

    #[tokio::test]
    async fn refresh_selected_uses_selection() {
        let mut session = session();
        session.select_place("Khammam").unwrap();
        let observation = session.refresh_selected().await.unwrap();
        assert_eq!(observation.place_name, "Khammam");
    }

    #[test]
    fn record_rejects_unknown_place() {
        let mut session = session();
        let err = session.record(obs("Atlantis", Utc::now())).unwrap_err();
        assert!(err.is_not_found());
        assert!(session.window().is_empty());
    }

    #[test]
    fn view_falls_back_when_place_has_no_entries() {
        let mut session = session();
        let now = Utc::now();
        for i in 0..12 {
            session
                .record(obs("Guntur", now - TimeDelta::seconds(12 - i)))
                .unwrap();
        }

        let snapshot = session.view("Vijayawada", now).unwrap();
        assert!(snapshot.is_fallback());
        assert_eq!(snapshot.len(), 10);
    }

    #[test]
    fn view_prunes_expired_entries() {
        let mut session = Session::new(
            Arc::new(Registry::builtin()),
            Arc::new(Generator::offline()),
            &MonitorConfig {
                retention: Duration::from_secs(60),
                ..MonitorConfig::default()
            },
        );
        let now = Utc::now();
        session.record(obs("Guntur", now - TimeDelta::seconds(50))).unwrap();
        session.record(obs("Guntur", now - TimeDelta::seconds(10))).unwrap();
        assert_eq!(session.window().len(), 2);

        let snapshot = session.view("Guntur", now + TimeDelta::seconds(30)).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(session.window().len(), 1);
    }

    #[test]
    fn selection_and_coverage() {
        let mut session = session();
        assert!(session.select_place("Nowhere").is_err());
        assert_eq!(session.selected_place(), "Hyderabad");

        session.set_detail_level(Coverage::CitiesAndAreas);
        assert_eq!(session.places().len(), 38);
        let place = session.select_place("Gachibowli").unwrap();
        assert_eq!(place.name, "Gachibowli");
        assert_eq!(session.selected_place(), "Gachibowli");
    }
}
