#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Real-time monitoring core.
//!
//! A [`generator::Generator`] produces one observation per place, preferring
//! live air quality and falling back to a time-of-day-aware simulation. A
//! [`session::Session`] owns a [`window::RollingWindow`] of recent
//! observations, and a [`refresh::RefreshDriver`] re-runs the
//! generate-then-record cycle at a fixed cadence.

pub mod generator;
pub mod refresh;
pub mod session;
pub mod window;

use std::time::Duration;

use city_monitor_geography::GeographyError;
use thiserror::Error;

pub use generator::Generator;
pub use refresh::{RefreshDriver, StopHandle};
pub use session::Session;
pub use window::{RollingWindow, Snapshot, SnapshotScope, WindowSummary};

/// Default window retention (3 minutes).
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(180);

/// Default refresh cadence.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of entries returned by a fallback snapshot.
pub const DEFAULT_FALLBACK_COUNT: usize = 10;

/// Default idle time after which a server session is dropped (30 minutes).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(1800);

/// Errors that can occur in the monitoring core.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Place lookup failed.
    #[error(transparent)]
    Geography(#[from] GeographyError),
}

impl MonitorError {
    /// Returns `true` if the error is an unknown place.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Geography(GeographyError::NotFound { .. }))
    }
}

/// Window and refresh settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How long observations stay in a session window.
    pub retention: Duration,
    /// Refresh cadence for watchers.
    pub refresh_interval: Duration,
    /// Entries returned when a snapshot falls back to all places.
    pub fallback_count: usize,
    /// Idle time after which a server session is dropped.
    pub session_ttl: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            fallback_count: DEFAULT_FALLBACK_COUNT,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl MonitorConfig {
    /// Reads `WINDOW_RETENTION_SECS`, `REFRESH_INTERVAL_SECS`,
    /// `WINDOW_FALLBACK_COUNT`, and `SESSION_TTL_SECS` from the process
    /// environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup. Unset,
    /// zero, or unparseable values fall back to defaults.
    #[must_use]
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
        };
        let secs = |key: &str| positive(key).map(Duration::from_secs);
        let defaults = Self::default();

        Self {
            retention: secs("WINDOW_RETENTION_SECS").unwrap_or(defaults.retention),
            refresh_interval: secs("REFRESH_INTERVAL_SECS").unwrap_or(defaults.refresh_interval),
            fallback_count: positive("WINDOW_FALLBACK_COUNT")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.fallback_count),
            session_ttl: secs("SESSION_TTL_SECS").unwrap_or(defaults.session_ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MonitorConfig::from_vars(|_| None);
        assert_eq!(config.retention, Duration::from_secs(180));
        assert_eq!(config.refresh_interval, Duration::from_secs(2));
        assert_eq!(config.fallback_count, 10);
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn config_overrides_and_rejects_zero() {
        let config = MonitorConfig::from_vars(|key| match key {
            "WINDOW_RETENTION_SECS" => Some("60".to_string()),
            "REFRESH_INTERVAL_SECS" => Some("0".to_string()),
            "WINDOW_FALLBACK_COUNT" => Some("5".to_string()),
            "SESSION_TTL_SECS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.retention, Duration::from_secs(60));
        assert_eq!(config.refresh_interval, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.fallback_count, 5);
        assert_eq!(config.session_ttl, DEFAULT_SESSION_TTL);
    }

    #[test]
    fn not_found_classification() {
        let err: MonitorError = GeographyError::NotFound {
            name: "Atlantis".to_string(),
        }
        .into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Unknown place: Atlantis");
    }
}
