#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Registry of monitored places.
//!
//! Holds the 23 Andhra Pradesh and Telangana cities plus the 15 Hyderabad
//! sub-areas in a single read-only [`Registry`]. Callers pick how much of it
//! they want to see with a [`Coverage`] filter instead of merging tables at
//! runtime.

pub mod registry;

use std::collections::BTreeMap;

use city_monitor_geography_models::{Coverage, DetailLevel, Place};
use thiserror::Error;

/// Place selected when a caller has not chosen one.
pub const DEFAULT_PLACE: &str = "Hyderabad";

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// No place with this name is registered.
    #[error("Unknown place: {name}")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },

    /// Two places share a name.
    #[error("Duplicate place name: {name}")]
    Duplicate {
        /// The repeated name.
        name: String,
    },

    /// A place has coordinates outside WGS84 bounds.
    #[error("Place {name} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        /// Place name.
        name: String,
        /// Offending latitude.
        latitude: f64,
        /// Offending longitude.
        longitude: f64,
    },
}

/// Read-only place registry. Identity is the place name.
#[derive(Debug, Clone)]
pub struct Registry {
    places: Vec<Place>,
    by_name: BTreeMap<String, usize>,
}

impl Registry {
    /// Builds a registry from places in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::Duplicate`] if two places share a name and
    /// [`GeographyError::InvalidCoordinates`] if a place lies outside WGS84
    /// bounds.
    pub fn new(places: Vec<Place>) -> Result<Self, GeographyError> {
        let mut by_name = BTreeMap::new();

        for (idx, place) in places.iter().enumerate() {
            if !place.has_valid_coordinates() {
                return Err(GeographyError::InvalidCoordinates {
                    name: place.name.clone(),
                    latitude: place.latitude,
                    longitude: place.longitude,
                });
            }
            if by_name.insert(place.name.clone(), idx).is_some() {
                return Err(GeographyError::Duplicate {
                    name: place.name.clone(),
                });
            }
        }

        Ok(Self { places, by_name })
    }

    /// Builds the registry from the embedded place files.
    ///
    /// # Panics
    ///
    /// Panics if the embedded data is malformed or contains duplicates.
    /// Both are development errors covered by the [`registry`] tests.
    #[must_use]
    pub fn builtin() -> Self {
        let places = registry::builtin_places();
        log::debug!("Loaded {} places from embedded registry", places.len());
        Self::new(places).unwrap_or_else(|e| panic!("Invalid embedded place registry: {e}"))
    }

    /// Looks up a place by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::NotFound`] if the name is not registered.
    pub fn lookup(&self, name: &str) -> Result<&Place, GeographyError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.places[idx])
            .ok_or_else(|| GeographyError::NotFound {
                name: name.to_string(),
            })
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All places in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Place] {
        &self.places
    }

    /// Places visible under `coverage`: cities first, then sub-areas, each
    /// group in insertion order.
    #[must_use]
    pub fn at_coverage(&self, coverage: Coverage) -> Vec<&Place> {
        let cities = self
            .places
            .iter()
            .filter(|p| p.detail == DetailLevel::City);
        let areas = self
            .places
            .iter()
            .filter(move |p| p.detail == DetailLevel::Area && coverage.includes(p.detail));
        cities.chain(areas).collect()
    }

    /// Number of registered places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Returns `true` if the registry holds no places.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
