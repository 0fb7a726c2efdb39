#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place and coordinate types for monitored cities and areas.
//!
//! A [`Place`] is a named point (city centre or sub-area) that observations
//! are produced for. Places are static: they are loaded once at startup and
//! never mutated.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Granularity of a place within the registry.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DetailLevel {
    /// A whole city (coarse list).
    #[default]
    City,
    /// A neighbourhood or sub-area inside a city.
    Area,
}

/// Which places a caller wants to see from the registry.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Coverage {
    /// Only [`DetailLevel::City`] places.
    #[default]
    Cities,
    /// Cities followed by every sub-area.
    #[strum(to_string = "cities_and_areas", serialize = "all")]
    #[serde(alias = "all")]
    CitiesAndAreas,
}

impl Coverage {
    /// Returns `true` if a place at `detail` is visible under this coverage.
    #[must_use]
    pub const fn includes(self, detail: DetailLevel) -> bool {
        match self {
            Self::Cities => matches!(detail, DetailLevel::City),
            Self::CitiesAndAreas => true,
        }
    }
}

/// A monitored place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Unique place name (e.g. "Hyderabad", "Gachibowli").
    pub name: String,
    /// Latitude (WGS84), within [-90, 90].
    pub latitude: f64,
    /// Longitude (WGS84), within [-180, 180].
    pub longitude: f64,
    /// State or parent region, if known (e.g. "Telangana").
    #[serde(default)]
    pub region: Option<String>,
    /// City or sub-area.
    #[serde(default)]
    pub detail: DetailLevel,
    /// Whether this is one of the major metropolitan centres. Analytics
    /// generators use higher baselines for these.
    #[serde(default)]
    pub major: bool,
}

impl Place {
    /// Returns `true` if the coordinates are within WGS84 bounds.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// On-disk shape of a place definition file.
///
/// ```toml
/// region = "Telangana"
/// detail = "city"
///
/// [[places]]
/// name = "Hyderabad"
/// latitude = 17.385
/// longitude = 78.4867
/// major = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceFile {
    /// Region applied to every entry that does not set its own.
    #[serde(default)]
    pub region: Option<String>,
    /// Detail level applied to every entry that does not set its own.
    #[serde(default)]
    pub detail: Option<DetailLevel>,
    /// Place entries in file order.
    pub places: Vec<PlaceEntry>,
}

/// A single `[[places]]` entry in a [`PlaceFile`].
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceEntry {
    /// Unique place name.
    pub name: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Overrides the file-level region.
    #[serde(default)]
    pub region: Option<String>,
    /// Overrides the file-level detail level.
    #[serde(default)]
    pub detail: Option<DetailLevel>,
    /// Major metropolitan centre.
    #[serde(default)]
    pub major: bool,
}

impl PlaceFile {
    /// Flattens the file into [`Place`]s, applying file-level defaults.
    #[must_use]
    pub fn into_places(self) -> Vec<Place> {
        let Self {
            region,
            detail,
            places,
        } = self;

        places
            .into_iter()
            .map(|entry| Place {
                name: entry.name,
                latitude: entry.latitude,
                longitude: entry.longitude,
                region: entry.region.or_else(|| region.clone()),
                detail: entry.detail.or(detail).unwrap_or_default(),
                major: entry.major,
            })
            .collect()
    }
}
