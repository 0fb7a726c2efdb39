#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics views over the monitored places.
//!
//! [`synthetic`] generates the city profiles, trend series, pollution
//! matrix, sensor clusters, distributions, route network, and incident
//! counts behind the dashboard's analysis pages. [`overview`] builds the current AQI overview from the
//! live provider. [`stats`] holds the summary statistics they share.

pub mod overview;
pub mod stats;
pub mod synthetic;

pub use overview::aqi_overview;
