//! Compile-time registry of monitored place definitions.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a new region requires creating a TOML file in `places/` and adding
//! a corresponding entry here.

use city_monitor_geography_models::{Place, PlaceFile};

/// Number of embedded places across all files. Enforced by a test.
#[cfg(test)]
pub const EXPECTED_PLACE_COUNT: usize = 38;

/// Embedded TOML place files, in registry order (cities before areas).
const PLACE_TOMLS: &[(&str, &str)] = &[
    ("telangana", include_str!("../places/telangana.toml")),
    ("andhra_pradesh", include_str!("../places/andhra_pradesh.toml")),
    ("hyderabad_areas", include_str!("../places/hyderabad_areas.toml")),
];

/// Returns every embedded place in file order.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn builtin_places() -> Vec<Place> {
    PLACE_TOMLS
        .iter()
        .flat_map(|(name, toml_str)| {
            let file: PlaceFile = toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse place file '{name}': {e}"));
            file.into_places()
        })
        .collect()
}
