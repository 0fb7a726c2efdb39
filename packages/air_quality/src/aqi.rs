//! Conversions from provider readings to numeric AQI.

/// AQI assumed when the provider reports a category outside 1-5.
pub const DEFAULT_CATEGORY_AQI: u16 = 100;

/// PM2.5 breakpoints: `(conc_low, conc_high, aqi_low, aqi_high)`.
///
/// The last segment is also used for concentrations above its upper bound,
/// so very high PM2.5 extrapolates past 300.
const PM25_BREAKPOINTS: &[(f64, f64, f64, f64)] = &[
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
];

/// Maps the provider's 1-5 categorical index to an approximate AQI.
///
/// Unknown categories map to [`DEFAULT_CATEGORY_AQI`].
#[must_use]
pub const fn category_to_aqi(category: u8) -> u16 {
    match category {
        1 => 25,
        2 => 75,
        3 => 125,
        4 => 175,
        5 => 250,
        _ => DEFAULT_CATEGORY_AQI,
    }
}

/// Estimates AQI from a PM2.5 concentration (µg/m³) by linear
/// interpolation within the breakpoint segment containing it.
///
/// Negative concentrations are treated as zero.
#[must_use]
pub fn pm25_to_aqi(pm25: f64) -> f64 {
    let pm25 = pm25.max(0.0);

    let &(c_lo, c_hi, i_lo, i_hi) = PM25_BREAKPOINTS
        .iter()
        .find(|(_, c_hi, _, _)| pm25 <= *c_hi)
        .unwrap_or(&PM25_BREAKPOINTS[PM25_BREAKPOINTS.len() - 1]);

    (i_hi - i_lo) / (c_hi - c_lo) * (pm25 - c_lo) + i_lo
}
