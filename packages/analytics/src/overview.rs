//! Current AQI across places.
//!
//! Fetches live air quality for every place with bounded concurrency. A
//! place whose fetch fails gets a randomized AQI from its major/non-major
//! range so the overview is always complete.

use city_monitor_air_quality::{AirQualityProvider, FetchOutcome};
use city_monitor_analytics_models::{AqiOverview, AqiOverviewEntry};
use city_monitor_geography_models::Place;
use city_monitor_observation_models::{AqiBand, DataSource};
use futures::stream::{self, StreamExt as _};
use rand::Rng;

use crate::stats;

/// Default number of concurrent provider requests.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Fetches current AQI for `places` and builds the overview.
pub async fn aqi_overview(
    places: &[&Place],
    provider: &dyn AirQualityProvider,
    concurrency: usize,
) -> AqiOverview {
    log::debug!(
        "Fetching AQI overview for {} places via {} (concurrency={concurrency})",
        places.len(),
        provider.id()
    );

    let outcomes: Vec<FetchOutcome> = stream::iter(places.iter().map(|place| {
        provider.fetch_current(place.latitude, place.longitude)
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await;

    let mut rng = rand::rng();
    build_overview(places, outcomes, &mut rng)
}

/// Builds the overview from per-place fetch outcomes (same order as
/// `places`). Entries are sorted by descending AQI.
pub fn build_overview<R: Rng + ?Sized>(
    places: &[&Place],
    outcomes: Vec<FetchOutcome>,
    rng: &mut R,
) -> AqiOverview {
    let mut entries: Vec<AqiOverviewEntry> = places
        .iter()
        .zip(outcomes)
        .map(|(place, outcome)| {
            let (aqi, source) = match outcome {
                FetchOutcome::Live(reading) => (reading.aqi, DataSource::Live),
                FetchOutcome::Unavailable(_) if place.major => {
                    (rng.random_range(100..=200), DataSource::Simulated)
                }
                FetchOutcome::Unavailable(_) => (rng.random_range(50..=120), DataSource::Simulated),
            };
            let band = AqiBand::from_aqi(f64::from(aqi));

            AqiOverviewEntry {
                place_name: place.name.clone(),
                region: place.region.clone(),
                latitude: place.latitude,
                longitude: place.longitude,
                aqi,
                band,
                color: band.color().to_string(),
                source,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.aqi.cmp(&a.aqi));

    let values: Vec<f64> = entries.iter().map(|e| f64::from(e.aqi)).collect();
    let live_count = entries
        .iter()
        .filter(|e| e.source == DataSource::Live)
        .count();

    AqiOverview {
        average_aqi: stats::mean(&values),
        live_count,
        entries,
    }
}
