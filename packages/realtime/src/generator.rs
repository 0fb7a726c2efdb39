//! Observation generator.
//!
//! Traffic is always synthesized from a time-of-day baseline. Air quality
//! comes from the provider when it answers and from a simulation otherwise,
//! so [`Generator::generate`] is total.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike as _, FixedOffset, Local, Timelike as _, Utc, Weekday};
use city_monitor_air_quality::{AirQualityProvider, FetchOutcome, OfflineProvider};
use city_monitor_geography_models::Place;
use city_monitor_observation_models::{
    DataSource, ForecastPoint, MAX_AQI, MAX_TRAFFIC_DENSITY, Observation, Pollutants,
};
use rand::Rng;

/// Traffic baseline during weekday rush hour.
const RUSH_HOUR_TRAFFIC: i32 = 75;
/// Traffic baseline on weekends.
const WEEKEND_TRAFFIC: i32 = 30;
/// Traffic baseline otherwise.
const OFF_PEAK_TRAFFIC: i32 = 40;

/// Simulated AQI baseline during weekday rush hour.
const RUSH_HOUR_AQI: i32 = 140;
/// Simulated AQI baseline otherwise.
const OFF_PEAK_AQI: i32 = 80;

/// Floor for simulated PM2.5.
const MIN_SIMULATED_PM25: f64 = 10.0;

/// Returns `true` for local hours 08:00-10:00 and 17:00-21:00.
#[must_use]
pub const fn is_rush_hour(hour: u32) -> bool {
    matches!(hour, 8 | 9 | 17..=20)
}

/// Returns `true` for Saturday and Sunday.
#[must_use]
pub const fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Traffic density baseline (percent) before jitter.
#[must_use]
pub const fn traffic_baseline(hour: u32, weekday: Weekday) -> i32 {
    if is_weekend(weekday) {
        WEEKEND_TRAFFIC
    } else if is_rush_hour(hour) {
        RUSH_HOUR_TRAFFIC
    } else {
        OFF_PEAK_TRAFFIC
    }
}

/// Simulated AQI baseline before jitter.
#[must_use]
pub const fn simulated_aqi_baseline(hour: u32, weekday: Weekday) -> i32 {
    if is_rush_hour(hour) && !is_weekend(weekday) {
        RUSH_HOUR_AQI
    } else {
        OFF_PEAK_AQI
    }
}

/// Clamps a raw AQI into `[0, MAX_AQI]`.
fn clamp_aqi(raw: i32) -> u16 {
    u16::try_from(raw.clamp(0, i32::from(MAX_AQI))).unwrap_or(MAX_AQI)
}

/// Simulated AQI and pollutants for an unavailable provider.
fn simulate_air_quality<R: Rng + ?Sized>(
    hour: u32,
    weekday: Weekday,
    rng: &mut R,
) -> (u16, Pollutants) {
    let aqi = simulated_aqi_baseline(hour, weekday) + rng.random_range(-20..=20);

    let pm2_5 = (f64::from(aqi) / 3.0 + f64::from(rng.random_range(-10_i32..=15)))
        .max(MIN_SIMULATED_PM25);
    let pm10 = pm2_5.mul_add(1.5, f64::from(rng.random_range(-5_i32..=10)));
    let no2 = f64::from(rng.random_range(15_u32..=45));
    let so2 = f64::from(rng.random_range(5_u32..=20));
    let co = (rng.random_range(0.3..=1.2_f64) * 1000.0).round() / 1000.0;
    let o3 = f64::from(rng.random_range(30_u32..=80));

    (
        clamp_aqi(aqi),
        Pollutants {
            pm2_5,
            pm10,
            no2,
            so2,
            co,
            o3,
        },
    )
}

/// Builds an observation for `place` at local time `now` from a fetch
/// outcome. Pure apart from `rng`.
pub fn build_observation<R: Rng + ?Sized>(
    place: &Place,
    now: DateTime<FixedOffset>,
    outcome: FetchOutcome,
    rng: &mut R,
) -> Observation {
    let hour = now.hour();
    let weekday = now.weekday();

    let traffic = (traffic_baseline(hour, weekday) + rng.random_range(-15..=15)).clamp(0, 100);

    let (air_quality_index, pollutants, source) = match outcome {
        FetchOutcome::Live(reading) => (reading.aqi.min(MAX_AQI), reading.pollutants, DataSource::Live),
        FetchOutcome::Unavailable(reason) => {
            log::debug!("Simulating air quality for {}: {reason}", place.name);
            let (aqi, pollutants) = simulate_air_quality(hour, weekday, rng);
            (aqi, pollutants, DataSource::Simulated)
        }
    };

    Observation {
        timestamp: now.with_timezone(&Utc),
        place_name: place.name.clone(),
        latitude: place.latitude,
        longitude: place.longitude,
        traffic_density: f64::from(traffic).min(MAX_TRAFFIC_DENSITY),
        air_quality_index,
        pollutants: pollutants.clamp_non_negative(),
        vehicle_count: rng.random_range(1000..=8000),
        average_speed: f64::from(rng.random_range(20_u32..=60)),
        incident_count: rng.random_range(0..=3),
        source,
    }
}

/// Produces observations for places, enriching them with live air quality
/// when the provider answers.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn AirQualityProvider>,
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.provider.id())
            .finish()
    }
}

impl Generator {
    /// Creates a generator backed by `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn AirQualityProvider>) -> Self {
        Self { provider }
    }

    /// Creates a generator whose observations are always simulated.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineProvider))
    }

    /// Identifier of the backing provider.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    /// The backing provider.
    #[must_use]
    pub fn provider(&self) -> &dyn AirQualityProvider {
        self.provider.as_ref()
    }

    /// Generates one observation for `place`. Never fails: an unavailable
    /// provider yields a simulated observation.
    pub async fn generate(&self, place: &Place) -> Observation {
        let now = Local::now().fixed_offset();
        let outcome = self
            .provider
            .fetch_current(place.latitude, place.longitude)
            .await;

        let mut rng = rand::rng();
        build_observation(place, now, outcome, &mut rng)
    }

    /// Fetches the air quality forecast for `place`. Empty when the
    /// provider is unavailable.
    pub async fn forecast(&self, place: &Place, horizon_hours: u32) -> Vec<ForecastPoint> {
        self.provider
            .fetch_forecast(place.latitude, place.longitude, horizon_hours)
            .await
    }
}
