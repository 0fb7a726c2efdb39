//! Fetcher configuration loaded from environment variables.

use std::time::Duration;

/// Default endpoint for current air pollution readings.
pub const DEFAULT_CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/air_pollution";

/// Default endpoint for air pollution forecasts.
pub const DEFAULT_FORECAST_URL: &str =
    "https://api.openweathermap.org/data/2.5/air_pollution/forecast";

/// Upper bound on a single request. A slow provider must never stall a
/// refresh cycle longer than this.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoints, credentials, and timeout for the air pollution provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Current-conditions endpoint.
    pub current_url: String,
    /// Forecast endpoint.
    pub forecast_url: String,
    /// Provider API key. Without one every fetch is unavailable.
    pub api_key: Option<String>,
    /// Per-request timeout, never above [`MAX_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            current_url: DEFAULT_CURRENT_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            api_key: None,
            timeout: MAX_TIMEOUT,
        }
    }
}

impl FetcherConfig {
    /// Reads configuration from the process environment:
    ///
    /// - `OPENWEATHER_API_KEY`
    /// - `AIR_QUALITY_CURRENT_URL`
    /// - `AIR_QUALITY_FORECAST_URL`
    /// - `AIR_QUALITY_TIMEOUT_SECS` (capped at 10)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup. Unset,
    /// empty, or unparseable values fall back to defaults, as does a zero
    /// timeout.
    #[must_use]
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout = non_empty("AIR_QUALITY_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map_or(defaults.timeout, Duration::from_secs);

        if non_empty("OPENWEATHER_API_KEY").is_none() {
            log::warn!("OPENWEATHER_API_KEY not set; air quality will be simulated");
        }

        Self {
            current_url: non_empty("AIR_QUALITY_CURRENT_URL").unwrap_or(defaults.current_url),
            forecast_url: non_empty("AIR_QUALITY_FORECAST_URL").unwrap_or(defaults.forecast_url),
            api_key: non_empty("OPENWEATHER_API_KEY"),
            timeout: timeout.min(MAX_TIMEOUT),
        }
    }

    /// Sets the per-request timeout, capped at [`MAX_TIMEOUT`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(MAX_TIMEOUT);
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Points both endpoints at `base_url`, appending the provider's
    /// `/air_pollution` and `/air_pollution/forecast` paths.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.current_url = format!("{base}/air_pollution");
        self.forecast_url = format!("{base}/air_pollution/forecast");
        self
    }
}
