//! Subcommand implementations.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use city_monitor_air_quality::OpenWeatherProvider;
use city_monitor_geography::Registry;
use city_monitor_geography_models::Coverage;
use city_monitor_realtime::{Generator, MonitorConfig, RefreshDriver, Session};
use tokio::sync::Mutex;

use crate::display;

/// Registry, generator, and settings shared by every subcommand.
pub struct Monitor {
    pub registry: Arc<Registry>,
    pub generator: Arc<Generator>,
    pub config: MonitorConfig,
}

impl Monitor {
    /// Builds the monitor from the built-in registry and the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            registry: Arc::new(Registry::builtin()),
            generator: Arc::new(Generator::new(Arc::new(OpenWeatherProvider::from_env()))),
            config: MonitorConfig::from_env(),
        }
    }
}

/// Options for [`watch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Refresh interval; the configured default when `None`.
    pub interval: Option<Duration>,
    /// Stop after this many refreshes; runs until Ctrl-C when `None`.
    pub count: Option<usize>,
}

/// Prints the places visible under `coverage`.
pub fn places(monitor: &Monitor, coverage: Coverage) {
    for place in monitor.registry.at_coverage(coverage) {
        println!("{}", display::place_line(place));
    }
}

/// Generates and prints one observation.
///
/// # Errors
///
/// * If the place is not registered
pub async fn sample(monitor: &Monitor, place_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let place = monitor.registry.lookup(place_name)?;
    let observation = monitor.generator.generate(place).await;
    println!("{}", display::observation_line(&observation));
    Ok(())
}

/// Refreshes `place_name` at a fixed cadence, printing each observation and
/// the window summary, until the count is reached or Ctrl-C is pressed.
///
/// # Errors
///
/// * If the place is not registered
pub async fn watch(
    monitor: &Monitor,
    place_name: &str,
    options: WatchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(
        Arc::clone(&monitor.registry),
        Arc::clone(&monitor.generator),
        &monitor.config,
    );
    let place = session.select_place(place_name)?.name.clone();

    let mut driver = RefreshDriver::new(options.interval.unwrap_or(monitor.config.refresh_interval));
    let stop = driver.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    println!(
        "Watching {place} every {:.1}s via {} (Ctrl-C to stop)",
        driver.period().as_secs_f64(),
        monitor.generator.provider_id()
    );

    let session = Arc::new(Mutex::new(session));
    let mut remaining = options.count;

    let completed = driver
        .run(|| {
            let session = Arc::clone(&session);
            let last = remaining.as_mut().is_some_and(|n| {
                *n = n.saturating_sub(1);
                *n == 0
            });

            async move {
                let mut session = session.lock().await;
                let observation = match session.refresh_selected().await {
                    Ok(observation) => observation,
                    Err(e) => {
                        log::error!("Refresh failed: {e}");
                        return ControlFlow::Break(());
                    }
                };
                println!("{}", display::observation_line(&observation));

                let selected = session.selected_place().to_string();
                if let Ok(snapshot) = session.view(&selected, Utc::now())
                    && let Some(summary) = snapshot.summary()
                {
                    println!(
                        "{}",
                        display::summary_line(&summary, snapshot.len(), snapshot.is_fallback())
                    );
                }

                if last {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        })
        .await;

    log::info!("Stopped watching {place} after {completed} refresh(es)");
    Ok(())
}

/// Prints the air quality forecast for `place_name`.
///
/// # Errors
///
/// * If the place is not registered
pub async fn forecast(
    monitor: &Monitor,
    place_name: &str,
    hours: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let place = monitor.registry.lookup(place_name)?;
    let points = monitor.generator.forecast(place, hours).await;

    if points.is_empty() {
        println!("No forecast available for {} (provider unavailable)", place.name);
        return Ok(());
    }

    println!("{}-hour forecast for {}:", hours, place.name);
    for point in &points {
        println!("{}", display::forecast_line(point));
    }
    Ok(())
}

/// Starts the HTTP server, optionally prompting for its settings first.
///
/// # Errors
///
/// * If the server fails to bind or crashes
pub async fn serve(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    // actix-web brings its own runtime; run it on a blocking thread so it
    // does not nest inside this tokio runtime.
    tokio::task::spawn_blocking(move || {
        let system = actix_web::rt::System::new();
        if interactive {
            system.block_on(city_monitor_server::interactive::run())
        } else {
            system.block_on(city_monitor_server::run_server())
        }
    })
    .await??;
    Ok(())
}
