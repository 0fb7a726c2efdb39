#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the city monitor.
//!
//! Lists places, takes one-off samples, watches a place at a fixed cadence,
//! prints air quality forecasts, or starts the HTTP server. Without a
//! subcommand it asks which place to watch.

mod commands;
mod display;
mod interactive;

use std::time::Duration;

use clap::{Parser, Subcommand};
use city_monitor_geography::DEFAULT_PLACE;
use city_monitor_geography_models::Coverage;

use crate::commands::{Monitor, WatchOptions};

#[derive(Parser)]
#[command(name = "city_monitor", about = "Traffic and air quality monitor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List monitored places
    Places {
        /// `cities` or `all` (cities plus Hyderabad areas)
        #[arg(long, default_value = "cities")]
        detail: Coverage,
    },
    /// Generate a single observation for a place
    Sample {
        /// Place name (e.g., "Warangal")
        place: String,
    },
    /// Refresh a place at a fixed cadence until stopped
    Watch {
        /// Place name; defaults to Hyderabad
        place: Option<String>,
        /// Seconds between refreshes (overrides `REFRESH_INTERVAL_SECS`)
        #[arg(long)]
        interval: Option<f64>,
        /// Stop after this many refreshes (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },
    /// Print the air quality forecast for a place
    Forecast {
        /// Place name
        place: String,
        /// Forecast horizon in hours
        #[arg(long, default_value = "48", value_parser = clap::value_parser!(u32).range(6..=96))]
        hours: u32,
    },
    /// Start the HTTP API server
    Serve {
        /// Prompt for the bind address, port, and API key first
        #[arg(long)]
        interactive: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let monitor = Monitor::from_env();

    let Some(command) = cli.command else {
        return interactive::run(&monitor).await;
    };

    match command {
        Commands::Places { detail } => commands::places(&monitor, detail),
        Commands::Sample { place } => commands::sample(&monitor, &place).await?,
        Commands::Watch {
            place,
            interval,
            count,
        } => {
            let interval = interval
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .map(Duration::from_secs_f64);
            let count = count.map(|n| usize::try_from(n).unwrap_or(usize::MAX));
            let place = place.as_deref().unwrap_or(DEFAULT_PLACE);
            commands::watch(&monitor, place, WatchOptions { interval, count }).await?;
        }
        Commands::Forecast { place, hours } => {
            commands::forecast(&monitor, &place, hours).await?;
        }
        Commands::Serve { interactive } => commands::serve(interactive).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch_options() {
        let cli = Cli::try_parse_from([
            "city_monitor",
            "watch",
            "Warangal",
            "--interval",
            "0.5",
            "--count",
            "3",
        ])
        .unwrap();

        let Some(Commands::Watch {
            place,
            interval,
            count,
        }) = cli.command
        else {
            panic!("expected watch");
        };
        assert_eq!(place.as_deref(), Some("Warangal"));
        assert_eq!(interval, Some(0.5));
        assert_eq!(count, Some(3));
    }

    #[test]
    fn watch_count_must_be_positive() {
        assert!(Cli::try_parse_from(["city_monitor", "watch", "--count", "0"]).is_err());
        assert!(Cli::try_parse_from(["city_monitor", "watch", "--count", "1"]).is_ok());
    }

    #[test]
    fn parses_detail_alias() {
        let cli = Cli::try_parse_from(["city_monitor", "places", "--detail", "all"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Places {
                detail: Coverage::CitiesAndAreas
            })
        ));
    }

    #[test]
    fn forecast_hours_are_bounded() {
        assert!(Cli::try_parse_from(["city_monitor", "forecast", "Guntur", "--hours", "200"]).is_err());

        let cli = Cli::try_parse_from(["city_monitor", "forecast", "Guntur"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Forecast { hours: 48, .. })));
    }

    #[test]
    fn serve_interactive_flag() {
        let cli = Cli::try_parse_from(["city_monitor", "serve", "--interactive"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { interactive: true })));

        let cli = Cli::try_parse_from(["city_monitor", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { interactive: false })));
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["city_monitor"]).unwrap();
        assert!(cli.command.is_none());
    }
}
