//! Interactive mode: pick a place, then watch it.

use city_monitor_geography::DEFAULT_PLACE;
use city_monitor_geography_models::Coverage;
use dialoguer::{Confirm, Select};

use crate::commands::{self, Monitor, WatchOptions};

/// Prompts for the coverage and a place, then watches it until Ctrl-C.
///
/// # Errors
///
/// * If a prompt fails
/// * If the watch fails
pub async fn run(monitor: &Monitor) -> Result<(), Box<dyn std::error::Error>> {
    println!("City Monitor");
    println!();

    let coverage = if Confirm::new()
        .with_prompt("Include Hyderabad areas?")
        .default(false)
        .interact()?
    {
        Coverage::CitiesAndAreas
    } else {
        Coverage::Cities
    };

    let places = monitor.registry.at_coverage(coverage);
    let labels: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
    let default = labels.iter().position(|name| *name == DEFAULT_PLACE).unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Which place would you like to watch?")
        .items(&labels)
        .default(default)
        .interact()?;

    commands::watch(monitor, labels[idx], WatchOptions::default()).await
}
