use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::Text;
use irrigate_core::{
    Config, Location, Session,
    provider::live_source_from_config,
    session::RefreshTrigger,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "irrigate", version, about = "Weather-driven irrigation advisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store OpenWeatherMap credentials and a default city.
    Configure,

    /// Fetch weather and print the irrigation advisory once.
    Report {
        /// City name; falls back to the configured default.
        city: Option<String>,

        /// Device latitude; pairs with --lon to use a coordinate fix.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Device longitude; pairs with --lat.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Apply a manual irrigation activation after the evaluation.
        #[arg(long)]
        irrigate: bool,
    },

    /// Re-evaluate the advisory on a fixed interval.
    Watch {
        /// City name; falls back to the configured default.
        city: Option<String>,

        /// Minutes between refreshes.
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Report {
                city,
                lat,
                lon,
                irrigate,
            } => report(city, lat, lon, irrigate).await,
            Command::Watch { city, interval } => watch(city, interval).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = Text::new("OpenWeatherMap API key:")
        .with_help_message("Leave empty to use simulated demo data")
        .with_initial_value(config.api_key().unwrap_or_default())
        .prompt()?;
    config.set_api_key(Some(key));

    let city = Text::new("Default city:")
        .with_help_message("Used when a command names no city")
        .with_initial_value(config.default_city().unwrap_or_default())
        .prompt()?;
    config.set_default_city(Some(city));

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn report(
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    irrigate: bool,
) -> Result<()> {
    let config = Config::load()?;
    let (location, trigger) = resolve_target(city, lat, lon, &config)?;

    let live = live_source_from_config(&config);
    let mut session = Session::new(location, config.thresholds.clone(), live);

    let report = session.refresh(trigger).await;
    render::advisory(&session, &report);

    if irrigate {
        let moisture = session.activate_irrigation(Utc::now());
        render::activation(moisture);
    }

    Ok(())
}

async fn watch(city: Option<String>, interval_minutes: u64) -> Result<()> {
    let config = Config::load()?;
    let (location, trigger) = resolve_target(city, None, None, &config)?;

    let live = live_source_from_config(&config);
    let mut session = Session::new(location, config.thresholds.clone(), live);

    let report = session.refresh(trigger).await;
    render::advisory(&session, &report);

    println!("Refreshing every {interval_minutes} minute(s). Press Ctrl-C to stop.");
    tracing::info!(interval_minutes, location = %session.location(), "watch mode started");

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_minutes.max(1) * 60));
    // The first tick completes immediately; the refresh above already
    // covered it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let report = session.refresh(RefreshTrigger::Interval).await;
        render::advisory(&session, &report);
    }
}

/// Turn command arguments into the session location and the trigger that
/// enters the refresh pipeline.
fn resolve_target(
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    config: &Config,
) -> Result<(Location, RefreshTrigger)> {
    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Ok((
            Location::Coordinates { lat, lon },
            RefreshTrigger::Geolocated { lat, lon },
        ));
    }

    if let Some(city) = city {
        let location = Location::City(city);
        return Ok((location.clone(), RefreshTrigger::LocationChange(location)));
    }

    match config.default_city() {
        Some(city) => Ok((
            Location::City(city.to_string()),
            RefreshTrigger::Manual,
        )),
        None => bail!(
            "No city given and no default configured.\n\
             Hint: pass a city (`irrigate report London`) or run `irrigate configure`."
        ),
    }
}
