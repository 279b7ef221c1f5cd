//! Core library for the `irrigate` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather data sources (live API and simulator)
//! - The irrigation advisory engine (moisture, rain chance, ET0,
//!   recommendation)
//! - Per-session state and the refresh pipeline
//!
//! It is used by `irrigate-cli`, but can also be reused by other binaries or
//! services.

pub mod advisory;
pub mod config;
pub mod model;
pub mod provider;
pub mod session;

pub use advisory::Thresholds;
pub use config::Config;
pub use model::{
    AdvisoryReport, CurrentWeather, ForecastSeries, Location, NextIrrigation, Recommendation,
    RecommendationStatus, SoilMoisture,
};
pub use provider::{DataUnavailable, WeatherSource};
pub use session::{RefreshTrigger, Session};
