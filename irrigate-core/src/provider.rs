use crate::{
    Config,
    model::{CurrentWeather, ForecastSeries, Location},
};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;
pub mod simulated;

pub use openweather::OpenWeatherSource;
pub use simulated::SimulatedSource;

/// The single provider error kind: the upstream call did not succeed.
/// Callers recover by substituting simulated data; this never reaches the
/// end user as a hard failure.
#[derive(Debug, Error)]
pub enum DataUnavailable {
    #[error("failed to reach the weather service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather service returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode weather service response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Abstraction over weather data sources (live API or simulator).
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        location: &Location,
    ) -> Result<CurrentWeather, DataUnavailable>;

    async fn fetch_forecast(
        &self,
        location: &Location,
    ) -> Result<ForecastSeries, DataUnavailable>;
}

/// Construct the live source from config, if an API key is present.
/// Returns `None` when the session should run purely on simulated data.
pub fn live_source_from_config(config: &Config) -> Option<Box<dyn WeatherSource>> {
    config
        .api_key()
        .map(|key| Box::new(OpenWeatherSource::new(key.to_owned())) as Box<dyn WeatherSource>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_live_source_without_api_key() {
        let cfg = Config::default();
        assert!(live_source_from_config(&cfg).is_none());
    }

    #[test]
    fn blank_api_key_yields_no_live_source() {
        let mut cfg = Config::default();
        cfg.set_api_key(Some("  ".to_string()));
        assert!(live_source_from_config(&cfg).is_none());
    }

    #[test]
    fn live_source_built_when_key_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key(Some("KEY".to_string()));
        assert!(live_source_from_config(&cfg).is_some());
    }
}
