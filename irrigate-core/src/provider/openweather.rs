use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{CurrentWeather, ForecastSample, ForecastSeries, Location};

use super::{DataUnavailable, WeatherSource};

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const REVERSE_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0/reverse";

/// Display name used when coordinates cannot be reverse-geocoded.
const FALLBACK_PLACE_NAME: &str = "Your Location";

/// Live weather source backed by the OpenWeatherMap API.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }

    fn location_params(location: &Location) -> Vec<(&'static str, String)> {
        match location {
            Location::City(name) => vec![("q", name.clone())],
            Location::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }

    async fn get_json(&self, url: &str, location: &Location) -> Result<String, DataUnavailable> {
        let mut params = Self::location_params(location);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        debug!(url, %location, "requesting OpenWeather data");

        let res = self.http.get(url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(DataUnavailable::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }

    /// Resolve coordinates to a place name, best effort. A failed lookup
    /// falls back to a generic label rather than failing the fetch.
    async fn resolve_place_name(&self, lat: f64, lon: f64) -> String {
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let res = match self.http.get(REVERSE_GEO_URL).query(&params).send().await {
            Ok(res) if res.status().is_success() => res,
            Ok(res) => {
                warn!(status = %res.status(), "reverse geocoding rejected");
                return FALLBACK_PLACE_NAME.to_string();
            }
            Err(err) => {
                warn!(error = %err, "reverse geocoding unreachable");
                return FALLBACK_PLACE_NAME.to_string();
            }
        };

        match res.json::<Vec<OwGeoEntry>>().await {
            Ok(entries) => entries
                .into_iter()
                .next()
                .map(|e| e.name)
                .unwrap_or_else(|| FALLBACK_PLACE_NAME.to_string()),
            Err(err) => {
                warn!(error = %err, "reverse geocoding response unreadable");
                FALLBACK_PLACE_NAME.to_string()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn fetch_current(
        &self,
        location: &Location,
    ) -> Result<CurrentWeather, DataUnavailable> {
        let body = self.get_json(CURRENT_URL, location).await?;
        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;

        let observation_time = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);

        let condition = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        // Coordinate fixes get a reverse-geocoded display name; the payload
        // name for a lat/lon query is often a bare grid cell.
        let location_name = match location {
            Location::City(_) => parsed.name,
            Location::Coordinates { lat, lon } => self.resolve_place_name(*lat, *lon).await,
        };

        Ok(CurrentWeather {
            location_name,
            condition,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            rainfall_mm: parsed.rain.and_then(|r| r.one_hour),
            observation_time,
        })
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
    ) -> Result<ForecastSeries, DataUnavailable> {
        let body = self.get_json(FORECAST_URL, location).await?;
        let parsed: OwForecastResponse = serde_json::from_str(&body)?;

        let samples = parsed
            .list
            .into_iter()
            .filter_map(|entry| {
                let timestamp = unix_to_utc(entry.dt)?;
                Some(ForecastSample {
                    timestamp,
                    temperature_c: entry.main.temp,
                    humidity_pct: entry.main.humidity,
                    pop: entry.pop,
                })
            })
            .collect();

        Ok(ForecastSeries::new(samples))
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
