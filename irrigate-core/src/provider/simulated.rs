use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::model::{CurrentWeather, ForecastSample, ForecastSeries, Location};

use super::{DataUnavailable, WeatherSource};

/// Number of simulated forecast points: roughly five days at 3-hour spacing.
const FORECAST_SAMPLES: usize = 40;
const SAMPLE_SPACING_HOURS: i64 = 3;

const CONDITIONS: &[&str] = &[
    "clear sky",
    "few clouds",
    "scattered clouds",
    "broken clouds",
    "shower rain",
    "rain",
    "thunderstorm",
    "light rain",
    "moderate rain",
];

/// Linear-congruential generator seeded from the location identifier.
/// The same seed always yields the same draw sequence, keeping demo data
/// reproducible.
#[derive(Debug, Clone)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    const MULTIPLIER: u32 = 9301;
    const INCREMENT: u32 = 49297;
    const MODULUS: u32 = 233280;

    pub fn new(seed: u32) -> Self {
        Self {
            seed: seed % Self::MODULUS,
        }
    }

    /// Seed from the sum of the city name's character codes.
    pub fn from_city(name: &str) -> Self {
        let seed = name.chars().fold(0u32, |acc, c| acc.wrapping_add(c as u32));
        Self::new(seed)
    }

    /// Seed from coordinates quantized to two decimal places, so nearby
    /// fixes (GPS jitter) reuse the same stream.
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        let lat_q = (lat * 100.0).round() as i64;
        let lon_q = (lon * 100.0).round() as i64;
        let folded = lat_q.wrapping_mul(36_000).wrapping_add(lon_q).unsigned_abs();
        Self::new((folded % u64::from(Self::MODULUS)) as u32)
    }

    fn next(&mut self) -> u32 {
        self.seed = (self.seed * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        self.seed
    }

    /// Uniform draw in [min, max).
    pub fn in_range(&mut self, min: f64, max: f64) -> f64 {
        min + f64::from(self.next()) / f64::from(Self::MODULUS) * (max - min)
    }

    /// Whole-number draw in [min, max).
    pub fn int_in_range(&mut self, min: f64, max: f64) -> f64 {
        self.in_range(min, max).floor()
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.next() as usize % options.len()]
    }
}

/// Deterministic stand-in for the live API: plausible weather synthesized
/// from a location-derived seed.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSource;

impl SimulatedSource {
    pub fn new() -> Self {
        Self
    }

    fn rng_for(location: &Location) -> Lcg {
        match location {
            Location::City(name) => Lcg::from_city(name),
            Location::Coordinates { lat, lon } => Lcg::from_coords(*lat, *lon),
        }
    }

    /// Temperature band: cities draw from a fixed range, coordinates are
    /// centered on a latitude-dependent baseline.
    fn temperature_band(location: &Location) -> (f64, f64) {
        match location {
            Location::City(_) => (15.0, 35.0),
            Location::Coordinates { lat, .. } => {
                let base = 30.0 - lat.abs() * 0.5;
                (base - 5.0, base + 10.0)
            }
        }
    }

    fn place_name(location: &Location) -> String {
        match location {
            Location::City(name) => name.clone(),
            Location::Coordinates { .. } => "Your Location".to_string(),
        }
    }

    /// Synthesize current conditions as of `now`.
    pub fn current_at(&self, location: &Location, now: DateTime<Utc>) -> CurrentWeather {
        let mut rng = Self::rng_for(location);
        let (lo, hi) = Self::temperature_band(location);

        CurrentWeather {
            location_name: Self::place_name(location),
            condition: rng.pick(CONDITIONS).to_string(),
            temperature_c: rng.int_in_range(lo, hi),
            humidity_pct: rng.int_in_range(30.0, 90.0),
            wind_speed_mps: rng.int_in_range(1.0, 15.0),
            rainfall_mm: Some(rng.int_in_range(0.0, 10.0)),
            observation_time: now,
        }
    }

    /// Synthesize a 40-sample forecast at 3-hour spacing starting at `now`.
    pub fn forecast_at(&self, location: &Location, now: DateTime<Utc>) -> ForecastSeries {
        let mut rng = Self::rng_for(location);
        let (lo, hi) = Self::temperature_band(location);

        let samples = (0..FORECAST_SAMPLES)
            .map(|i| ForecastSample {
                timestamp: now + Duration::hours(SAMPLE_SPACING_HOURS * i as i64),
                temperature_c: rng.int_in_range(lo, hi),
                humidity_pct: rng.int_in_range(30.0, 90.0),
                pop: rng.int_in_range(0.0, 100.0) / 100.0,
            })
            .collect();

        ForecastSeries::new(samples)
    }
}

#[async_trait]
impl WeatherSource for SimulatedSource {
    async fn fetch_current(
        &self,
        location: &Location,
    ) -> Result<CurrentWeather, DataUnavailable> {
        Ok(self.current_at(location, Utc::now()))
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
    ) -> Result<ForecastSeries, DataUnavailable> {
        Ok(self.forecast_at(location, Utc::now()))
    }
}
