use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where weather should be fetched for: a named city or device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates { lat, lon } => write!(f, "{lat:.4}, {lon:.4}"),
        }
    }
}

/// Snapshot of current conditions, immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub condition: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_mps: f64,
    /// Rainfall over the last hour, if the source reports it.
    pub rainfall_mm: Option<f64>,
    pub observation_time: DateTime<Utc>,
}

/// One forecast point, typically at 3-hour spacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    /// Probability of precipitation in 0..=1.
    pub pop: f64,
}

/// Chronologically ordered forecast samples. Replaced wholesale on each
/// refresh; never merged incrementally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    samples: Vec<ForecastSample>,
}

impl ForecastSeries {
    pub fn new(samples: Vec<ForecastSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[ForecastSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Condense the series into per-day entries: the first sample of each
    /// distinct weekday, at most seven days.
    pub fn daily(&self) -> Vec<DailyForecast> {
        let mut days = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for sample in &self.samples {
            let day = sample.timestamp.format("%a").to_string();
            if seen.contains(&day) {
                continue;
            }
            seen.push(day.clone());
            days.push(DailyForecast {
                day,
                temperature_c: sample.temperature_c,
                rain_chance_pct: (sample.pop * 100.0).round() as u8,
            });
            if days.len() == 7 {
                break;
            }
        }

        days
    }
}

/// One entry of the condensed multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Short weekday label, e.g. "Mon".
    pub day: String,
    pub temperature_c: f64,
    pub rain_chance_pct: u8,
}

/// Soil saturation proxy, always clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilMoisture(f64);

impl SoilMoisture {
    /// Baseline for a fresh session.
    pub const INITIAL: SoilMoisture = SoilMoisture(65.0);

    pub fn new(pct: f64) -> Self {
        Self(pct.clamp(0.0, 100.0))
    }

    pub fn pct(&self) -> f64 {
        self.0
    }

    /// Add a (possibly negative) delta, staying within [0, 100].
    pub fn adjusted(&self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for SoilMoisture {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Closed advisory outcome enumeration; exactly one applies per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    Skip,
    Ok,
    Required,
    Suggested,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Skip => "skip",
            RecommendationStatus::Ok => "ok",
            RecommendationStatus::Required => "required",
            RecommendationStatus::Suggested => "suggested",
        }
    }

    /// Whether the advisory calls for watering (drives the "recommendation
    /// on" indicator when no manual override is active).
    pub fn calls_for_irrigation(&self) -> bool {
        matches!(
            self,
            RecommendationStatus::Required | RecommendationStatus::Suggested
        )
    }
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory outcome: status plus a human-readable message with the measured
/// values interpolated. Recomputed every cycle, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub status: RecommendationStatus,
    pub message: String,
}

/// Output tuple of a full advisory evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub soil_moisture_pct: f64,
    pub rain_chance_pct: u8,
    pub evapotranspiration_mm_day: f64,
    pub recommendation: Recommendation,
}

/// When the next watering is due, derived from the advisory status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextIrrigation {
    Now,
    At(DateTime<Utc>),
}
