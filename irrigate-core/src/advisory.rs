//! Irrigation advisory engine.
//!
//! Pure functions over fetched weather: soil-moisture estimate, near-term
//! rain chance, reference evapotranspiration, and the recommendation
//! cascade. Deterministic given identical inputs, no side effects.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    AdvisoryReport, CurrentWeather, ForecastSeries, NextIrrigation, Recommendation,
    RecommendationStatus,
};

/// Starting point for the moisture estimate before weather adjustments.
const MOISTURE_BASELINE: f64 = 65.0;

/// Forecast samples considered by the rain-chance estimate (24h at 3-hour
/// spacing).
const RAIN_CHANCE_WINDOW: usize = 8;

/// Evapotranspiration output bounds, mm/day.
const ET0_FLOOR: f64 = 0.5;
const ET0_CEILING: f64 = 15.0;

/// Flat moisture boost applied by a manual irrigation activation.
pub const IRRIGATION_BOOST: f64 = 15.0;

/// Decision thresholds for the recommendation cascade. Overridable by the
/// host application; see [`Thresholds::default`] for the stock values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high_moisture: f64,
    pub medium_moisture: f64,
    pub low_moisture: f64,
    pub high_rain_chance: u8,
    pub high_temp: f64,
    /// Reserved for host applications (e.g. frost lockout); no built-in
    /// rule consults it.
    pub low_temp: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_moisture: 70.0,
            medium_moisture: 40.0,
            low_moisture: 20.0,
            high_rain_chance: 60,
            high_temp: 35.0,
            low_temp: 10.0,
        }
    }
}

/// Estimate soil saturation from current conditions and the near-term
/// forecast. Additive adjustments on a fixed baseline, clamped to [0, 100].
pub fn estimate_soil_moisture(
    weather: &CurrentWeather,
    forecast: Option<&ForecastSeries>,
) -> f64 {
    let mut moisture = MOISTURE_BASELINE;

    if weather.humidity_pct > 70.0 {
        moisture += 15.0;
    } else if weather.humidity_pct > 50.0 {
        moisture += 5.0;
    } else {
        moisture -= 10.0;
    }

    let rain_chance = estimate_rain_chance(forecast);
    if rain_chance > 60 {
        moisture += 20.0;
    } else if rain_chance > 30 {
        moisture += 10.0;
    }

    if weather.temperature_c > 30.0 {
        moisture -= 10.0;
    } else if weather.temperature_c > 25.0 {
        moisture -= 5.0;
    }

    if weather.wind_speed_mps > 10.0 {
        moisture -= 5.0;
    }

    moisture.clamp(0.0, 100.0)
}

/// Mean probability of precipitation over the first eight forecast samples,
/// as a whole percentage. An absent or empty forecast yields 0, never an
/// error.
pub fn estimate_rain_chance(forecast: Option<&ForecastSeries>) -> u8 {
    let Some(forecast) = forecast else {
        return 0;
    };

    let window = &forecast.samples()[..forecast.len().min(RAIN_CHANCE_WINDOW)];
    if window.is_empty() {
        return 0;
    }

    let total: f64 = window.iter().map(|s| s.pop * 100.0).sum();
    (total / window.len() as f64).round() as u8
}

/// Simplified reference evapotranspiration (ET0), mm/day, one decimal,
/// clamped to [0.5, 15.0].
///
/// The sqrt term is non-real below 10 °C; those readings report the floor
/// value instead of letting NaN reach the clamp.
pub fn estimate_evapotranspiration(weather: &CurrentWeather) -> f64 {
    let temp = weather.temperature_c;
    if temp < 10.0 {
        return ET0_FLOOR;
    }

    let mut et0 = 0.0023 * (temp + 17.8) * (temp - 10.0).sqrt() * (weather.wind_speed_mps + 2.0);

    if weather.humidity_pct < 30.0 {
        et0 *= 1.2;
    } else if weather.humidity_pct > 70.0 {
        et0 *= 0.8;
    }

    (et0.clamp(ET0_FLOOR, ET0_CEILING) * 10.0).round() / 10.0
}

/// Pick the advisory outcome. Ordered decision list, first match wins:
/// forecast rain overrides everything, abundant moisture overrides a
/// temperature spike, moisture deficit is checked before temperature.
/// Reordering the rules changes observable behavior.
pub fn recommend(
    moisture: f64,
    rain_chance: u8,
    temperature_c: f64,
    thresholds: &Thresholds,
) -> Recommendation {
    if rain_chance > thresholds.high_rain_chance {
        Recommendation {
            status: RecommendationStatus::Skip,
            message: format!(
                "Rain expected ({rain_chance}% chance). Skip irrigation today to conserve water."
            ),
        }
    } else if moisture > thresholds.high_moisture {
        Recommendation {
            status: RecommendationStatus::Ok,
            message: format!(
                "Soil moisture is good ({moisture:.0}%). No irrigation needed today."
            ),
        }
    } else if moisture < thresholds.low_moisture {
        Recommendation {
            status: RecommendationStatus::Required,
            message: format!(
                "Low soil moisture ({moisture:.0}%). Irrigation strongly recommended!"
            ),
        }
    } else if temperature_c > thresholds.high_temp {
        Recommendation {
            status: RecommendationStatus::Suggested,
            message: format!(
                "High temperature ({temperature_c:.0}°C) increasing water demand. \
                 Consider light irrigation."
            ),
        }
    } else if moisture < thresholds.medium_moisture {
        Recommendation {
            status: RecommendationStatus::Suggested,
            message: format!(
                "Moderate soil moisture ({moisture:.0}%). Light irrigation recommended."
            ),
        }
    } else {
        Recommendation {
            status: RecommendationStatus::Ok,
            message: "Conditions are optimal. Regular irrigation schedule maintained.".to_string(),
        }
    }
}

/// Full evaluation: moisture, rain chance, ET0, and the recommendation.
pub fn evaluate(
    weather: &CurrentWeather,
    forecast: Option<&ForecastSeries>,
    thresholds: &Thresholds,
) -> AdvisoryReport {
    let soil_moisture_pct = estimate_soil_moisture(weather, forecast);
    let rain_chance_pct = estimate_rain_chance(forecast);
    let evapotranspiration_mm_day = estimate_evapotranspiration(weather);
    let recommendation = recommend(
        soil_moisture_pct,
        rain_chance_pct,
        weather.temperature_c,
        thresholds,
    );

    AdvisoryReport {
        soil_moisture_pct,
        rain_chance_pct,
        evapotranspiration_mm_day,
        recommendation,
    }
}

/// When the next watering is due: immediately when the advisory calls for
/// irrigation, tomorrow 06:00 when rain is expected, six hours out on an
/// ordinary schedule.
pub fn next_irrigation_due(status: RecommendationStatus, now: DateTime<Utc>) -> NextIrrigation {
    match status {
        RecommendationStatus::Required | RecommendationStatus::Suggested => NextIrrigation::Now,
        RecommendationStatus::Skip => {
            let tomorrow = (now + Duration::days(1)).date_naive();
            match tomorrow.and_hms_opt(6, 0, 0) {
                Some(at) => NextIrrigation::At(at.and_utc()),
                None => NextIrrigation::At(now + Duration::days(1)),
            }
        }
        RecommendationStatus::Ok => NextIrrigation::At(now + Duration::hours(6)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastSample;
    use chrono::TimeZone;

    fn weather(temp: f64, humidity: f64, wind: f64) -> CurrentWeather {
        CurrentWeather {
            location_name: "Testville".to_string(),
            condition: "clear sky".to_string(),
            temperature_c: temp,
            humidity_pct: humidity,
            wind_speed_mps: wind,
            rainfall_mm: None,
            observation_time: Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap(),
        }
    }

    fn forecast_with_pop(pop: f64, count: usize) -> ForecastSeries {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        ForecastSeries::new(
            (0..count)
                .map(|i| ForecastSample {
                    timestamp: start + Duration::hours(3 * i as i64),
                    temperature_c: 22.0,
                    humidity_pct: 55.0,
                    pop,
                })
                .collect(),
        )
    }

    #[test]
    fn moisture_stays_within_bounds() {
        // Everything pushing upward: humid, rainy forecast, cool, calm.
        let high = estimate_soil_moisture(&weather(15.0, 95.0, 1.0), Some(&forecast_with_pop(1.0, 8)));
        assert!(high <= 100.0);

        // Everything pushing downward: dry, hot, windy, no forecast.
        let low = estimate_soil_moisture(&weather(38.0, 20.0, 14.0), None);
        assert!(low >= 0.0);
        assert_eq!(low, 40.0);
    }

    #[test]
    fn moisture_humidity_tiers_are_exclusive() {
        let humid = estimate_soil_moisture(&weather(20.0, 80.0, 2.0), None);
        let mild = estimate_soil_moisture(&weather(20.0, 60.0, 2.0), None);
        let dry = estimate_soil_moisture(&weather(20.0, 40.0, 2.0), None);

        assert_eq!(humid, 80.0);
        assert_eq!(mild, 70.0);
        assert_eq!(dry, 55.0);
    }

    #[test]
    fn moisture_is_deterministic() {
        let w = weather(27.0, 64.0, 11.0);
        let f = forecast_with_pop(0.4, 10);
        assert_eq!(
            estimate_soil_moisture(&w, Some(&f)),
            estimate_soil_moisture(&w, Some(&f)),
        );
    }

    #[test]
    fn rain_chance_absent_or_empty_is_zero() {
        assert_eq!(estimate_rain_chance(None), 0);
        assert_eq!(estimate_rain_chance(Some(&ForecastSeries::default())), 0);
    }

    #[test]
    fn rain_chance_averages_first_eight_samples() {
        assert_eq!(estimate_rain_chance(Some(&forecast_with_pop(0.5, 8))), 50);

        // Later samples must not contribute.
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        let mut samples: Vec<ForecastSample> = (0..8)
            .map(|i| ForecastSample {
                timestamp: start + Duration::hours(3 * i),
                temperature_c: 22.0,
                humidity_pct: 55.0,
                pop: 0.2,
            })
            .collect();
        samples.push(ForecastSample {
            timestamp: start + Duration::hours(24),
            temperature_c: 22.0,
            humidity_pct: 55.0,
            pop: 1.0,
        });
        assert_eq!(estimate_rain_chance(Some(&ForecastSeries::new(samples))), 20);
    }

    #[test]
    fn rain_chance_handles_short_series() {
        assert_eq!(estimate_rain_chance(Some(&forecast_with_pop(0.75, 3))), 75);
    }

    #[test]
    fn et0_stays_within_bounds() {
        let hot = estimate_evapotranspiration(&weather(45.0, 20.0, 20.0));
        assert!(hot <= 15.0);

        let cool = estimate_evapotranspiration(&weather(11.0, 85.0, 0.5));
        assert!(cool >= 0.5);
    }

    #[test]
    fn et0_below_ten_degrees_reports_floor() {
        assert_eq!(estimate_evapotranspiration(&weather(4.0, 50.0, 3.0)), 0.5);
        assert_eq!(estimate_evapotranspiration(&weather(-12.0, 50.0, 3.0)), 0.5);
    }

    #[test]
    fn et0_humidity_scaling() {
        let base = estimate_evapotranspiration(&weather(26.0, 50.0, 4.0));
        let arid = estimate_evapotranspiration(&weather(26.0, 25.0, 4.0));
        let humid = estimate_evapotranspiration(&weather(26.0, 80.0, 4.0));

        assert!(arid > base);
        assert!(humid < base);
    }

    #[test]
    fn et0_rounds_to_one_decimal() {
        let et0 = estimate_evapotranspiration(&weather(26.0, 50.0, 4.0));
        assert_eq!((et0 * 10.0).round() / 10.0, et0);
    }

    #[test]
    fn recommend_rain_overrides_everything() {
        let t = Thresholds::default();
        let rec = recommend(10.0, 70, 40.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Skip);
    }

    #[test]
    fn recommend_high_moisture_is_ok() {
        let t = Thresholds::default();
        let rec = recommend(80.0, 10, 20.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Ok);
        assert!(rec.message.contains("No irrigation needed"));
    }

    #[test]
    fn recommend_low_moisture_is_required() {
        let t = Thresholds::default();
        let rec = recommend(15.0, 10, 20.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Required);
    }

    #[test]
    fn recommend_heat_suggests_light_irrigation() {
        let t = Thresholds::default();
        let rec = recommend(50.0, 10, 40.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Suggested);
        assert!(rec.message.contains("High temperature"));
    }

    #[test]
    fn recommend_moderate_moisture_suggests_light_irrigation() {
        let t = Thresholds::default();
        let rec = recommend(30.0, 10, 20.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Suggested);
        assert!(rec.message.contains("Moderate soil moisture"));
    }

    #[test]
    fn recommend_defaults_to_optimal() {
        let t = Thresholds::default();
        let rec = recommend(55.0, 10, 20.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Ok);
        assert!(rec.message.contains("optimal"));
    }

    #[test]
    fn recommend_moisture_deficit_beats_heat() {
        let t = Thresholds::default();
        let rec = recommend(15.0, 10, 40.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Required);
    }

    #[test]
    fn recommend_honors_custom_thresholds() {
        let t = Thresholds {
            high_rain_chance: 90,
            ..Thresholds::default()
        };
        let rec = recommend(80.0, 70, 20.0, &t);
        assert_eq!(rec.status, RecommendationStatus::Ok);
    }

    #[test]
    fn next_due_now_when_watering_called_for() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap();
        assert_eq!(
            next_irrigation_due(RecommendationStatus::Required, now),
            NextIrrigation::Now
        );
        assert_eq!(
            next_irrigation_due(RecommendationStatus::Suggested, now),
            NextIrrigation::Now
        );
    }

    #[test]
    fn next_due_tomorrow_morning_after_skip() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 4, 6, 0, 0).unwrap();
        assert_eq!(
            next_irrigation_due(RecommendationStatus::Skip, now),
            NextIrrigation::At(expected)
        );
    }

    #[test]
    fn next_due_six_hours_out_when_ok() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap();
        assert_eq!(
            next_irrigation_due(RecommendationStatus::Ok, now),
            NextIrrigation::At(now + Duration::hours(6))
        );
    }

    #[test]
    fn evaluate_composes_all_estimates() {
        let w = weather(32.0, 45.0, 4.0);
        let f = forecast_with_pop(0.7, 12);
        let report = evaluate(&w, Some(&f), &Thresholds::default());

        assert_eq!(report.rain_chance_pct, 70);
        assert_eq!(report.recommendation.status, RecommendationStatus::Skip);
        assert!(report.soil_moisture_pct >= 0.0 && report.soil_moisture_pct <= 100.0);
        assert!(report.evapotranspiration_mm_day >= 0.5);
    }
}
