//! Human-friendly text output for the advisory report.

use chrono::{DateTime, Utc};
use irrigate_core::{
    AdvisoryReport, NextIrrigation, RecommendationStatus, Session, SoilMoisture, advisory,
};

/// Print current conditions, the advisory panel, and the condensed
/// multi-day forecast.
pub fn advisory(session: &Session, report: &AdvisoryReport) {
    let Some(weather) = session.weather() else {
        return;
    };

    println!();
    println!("Weather for {}", weather.location_name);
    println!("  {}, {:.0}°C", weather.condition, weather.temperature_c);
    println!(
        "  Humidity {:.0}%   Wind {:.1} m/s   Rainfall {:.1} mm",
        weather.humidity_pct,
        weather.wind_speed_mps,
        weather.rainfall_mm.unwrap_or(0.0),
    );
    if session.is_demo_mode() {
        println!("  (simulated demo data)");
    }

    println!();
    println!("Irrigation advisory");
    println!(
        "  Soil moisture      {} {:.0}%",
        moisture_bar(report.soil_moisture_pct),
        report.soil_moisture_pct
    );
    println!("  Rain chance (24h)  {}%", report.rain_chance_pct);
    println!(
        "  Evapotranspiration {:.1} mm/day",
        report.evapotranspiration_mm_day
    );
    println!(
        "  [{}] {}",
        report.recommendation.status, report.recommendation.message
    );
    println!("  Status           {}", status_line(session, report.recommendation.status));
    println!("  Last irrigation  {}", last_irrigation_label(session));
    println!(
        "  Next irrigation  {}",
        next_irrigation_label(report.recommendation.status, Utc::now())
    );

    println!();
    forecast(session);
}

/// Print the outcome of a manual activation.
pub fn activation(moisture: SoilMoisture) {
    println!();
    println!("Irrigation turned ON");
    println!(
        "  Soil moisture      {} {:.0}%",
        moisture_bar(moisture.pct()),
        moisture.pct()
    );
}

fn forecast(session: &Session) {
    println!("Forecast");
    match session.forecast() {
        Some(series) if !series.is_empty() => {
            for day in series.daily() {
                println!(
                    "  {:<4} {:>4.0}°C   rain {:>3}%",
                    day.day, day.temperature_c, day.rain_chance_pct
                );
            }
        }
        _ => println!("  Forecast data unavailable"),
    }
}

/// The manual override takes precedence over the advisory status in the
/// indicator line.
fn status_line(session: &Session, status: RecommendationStatus) -> String {
    if session.irrigation().is_on() {
        "Irrigation ON".to_string()
    } else if status.calls_for_irrigation() {
        "Recommendation: ON".to_string()
    } else {
        "Recommendation: OFF".to_string()
    }
}

fn last_irrigation_label(session: &Session) -> String {
    match session.irrigation().last_activated() {
        Some(at) => at.format("%H:%M UTC").to_string(),
        None => "Never".to_string(),
    }
}

fn next_irrigation_label(status: RecommendationStatus, now: DateTime<Utc>) -> String {
    match advisory::next_irrigation_due(status, now) {
        NextIrrigation::Now => "Now".to_string(),
        NextIrrigation::At(at) => at.format("%a %H:%M UTC").to_string(),
    }
}

fn moisture_bar(pct: f64) -> String {
    const WIDTH: usize = 10;
    let filled = ((pct / 100.0) * WIDTH as f64).round() as usize;
    let filled = filled.min(WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn moisture_bar_spans_the_range() {
        assert_eq!(moisture_bar(0.0), "[----------]");
        assert_eq!(moisture_bar(50.0), "[#####-----]");
        assert_eq!(moisture_bar(100.0), "[##########]");
        // Out-of-range input must not panic the renderer.
        assert_eq!(moisture_bar(140.0), "[##########]");
    }

    #[test]
    fn next_irrigation_label_formats_each_case() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap();

        assert_eq!(
            next_irrigation_label(RecommendationStatus::Required, now),
            "Now"
        );
        assert_eq!(
            next_irrigation_label(RecommendationStatus::Skip, now),
            "Tue 06:00 UTC"
        );
        assert_eq!(
            next_irrigation_label(RecommendationStatus::Ok, now),
            "Mon 20:30 UTC"
        );
    }
}
