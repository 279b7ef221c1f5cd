//! Per-session state and the refresh pipeline.
//!
//! A [`Session`] owns everything mutable between refreshes: the selected
//! location, the last-fetched observations, the soil-moisture state, and
//! the manual irrigation override. All refresh triggers funnel through the
//! same entry point; live fetch failures fall back to simulated data and
//! are never surfaced as hard errors.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    advisory::{self, IRRIGATION_BOOST, Thresholds},
    model::{AdvisoryReport, CurrentWeather, ForecastSeries, Location, SoilMoisture},
    provider::{DataUnavailable, SimulatedSource, WeatherSource},
};

/// What prompted a refresh.
#[derive(Debug, Clone)]
pub enum RefreshTrigger {
    /// Scheduled poll tick.
    Interval,
    /// Explicit user refresh.
    Manual,
    /// User switched to a different city.
    LocationChange(Location),
    /// A geolocation request completed with a device fix. Acquisition has
    /// exactly one success outcome; a failed acquisition never reaches the
    /// pipeline.
    Geolocated { lat: f64, lon: f64 },
}

/// Issuance ticket for one refresh. Later tickets win over earlier ones
/// regardless of which fetch completes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Observations produced by one fetch, applied atomically — weather and
/// forecast are never mixed across refreshes.
#[derive(Debug, Clone)]
pub struct Observations {
    pub weather: CurrentWeather,
    pub forecast: ForecastSeries,
    /// True when the data came from the simulator rather than the live API.
    pub simulated: bool,
}

/// Manual irrigation override state.
#[derive(Debug, Clone, Default)]
pub struct IrrigationControl {
    on: bool,
    last_activated: Option<DateTime<Utc>>,
}

impl IrrigationControl {
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn last_activated(&self) -> Option<DateTime<Utc>> {
        self.last_activated
    }
}

/// Mutable state for one advisory session. Owned by the host application
/// and passed into engine calls; nothing here is process-global.
#[derive(Debug)]
pub struct Session {
    location: Location,
    thresholds: Thresholds,
    live: Option<Box<dyn WeatherSource>>,
    simulated: SimulatedSource,
    weather: Option<CurrentWeather>,
    forecast: Option<ForecastSeries>,
    soil_moisture: SoilMoisture,
    irrigation: IrrigationControl,
    demo_mode: bool,
    last_report: Option<AdvisoryReport>,
    issued: u64,
    applied: u64,
}

impl Session {
    /// A session without a live source runs entirely on simulated data.
    pub fn new(
        location: Location,
        thresholds: Thresholds,
        live: Option<Box<dyn WeatherSource>>,
    ) -> Self {
        Self {
            location,
            thresholds,
            live,
            simulated: SimulatedSource::new(),
            weather: None,
            forecast: None,
            soil_moisture: SoilMoisture::INITIAL,
            irrigation: IrrigationControl::default(),
            demo_mode: false,
            last_report: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn weather(&self) -> Option<&CurrentWeather> {
        self.weather.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastSeries> {
        self.forecast.as_ref()
    }

    pub fn soil_moisture(&self) -> SoilMoisture {
        self.soil_moisture
    }

    pub fn irrigation(&self) -> &IrrigationControl {
        &self.irrigation
    }

    pub fn is_demo_mode(&self) -> bool {
        self.demo_mode
    }

    pub fn last_report(&self) -> Option<&AdvisoryReport> {
        self.last_report.as_ref()
    }

    /// Full refresh cycle: take a ticket, fetch (with fallback), apply.
    pub async fn refresh(&mut self, trigger: RefreshTrigger) -> AdvisoryReport {
        let ticket = self.begin_refresh(&trigger);
        let observations = self.fetch_observations().await;
        self.apply(ticket, observations)
    }

    /// Record the trigger and hand out the next issuance ticket. Location
    /// changes take effect here so the fetch sees the new target.
    pub fn begin_refresh(&mut self, trigger: &RefreshTrigger) -> RefreshTicket {
        match trigger {
            RefreshTrigger::LocationChange(location) => self.location = location.clone(),
            RefreshTrigger::Geolocated { lat, lon } => {
                self.location = Location::Coordinates {
                    lat: *lat,
                    lon: *lon,
                };
            }
            RefreshTrigger::Interval | RefreshTrigger::Manual => {}
        }

        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Fetch current weather and forecast for the session location. When a
    /// live source is configured and either call fails, the whole pair is
    /// substituted with simulated data so the two never mix.
    pub async fn fetch_observations(&self) -> Observations {
        if let Some(live) = &self.live {
            match fetch_live(live.as_ref(), &self.location).await {
                Ok((weather, forecast)) => {
                    return Observations {
                        weather,
                        forecast,
                        simulated: false,
                    };
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        location = %self.location,
                        "live weather unavailable, falling back to simulated data"
                    );
                }
            }
        }

        let now = Utc::now();
        Observations {
            weather: self.simulated.current_at(&self.location, now),
            forecast: self.simulated.forecast_at(&self.location, now),
            simulated: true,
        }
    }

    /// Apply fetched observations under `ticket` and return the standing
    /// advisory report. A stale completion — an older ticket finishing
    /// after a newer one has already been applied — is dropped;
    /// last-writer-wins by issuance order, not completion order.
    pub fn apply(&mut self, ticket: RefreshTicket, observations: Observations) -> AdvisoryReport {
        if ticket.0 <= self.applied {
            if let Some(report) = &self.last_report {
                debug!(
                    ticket = ticket.0,
                    applied = self.applied,
                    "dropping stale refresh result"
                );
                return report.clone();
            }
        }

        let report = advisory::evaluate(
            &observations.weather,
            Some(&observations.forecast),
            &self.thresholds,
        );

        self.soil_moisture = SoilMoisture::new(report.soil_moisture_pct);
        self.weather = Some(observations.weather);
        self.forecast = Some(observations.forecast);
        self.demo_mode = observations.simulated;
        self.applied = self.applied.max(ticket.0);
        self.last_report = Some(report.clone());

        report
    }

    /// Manual activation: flat moisture boost, on-flag, activation
    /// timestamp. Bypasses the advisory status without touching the
    /// threshold logic.
    pub fn activate_irrigation(&mut self, now: DateTime<Utc>) -> SoilMoisture {
        self.irrigation.on = true;
        self.irrigation.last_activated = Some(now);
        self.soil_moisture = self.soil_moisture.adjusted(IRRIGATION_BOOST);
        self.soil_moisture
    }

    pub fn deactivate_irrigation(&mut self) {
        self.irrigation.on = false;
    }
}

async fn fetch_live(
    source: &dyn WeatherSource,
    location: &Location,
) -> Result<(CurrentWeather, ForecastSeries), DataUnavailable> {
    let weather = source.fetch_current(location).await?;
    let forecast = source.fetch_forecast(location).await?;
    Ok((weather, forecast))
}
