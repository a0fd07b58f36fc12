//! Solar event times for the current day.
//!
//! The schedule needs three offsets since local midnight: sunrise, solar noon and
//! sunset. They come from a [`SolarTimeProvider`], either calculated from
//! geographic coordinates with the `sunrise` crate or taken verbatim from the
//! configuration.
//!
//! Solar noon is taken as the midpoint between sunrise and sunset, which is the
//! sun's transit time to within the precision the gradient needs.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use std::time::Duration;
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::config::{Config, SolarMode};
use crate::logger::Log;
use crate::utils::{format_offset, parse_offset, since_midnight};

/// Sunrise, solar noon and sunset as offsets since local midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarTimes {
    pub sunrise: Duration,
    pub noon: Duration,
    pub sunset: Duration,
}

impl SolarTimes {
    pub fn log(&self, log: &Log) {
        log.log_indented(&format!("Sunrise: {}", format_offset(self.sunrise)));
        log.log_indented(&format!("Solar noon: {}", format_offset(self.noon)));
        log.log_indented(&format!("Sunset: {}", format_offset(self.sunset)));
    }
}

/// Source of today's solar event times.
pub trait SolarTimeProvider {
    /// Solar times for the current local day.
    fn solar_times(&self) -> Result<SolarTimes>;

    /// Human-readable description of where the times come from.
    fn source_name(&self) -> String;
}

/// Calculates solar times from geographic coordinates.
pub struct GeoSolarProvider {
    latitude: f64,
    longitude: f64,
    log: Log,
}

impl GeoSolarProvider {
    /// Create a provider for the given coordinates.
    ///
    /// # Errors
    /// Returns an error if latitude is outside ±90° or longitude outside ±180°.
    pub fn new(latitude: f64, longitude: f64, log: Log) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            anyhow::bail!(
                "Invalid latitude: {}. Must be between -90 and 90 degrees",
                latitude
            );
        }
        if !(-180.0..=180.0).contains(&longitude) {
            anyhow::bail!(
                "Invalid longitude: {}. Must be between -180 and 180 degrees",
                longitude
            );
        }

        Ok(Self {
            latitude,
            longitude,
            log,
        })
    }

    /// Solar times for `date`, expressed as offsets since midnight in `tz`.
    ///
    /// # Errors
    /// Fails if an event lands on a different calendar day in `tz`, which happens
    /// when the coordinates are far from the machine's timezone.
    pub fn solar_times_in<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Result<SolarTimes> {
        let coord = Coordinates::new(self.latitude, self.longitude)
            .ok_or_else(|| anyhow::anyhow!("Failed to create coordinates"))?;
        let solar_day = SolarDay::new(coord, date);

        let sunrise_utc = solar_day.event_time(SolarEvent::Sunrise);
        let sunset_utc = solar_day.event_time(SolarEvent::Sunset);
        let noon_utc = sunrise_utc + (sunset_utc - sunrise_utc) / 2;

        let mut offsets = [Duration::ZERO; 3];
        for (slot, (name, event)) in offsets.iter_mut().zip([
            ("sunrise", sunrise_utc),
            ("solar noon", noon_utc),
            ("sunset", sunset_utc),
        ]) {
            let local = event.with_timezone(tz);
            if local.date_naive() != date {
                anyhow::bail!(
                    "{} for {:.4}, {:.4} falls on {} in the local timezone, not {}. \
                    Check that the coordinates match this machine's timezone.",
                    name,
                    self.latitude,
                    self.longitude,
                    local.date_naive(),
                    date
                );
            }
            *slot = since_midnight(&local);
        }

        let [sunrise, noon, sunset] = offsets;
        self.log.log_trace(&format!(
            "Solar events on {}: sunrise {}, noon {}, sunset {}",
            date,
            format_offset(sunrise),
            format_offset(noon),
            format_offset(sunset)
        ));

        Ok(SolarTimes {
            sunrise,
            noon,
            sunset,
        })
    }
}

impl SolarTimeProvider for GeoSolarProvider {
    fn solar_times(&self) -> Result<SolarTimes> {
        let today = Local::now().date_naive();
        self.solar_times_in(today, &Local).with_context(|| {
            format!(
                "Failed to calculate solar times for coordinates {:.4}, {:.4} on {}",
                self.latitude, self.longitude, today
            )
        })
    }

    fn source_name(&self) -> String {
        format!("coordinates {:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Returns fixed, manually configured solar times.
pub struct FixedSolarProvider {
    times: SolarTimes,
}

impl FixedSolarProvider {
    pub fn new(times: SolarTimes) -> Self {
        Self { times }
    }
}

impl SolarTimeProvider for FixedSolarProvider {
    fn solar_times(&self) -> Result<SolarTimes> {
        Ok(self.times)
    }

    fn source_name(&self) -> String {
        "manual times".to_string()
    }
}

/// Create the solar time provider selected by the configuration.
pub fn create_provider(config: &Config, log: &Log) -> Result<Box<dyn SolarTimeProvider>> {
    match config.solar_mode() {
        SolarMode::Geo => {
            let (latitude, longitude) = config
                .latitude
                .zip(config.longitude)
                .context("Geo mode requires latitude and longitude in the configuration")?;
            Ok(Box::new(GeoSolarProvider::new(
                latitude,
                longitude,
                log.named("solar"),
            )?))
        }
        SolarMode::Manual => Ok(Box::new(FixedSolarProvider::new(SolarTimes {
            sunrise: parse_offset(&config.sunrise).context("Invalid sunrise time")?,
            noon: parse_offset(&config.noon).context("Invalid noon time")?,
            sunset: parse_offset(&config.sunset).context("Invalid sunset time")?,
        }))),
    }
}
