//! Daily schedule that turns wake/sleep times and solar events into a gradient.
//!
//! The day is split into seven anchors, each with a fixed hue:
//!
//! | anchor   | hue     |
//! |----------|---------|
//! | 00:00    | black   |
//! | wake     | black   |
//! | sunrise  | red     |
//! | noon     | yellow  |
//! | sunset   | cyan    |
//! | sleep    | blue    |
//! | 24:00    | black   |
//!
//! The schedule is built once at startup. Solar times are not refreshed when the
//! date changes, so a long-running process keeps using the day it started on.

use std::time::Duration;

use crate::color::Color;
use crate::constants::{
    HUE_NIGHT, HUE_NOON, HUE_SLEEP, HUE_SUNRISE, HUE_SUNSET, SECONDS_PER_DAY,
};
use crate::error::ConstructionError;
use crate::gradient::{GradientTable, Keyframe};
use crate::solar::SolarTimes;

/// Names of the seven anchors, in keyframe order.
pub const ANCHOR_NAMES: [&str; 7] = [
    "midnight",
    "wake",
    "sunrise",
    "noon",
    "sunset",
    "sleep",
    "end of day",
];

/// Fixed daily offsets bracketing the solar part of the gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub wake: Duration,
    pub sleep: Duration,
}

impl Schedule {
    pub fn new(wake: Duration, sleep: Duration) -> Self {
        Self { wake, sleep }
    }

    /// Build the seven-keyframe gradient for the given solar times.
    ///
    /// # Errors
    /// Returns [`ConstructionError::ScheduleOrder`] unless
    /// `0 < wake < sunrise < noon < sunset < sleep < 24h`.
    pub fn build(&self, solar: &SolarTimes) -> Result<GradientTable, ConstructionError> {
        let offsets = [
            Duration::ZERO,
            self.wake,
            solar.sunrise,
            solar.noon,
            solar.sunset,
            self.sleep,
            Duration::from_secs(SECONDS_PER_DAY),
        ];
        let anchors: Vec<(&'static str, Duration)> =
            ANCHOR_NAMES.iter().copied().zip(offsets).collect();

        for pair in anchors.windows(2) {
            let ((previous_name, previous), (name, offset)) = (pair[0], pair[1]);
            if offset <= previous {
                return Err(ConstructionError::ScheduleOrder {
                    name,
                    previous_name,
                    previous,
                    offset,
                });
            }
        }

        let night = hue(HUE_NIGHT)?;
        GradientTable::new(vec![
            Keyframe::new(night, offsets[0]),
            Keyframe::new(night, self.wake),
            Keyframe::new(hue(HUE_SUNRISE)?, solar.sunrise),
            Keyframe::new(hue(HUE_NOON)?, solar.noon),
            Keyframe::new(hue(HUE_SUNSET)?, solar.sunset),
            Keyframe::new(hue(HUE_SLEEP)?, self.sleep),
            Keyframe::new(night, offsets[6]),
        ])
    }
}

impl Default for Schedule {
    /// Wake at 07:00 and sleep at 23:00.
    fn default() -> Self {
        Self {
            wake: Duration::from_secs(7 * 3600),
            sleep: Duration::from_secs(23 * 3600),
        }
    }
}

/// Build the gradient for the default wake/sleep times.
pub fn build_schedule(solar: &SolarTimes) -> Result<GradientTable, ConstructionError> {
    Schedule::default().build(solar)
}

fn hue(hex: &str) -> Result<Color, ConstructionError> {
    Color::from_hex(hex).map_err(|e| ConstructionError::InvalidColor {
        hex: hex.to_string(),
        reason: e.to_string(),
    })
}
