//! Application constants and default values for rgbshift.
//!
//! This module contains the configuration defaults, validation limits, the fixed
//! gradient hues and the operational constants used throughout the application.

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_ADDRESS: &str = "localhost:6742"; // OpenRGB SDK server
pub const DEFAULT_CLIENT_NAME: &str = "rgbshift";
pub const DEFAULT_WAKE: &str = "07:00:00";
pub const DEFAULT_SLEEP: &str = "23:00:00";
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000; // one tick per second
pub const DEFAULT_SUNRISE: &str = "07:30:00"; // manual mode only
pub const DEFAULT_NOON: &str = "12:30:00"; // manual mode only
pub const DEFAULT_SUNSET: &str = "19:00:00"; // manual mode only

// ═══ Gradient Hues ═══
// Key colors of the daily gradient, in schedule order

pub const HUE_NIGHT: &str = "#000000";
pub const HUE_SUNRISE: &str = "#ff0000";
pub const HUE_NOON: &str = "#ffff00";
pub const HUE_SUNSET: &str = "#00ffff";
pub const HUE_SLEEP: &str = "#0000ff";

// ═══ Validation Limits ═══

pub const MINIMUM_UPDATE_INTERVAL_MS: u64 = 100;
pub const MAXIMUM_UPDATE_INTERVAL_MS: u64 = 60_000;
pub const MAXIMUM_LATITUDE: f64 = 65.0; // solar events get unreliable closer to the poles

// ═══ Operational Timing Constants ═══

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
pub const CHECK_INTERVAL_MS: u64 = 250; // How often to check the running flag during sleep

// ═══ Device Communication Constants ═══

pub const SOCKET_TIMEOUT_MS: u64 = 5000; // startup reads only; pushes are never timed out
pub const MAX_PACKET_SIZE: u32 = 16 * 1024 * 1024;

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;

// ═══ Test Constants ═══
#[cfg(test)]
pub mod test_constants {
    pub const TEST_STANDARD_SUNRISE: &str = "07:30:00";
    pub const TEST_STANDARD_NOON: &str = "12:30:00";
    pub const TEST_STANDARD_SUNSET: &str = "19:00:00";
    pub const TEST_STANDARD_LATITUDE: f64 = 51.5074;
    pub const TEST_STANDARD_LONGITUDE: f64 = -0.1278;
}
