//! Configuration loading and validation for rgbshift.
//!
//! The configuration lives in `rgbshift.toml` under the XDG config directory
//! (`$XDG_CONFIG_HOME/rgbshift/rgbshift.toml`), or at a path passed on the command
//! line. A commented default file is written on first run.
//!
//! ```toml
//! #[Device]
//! address = "localhost:6742"        # OpenRGB SDK server
//! client_name = "rgbshift"          # Name shown in the OpenRGB client list
//!
//! #[Daily schedule]
//! wake = "07:00:00"                 # Lights start to come up
//! sleep = "23:00:00"                # Lights are dark again by midnight
//! update_interval_ms = 1000         # How often the color is recalculated
//!
//! #[Solar times]
//! solar_mode = "geo"                # "geo" or "manual"
//! latitude = 51.5074
//! longitude = -0.1278
//! sunrise = "06:30:00"              # manual mode only
//! noon = "12:30:00"
//! sunset = "19:00:00"
//! ```
//!
//! Everything is read once at startup; there is no live reload.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::logger::Log;
use crate::schedule::Schedule;
use crate::utils::{format_offset, parse_offset};

/// Where solar event times come from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SolarMode {
    /// Calculate from `latitude`/`longitude`
    Geo,
    /// Use the configured `sunrise`, `noon` and `sunset`
    Manual,
}

impl SolarMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolarMode::Geo => "geo",
            SolarMode::Manual => "manual",
        }
    }
}

fn default_wake() -> String {
    DEFAULT_WAKE.to_string()
}

fn default_sleep() -> String {
    DEFAULT_SLEEP.to_string()
}

fn default_sunrise() -> String {
    DEFAULT_SUNRISE.to_string()
}

fn default_noon() -> String {
    DEFAULT_NOON.to_string()
}

fn default_sunset() -> String {
    DEFAULT_SUNSET.to_string()
}

/// Configuration structure for rgbshift settings.
///
/// Optional fields fall back to the defaults in `constants`. When `solar_mode` is
/// omitted it is `geo` if both coordinates are present, `manual` otherwise.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// `host:port` of the OpenRGB SDK server.
    pub address: Option<String>,
    /// Client name announced to the server.
    pub client_name: Option<String>,
    #[serde(default = "default_wake")]
    pub wake: String,
    #[serde(default = "default_sleep")]
    pub sleep: String,
    pub update_interval_ms: Option<u64>,
    pub solar_mode: Option<SolarMode>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default = "default_sunrise")]
    pub sunrise: String,
    #[serde(default = "default_noon")]
    pub noon: String,
    #[serde(default = "default_sunset")]
    pub sunset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: None,
            client_name: None,
            wake: default_wake(),
            sleep: default_sleep(),
            update_interval_ms: None,
            solar_mode: None,
            latitude: None,
            longitude: None,
            sunrise: default_sunrise(),
            noon: default_noon(),
            sunset: default_sunset(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("rgbshift").join("rgbshift.toml"))
    }

    /// Load the configuration from the default location, creating it if missing.
    pub fn load(log: &Log) -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
            log.log_decorated(&format!(
                "Created default configuration at {}",
                config_path.display()
            ));
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Load from `path` when given, otherwise from the default location.
    pub fn load_or_default_path(path: Option<&Path>, log: &Log) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(log),
        }
    }

    /// Load and validate a configuration file at an explicit path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Self::apply_defaults(&mut config);
        validate_config(&config)?;

        Ok(config)
    }

    /// Write a commented default configuration file.
    ///
    /// The default uses manual solar times so a first run works without
    /// coordinates; the geo settings are included commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_content = ConfigBuilder::new()
            .add_section("Device")
            .add_setting(
                "address",
                &format!("\"{}\"", DEFAULT_ADDRESS),
                "OpenRGB SDK server (host:port)",
            )
            .add_setting(
                "client_name",
                &format!("\"{}\"", DEFAULT_CLIENT_NAME),
                "Name shown in OpenRGB's client list",
            )
            .add_section("Daily schedule")
            .add_setting(
                "wake",
                &format!("\"{}\"", DEFAULT_WAKE),
                "Lights start fading up from black (HH:MM:SS)",
            )
            .add_setting(
                "sleep",
                &format!("\"{}\"", DEFAULT_SLEEP),
                "Lights fade from blue back to black by midnight (HH:MM:SS)",
            )
            .add_setting(
                "update_interval_ms",
                &DEFAULT_UPDATE_INTERVAL_MS.to_string(),
                &format!(
                    "How often the color is recalculated ({}-{} ms)",
                    MINIMUM_UPDATE_INTERVAL_MS, MAXIMUM_UPDATE_INTERVAL_MS
                ),
            )
            .add_section("Solar times")
            .add_setting(
                "solar_mode",
                &format!("\"{}\"", SolarMode::Manual.as_str()),
                "Select: \"geo\" (from coordinates) or \"manual\"",
            )
            .add_setting(
                "sunrise",
                &format!("\"{}\"", DEFAULT_SUNRISE),
                "Red peak (HH:MM:SS) - ignored in geo mode",
            )
            .add_setting(
                "noon",
                &format!("\"{}\"", DEFAULT_NOON),
                "Yellow peak (HH:MM:SS) - ignored in geo mode",
            )
            .add_setting(
                "sunset",
                &format!("\"{}\"", DEFAULT_SUNSET),
                "Cyan peak (HH:MM:SS) - ignored in geo mode",
            )
            .add_commented_setting("latitude", "51.507400", "Geographic latitude for geo mode")
            .add_commented_setting("longitude", "-0.127800", "Geographic longitude for geo mode")
            .build();

        fs::write(path, config_content).context("Failed to write default config file")?;
        Ok(())
    }

    fn apply_defaults(config: &mut Config) {
        if config.address.is_none() {
            config.address = Some(DEFAULT_ADDRESS.to_string());
        }

        if config.client_name.is_none() {
            config.client_name = Some(DEFAULT_CLIENT_NAME.to_string());
        }

        if config.update_interval_ms.is_none() {
            config.update_interval_ms = Some(DEFAULT_UPDATE_INTERVAL_MS);
        }

        if config.solar_mode.is_none() {
            config.solar_mode = Some(if config.latitude.is_some() && config.longitude.is_some() {
                SolarMode::Geo
            } else {
                SolarMode::Manual
            });
        }

        // Cap latitude to avoid polar day/night where sunrise or sunset never happens
        if let Some(lat) = config.latitude {
            if (-90.0..=90.0).contains(&lat) && lat.abs() > MAXIMUM_LATITUDE {
                config.latitude = Some(MAXIMUM_LATITUDE * lat.signum());
            }
        }
    }

    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_ADDRESS)
    }

    pub fn client_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or(DEFAULT_CLIENT_NAME)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.unwrap_or(DEFAULT_UPDATE_INTERVAL_MS))
    }

    pub fn solar_mode(&self) -> SolarMode {
        self.solar_mode.unwrap_or(
            if self.latitude.is_some() && self.longitude.is_some() {
                SolarMode::Geo
            } else {
                SolarMode::Manual
            },
        )
    }

    /// The configured wake/sleep schedule.
    pub fn schedule(&self) -> Result<Schedule> {
        Ok(Schedule::new(
            parse_offset(&self.wake).context("Invalid wake time in config")?,
            parse_offset(&self.sleep).context("Invalid sleep time in config")?,
        ))
    }

    /// Print the active settings.
    pub fn log_config(&self, log: &Log) {
        log.log_block_start("Loaded configuration");
        log.log_indented(&format!("Device: {}", self.address()));
        log.log_indented(&format!("Client name: {}", self.client_name()));

        if let Ok(schedule) = self.schedule() {
            log.log_indented(&format!("Wake time: {}", format_offset(schedule.wake)));
            log.log_indented(&format!("Sleep time: {}", format_offset(schedule.sleep)));
        }
        log.log_indented(&format!(
            "Update interval: {} ms",
            self.update_interval().as_millis()
        ));
        log.log_indented(&format!("Solar mode: {}", self.solar_mode().as_str()));

        match self.solar_mode() {
            SolarMode::Geo => {
                if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
                    let lat_dir = if lat >= 0.0 { "N" } else { "S" };
                    let lon_dir = if lon >= 0.0 { "E" } else { "W" };
                    log.log_indented(&format!(
                        "Location: {:.4}°{}, {:.4}°{}",
                        lat.abs(),
                        lat_dir,
                        lon.abs(),
                        lon_dir
                    ));
                }
            }
            SolarMode::Manual => {
                log.log_indented(&format!("Sunrise time: {}", self.sunrise));
                log.log_indented(&format!("Noon time: {}", self.noon));
                log.log_indented(&format!("Sunset time: {}", self.sunset));
            }
        }
    }
}

/// Check a loaded configuration for values that cannot produce a working schedule.
pub fn validate_config(config: &Config) -> Result<()> {
    let address = config.address();
    if address.trim().is_empty() {
        anyhow::bail!("Device address cannot be empty");
    }
    if !address.contains(':') {
        anyhow::bail!(
            "Device address {:?} must include a port, e.g. \"{}\"",
            address,
            DEFAULT_ADDRESS
        );
    }

    if config.client_name().trim().is_empty() {
        anyhow::bail!("Client name cannot be empty");
    }

    let schedule = config.schedule()?;
    if schedule.wake.is_zero() {
        anyhow::bail!("Wake time must be after midnight");
    }
    if schedule.wake >= schedule.sleep {
        anyhow::bail!(
            "Wake time ({}) must be before sleep time ({})",
            config.wake,
            config.sleep
        );
    }

    let interval = config
        .update_interval_ms
        .unwrap_or(DEFAULT_UPDATE_INTERVAL_MS);
    if !(MINIMUM_UPDATE_INTERVAL_MS..=MAXIMUM_UPDATE_INTERVAL_MS).contains(&interval) {
        anyhow::bail!(
            "Update interval must be between {} and {} milliseconds",
            MINIMUM_UPDATE_INTERVAL_MS,
            MAXIMUM_UPDATE_INTERVAL_MS
        );
    }

    if let Some(lat) = config.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            anyhow::bail!("Latitude must be between -90 and 90 degrees (got {})", lat);
        }
    }
    if let Some(lon) = config.longitude {
        if !(-180.0..=180.0).contains(&lon) {
            anyhow::bail!(
                "Longitude must be between -180 and 180 degrees (got {})",
                lon
            );
        }
    }

    match config.solar_mode() {
        SolarMode::Geo => {
            if config.latitude.is_none() || config.longitude.is_none() {
                anyhow::bail!(
                    "solar_mode = \"geo\" requires both latitude and longitude.\n\
                    Add them to the configuration or set solar_mode = \"manual\"."
                );
            }
        }
        SolarMode::Manual => {
            let sunrise = parse_offset(&config.sunrise).context("Invalid sunrise time")?;
            let noon = parse_offset(&config.noon).context("Invalid noon time")?;
            let sunset = parse_offset(&config.sunset).context("Invalid sunset time")?;

            if !(schedule.wake < sunrise && sunrise < noon && noon < sunset && sunset < schedule.sleep)
            {
                anyhow::bail!(
                    "Manual times must be strictly ordered: wake ({}) < sunrise ({}) < noon ({}) < sunset ({}) < sleep ({})",
                    config.wake,
                    config.sunrise,
                    config.noon,
                    config.sunset,
                    config.sleep
                );
            }
        }
    }

    Ok(())
}

/// Builder for creating aligned, commented configuration files.
///
/// Comment columns are aligned to the longest setting line so generated files
/// stay tidy when defaults change.
struct ConfigBuilder {
    entries: Vec<EntryType>,
}

enum EntryType {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(EntryType::Section(format!("#[{}]", title)));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("{} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("# {} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                EntryType::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
