//! # rgbshift
//!
//! Shifts OpenRGB lighting through a daylight color gradient.
//!
//! The day is described by seven color keyframes anchored to wake/sleep times and
//! the local sunrise, solar noon and sunset. Once per tick the current time of day
//! is looked up in that gradient, blended in Lab space, and pushed to the OpenRGB
//! server whenever the resulting `#rrggbb` value changes.
//!
//! ## Architecture
//!
//! - **args**: Command-line parsing into a single action
//! - **color**: sRGB colors with Lab blending
//! - **commands**: One-shot --schedule and --test handlers
//! - **config**: Configuration loading, validation, and default generation
//! - **constants**: Application-wide constants and defaults
//! - **device**: Device sink trait and the OpenRGB SDK client
//! - **error**: Typed construction and forwarding errors
//! - **gradient**: Keyframe table and piecewise-linear lookup
//! - **instance**: Single-instance lock file
//! - **logger**: Injected logging handle with visual formatting
//! - **pipeline**: Fixed-rate sampling loop with change detection
//! - **schedule**: Builds the daily gradient from wake/sleep and solar times
//! - **signals**: SIGINT/SIGTERM handling
//! - **solar**: Solar time providers
//! - **utils**: Time-of-day helpers

pub mod args;
pub mod color;
pub mod commands;
pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod gradient;
pub mod instance;
pub mod logger;
pub mod pipeline;
pub mod schedule;
pub mod signals;
pub mod solar;
pub mod utils;

// Re-export important types for easier access
pub use color::Color;
pub use config::Config;
pub use device::DeviceSink;
pub use error::{ConstructionError, ForwardError};
pub use gradient::{GradientTable, Keyframe};
pub use logger::{Log, LogLevel};
pub use pipeline::{Pipeline, TickOutcome};
pub use schedule::{Schedule, build_schedule};
pub use solar::{SolarTimeProvider, SolarTimes};
