//! Typed errors returned by the gradient core and the device sink.
//!
//! Startup failures (configuration, solar times, device connection) travel as
//! `anyhow::Error` with context. The two failures the core itself can produce are
//! typed so that `main` can apply the matching termination policy.

use std::time::Duration;

use thiserror::Error;

use crate::utils::format_offset;

fn hms(offset: &Duration) -> String {
    format_offset(*offset)
}

/// An invalid gradient table or schedule.
#[derive(Debug, Error, PartialEq)]
pub enum ConstructionError {
    #[error("gradient needs at least 2 keyframes, got {count}")]
    TooFewKeyframes { count: usize },

    #[error(
        "keyframe {index} at {} does not come after the previous keyframe at {}",
        hms(.offset),
        hms(.previous)
    )]
    OutOfOrder {
        index: usize,
        previous: Duration,
        offset: Duration,
    },

    #[error("keyframe {index} at {} lies beyond the end of the day", hms(.offset))]
    BeyondDay { index: usize, offset: Duration },

    #[error("{name} must come after {previous_name} ({} is not after {})",
        hms(.offset),
        hms(.previous))]
    ScheduleOrder {
        name: &'static str,
        previous_name: &'static str,
        previous: Duration,
        offset: Duration,
    },

    #[error("invalid built-in color {hex:?}: {reason}")]
    InvalidColor { hex: String, reason: String },
}

/// A failed color push to the device.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("connection to device server lost: {0}")]
    Io(#[from] std::io::Error),

    #[error("no controllers to update")]
    NoDevices,
}
