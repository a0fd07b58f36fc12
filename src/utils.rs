//! Utility functions shared across the codebase.
//!
//! Conversions between wall-clock times and offsets since local midnight, plus the
//! duration ratio used to place a point inside a gradient segment.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveTime, TimeZone, Timelike};
use std::time::Duration;

/// Offset of a wall-clock time from the preceding local midnight.
///
/// Uses the time of day as shown on the clock, so on daylight saving changeover
/// days the offset tracks what the user sees rather than elapsed seconds.
pub fn since_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    time_to_offset(now.time())
}

/// Offset of the current local time from midnight.
pub fn now_since_midnight() -> Duration {
    since_midnight(&Local::now())
}

/// Convert a time of day into an offset since midnight.
///
/// Leap-second nanoseconds (>= 1e9) are folded into the last second.
pub fn time_to_offset(time: NaiveTime) -> Duration {
    let nanos = time.nanosecond().min(999_999_999);
    Duration::new(u64::from(time.num_seconds_from_midnight()), nanos)
}

/// Parse an `HH:MM:SS` string into an offset since midnight.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use rgbshift::utils::parse_offset;
/// assert_eq!(parse_offset("07:00:00").unwrap(), Duration::from_secs(7 * 3600));
/// assert!(parse_offset("7am").is_err());
/// ```
pub fn parse_offset(value: &str) -> Result<Duration> {
    let time = NaiveTime::parse_from_str(value, "%H:%M:%S")
        .with_context(|| format!("Invalid time {:?}. Use HH:MM:SS format", value))?;
    Ok(time_to_offset(time))
}

/// Format an offset since midnight as `HH:MM:SS`.
///
/// Offsets of a full day or more keep counting hours, so the upper sentinel of a
/// gradient prints as `24:00:00`.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use rgbshift::utils::format_offset;
/// assert_eq!(format_offset(Duration::from_secs(7 * 3600 + 90)), "07:01:30");
/// assert_eq!(format_offset(Duration::from_secs(24 * 3600)), "24:00:00");
/// ```
pub fn format_offset(offset: Duration) -> String {
    let secs = offset.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Fraction of the way `t` lies between `start` and `end`, clamped to [0.0, 1.0].
///
/// Returns `0.0` for an empty span; gradient construction guarantees callers never
/// pass one.
pub fn duration_ratio(t: Duration, start: Duration, end: Duration) -> f64 {
    let span = end.saturating_sub(start);
    if span.is_zero() {
        return 0.0;
    }
    let elapsed = t.saturating_sub(start);
    (elapsed.as_secs_f64() / span.as_secs_f64()).clamp(0.0, 1.0)
}
