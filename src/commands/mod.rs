//! Command-line command handlers for rgbshift.
//!
//! One-shot commands (--schedule, --test) that run instead of the main loop.

pub mod schedule;
