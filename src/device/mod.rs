//! Lighting device abstraction.
//!
//! The pipeline only needs two things from a device: stage a color, then push it.
//! [`DeviceSink`] captures that so the pipeline can run against the OpenRGB client
//! in production and against mocks or recorders in tests.

use crate::color::Color;
use crate::error::ForwardError;
use crate::logger::Log;

pub mod openrgb;

/// A device that can display a single color across all of its LEDs.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceSink {
    /// Stage a color for the next [`synchronize`](DeviceSink::synchronize).
    fn set_color(&mut self, color: Color);

    /// Push the staged color to the hardware.
    fn synchronize(&mut self) -> Result<(), ForwardError>;
}

impl<S: DeviceSink + ?Sized> DeviceSink for Box<S> {
    fn set_color(&mut self, color: Color) {
        (**self).set_color(color);
    }

    fn synchronize(&mut self) -> Result<(), ForwardError> {
        (**self).synchronize()
    }
}

/// Stage and push a color, logging it on success.
pub fn forward<S: DeviceSink + ?Sized>(
    sink: &mut S,
    color: Color,
    log: &Log,
) -> Result<(), ForwardError> {
    sink.set_color(color);
    sink.synchronize()?;
    log.log_decorated(&format!("Updated color {}", color.hex()));
    Ok(())
}
