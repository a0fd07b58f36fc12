//! Sampling loop that turns the wall clock into a stream of distinct colors.
//!
//! Every tick samples the gradient at the current offset since midnight and
//! compares the result with the last color that reached the device. Only a
//! changed `#rrggbb` key is forwarded, so a slow segment produces one push per
//! visible step instead of one per tick.
//!
//! Ticks run at a fixed period measured from the first one. If a tick overruns,
//! the missed instants are dropped rather than replayed in a burst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::color::Color;
use crate::constants::CHECK_INTERVAL_MS;
use crate::device::{DeviceSink, forward};
use crate::error::ForwardError;
use crate::gradient::{GradientTable, Lookup, Segment};
use crate::logger::Log;
use crate::utils::{format_offset, now_since_midnight};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The color changed and was pushed to the device
    Forwarded(Color),
    /// Same key as the last forwarded color
    Unchanged,
}

/// Samples a gradient and forwards changed colors to a device.
pub struct Pipeline<S: DeviceSink> {
    table: GradientTable,
    sink: S,
    last_key: Option<String>,
    log: Log,
}

impl<S: DeviceSink> Pipeline<S> {
    pub fn new(table: GradientTable, sink: S, log: Log) -> Self {
        Self {
            table,
            sink,
            last_key: None,
            log,
        }
    }

    pub fn table(&self) -> &GradientTable {
        &self.table
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Key of the last color that was successfully forwarded.
    pub fn last_forwarded(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Sample the gradient at `t` and forward the color if its key changed.
    ///
    /// The baseline only moves after the device accepts the color; a failed
    /// push leaves it unchanged.
    pub fn evaluate(&mut self, t: Duration) -> Result<TickOutcome, ForwardError> {
        let lookup = self.table.lookup(t);
        self.log_lookup(t, &lookup);

        let key = lookup.color.hex();
        if self.last_key.as_deref() == Some(key.as_str()) {
            return Ok(TickOutcome::Unchanged);
        }

        forward(&mut self.sink, lookup.color, &self.log)?;
        self.last_key = Some(key);
        Ok(TickOutcome::Forwarded(lookup.color))
    }

    /// Evaluate at the current local time of day.
    pub fn tick(&mut self) -> Result<TickOutcome, ForwardError> {
        self.evaluate(now_since_midnight())
    }

    /// Tick every `interval` until `running` is cleared or a push fails.
    pub fn run(&mut self, running: &AtomicBool, interval: Duration) -> Result<(), ForwardError> {
        let mut deadline = Instant::now();

        while running.load(Ordering::SeqCst) {
            self.tick()?;

            let (next, skipped) = next_deadline(deadline, interval, Instant::now());
            if skipped > 0 {
                self.log.log_debug(&format!(
                    "Tick overran, skipping {} missed tick(s)",
                    skipped
                ));
            }
            deadline = next;

            sleep_until(deadline, running);
        }

        Ok(())
    }

    fn log_lookup(&self, t: Duration, lookup: &Lookup) {
        if !self.log.v(1) {
            return;
        }

        let keyframes = self.table.keyframes();
        match lookup.segment {
            Segment::Before => {
                let next = &keyframes[0];
                self.log.log_trace(&format!(
                    "Next key color {} at {}",
                    next.color,
                    format_offset(next.offset)
                ));
            }
            Segment::Between { index, fraction } => {
                let (previous, next) = (&keyframes[index], &keyframes[index + 1]);
                self.log.log_trace(&format!(
                    "Previous key color {} at {}",
                    previous.color,
                    format_offset(previous.offset)
                ));
                self.log.log_trace(&format!(
                    "Next key color {} at {}",
                    next.color,
                    format_offset(next.offset)
                ));
                self.log.log_debug(&format!(
                    "Interpolating color at {}: fraction {:.4} -> {}",
                    format_offset(t),
                    fraction,
                    lookup.color
                ));
            }
            Segment::After => {
                let previous = &keyframes[keyframes.len() - 1];
                self.log.log_trace(&format!(
                    "Previous key color {} at {}",
                    previous.color,
                    format_offset(previous.offset)
                ));
            }
        }
    }
}

/// Advance a fixed-rate deadline past `now`.
///
/// Returns the next deadline and how many whole periods were skipped because
/// `now` was already past them.
pub fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> (Instant, u32) {
    let next = previous + interval;
    if next > now || interval.is_zero() {
        return (next.max(now), 0);
    }

    let behind = now.duration_since(next);
    let skipped = u32::try_from(behind.as_nanos() / interval.as_nanos() + 1).unwrap_or(u32::MAX);
    (next + interval * skipped, skipped)
}

/// Sleep until `deadline` in short chunks so a cleared `running` flag is noticed.
fn sleep_until(deadline: Instant, running: &AtomicBool) {
    let chunk = Duration::from_millis(CHECK_INTERVAL_MS);
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(chunk.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MockDeviceSink;
    use crate::gradient::Keyframe;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn hours(h: u64) -> Duration {
        Duration::from_secs(h * 3600)
    }

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    fn table() -> GradientTable {
        GradientTable::new(vec![
            Keyframe::new(hex("#000000"), Duration::ZERO),
            Keyframe::new(hex("#000000"), hours(7)),
            Keyframe::new(hex("#ff0000"), hours(8)),
            Keyframe::new(hex("#ffff00"), hours(12)),
            Keyframe::new(hex("#000000"), hours(24)),
        ])
        .unwrap()
    }

    #[test]
    fn test_same_key_is_forwarded_once() {
        let mut sink = MockDeviceSink::new();
        sink.expect_set_color()
            .with(eq(hex("#000000")))
            .times(1)
            .return_const(());
        sink.expect_synchronize().times(1).returning(|| Ok(()));

        let mut pipeline = Pipeline::new(table(), sink, Log::quiet());
        assert_eq!(
            pipeline.evaluate(hours(2)).unwrap(),
            TickOutcome::Forwarded(hex("#000000"))
        );
        assert_eq!(pipeline.evaluate(hours(5)).unwrap(), TickOutcome::Unchanged);
        assert_eq!(pipeline.evaluate(hours(7)).unwrap(), TickOutcome::Unchanged);
        assert_eq!(pipeline.last_forwarded(), Some("#000000"));
    }

    #[test]
    fn test_changed_keys_are_forwarded_in_order() {
        let mut seq = Sequence::new();
        let mut sink = MockDeviceSink::new();
        for color in ["#ff0000", "#ffff00"] {
            sink.expect_set_color()
                .with(eq(hex(color)))
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
            sink.expect_synchronize()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|| Ok(()));
        }

        let mut pipeline = Pipeline::new(table(), sink, Log::quiet());
        pipeline.evaluate(hours(8)).unwrap();
        pipeline.evaluate(hours(8)).unwrap();
        pipeline.evaluate(hours(12)).unwrap();
        assert_eq!(pipeline.last_forwarded(), Some("#ffff00"));
    }

    #[test]
    fn test_failed_forward_keeps_baseline() {
        let mut sink = MockDeviceSink::new();
        sink.expect_set_color().times(2).return_const(());
        let mut calls = 0;
        sink.expect_synchronize().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Err(ForwardError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "server went away",
                )))
            } else {
                Ok(())
            }
        });

        let mut pipeline = Pipeline::new(table(), sink, Log::quiet());
        assert!(pipeline.evaluate(hours(8)).is_err());
        assert_eq!(pipeline.last_forwarded(), None);

        // The same color is still new because the first push never landed
        assert_eq!(
            pipeline.evaluate(hours(8)).unwrap(),
            TickOutcome::Forwarded(hex("#ff0000"))
        );
    }

    #[test]
    fn test_tiny_steps_within_segment_deduplicate() {
        let mut sink = MockDeviceSink::new();
        sink.expect_set_color().return_const(());
        sink.expect_synchronize().returning(|| Ok(()));

        let mut pipeline = Pipeline::new(table(), sink, Log::quiet());
        let mut forwarded = 0;
        // One tick per second across the first minute of the red->yellow segment
        for second in 0..60 {
            if let TickOutcome::Forwarded(_) =
                pipeline.evaluate(hours(8) + Duration::from_secs(second)).unwrap()
            {
                forwarded += 1;
            }
        }
        assert!(forwarded >= 1);
        assert!(forwarded < 60, "expected deduplication, got {} pushes", forwarded);
    }

    #[test]
    fn test_next_deadline_on_time() {
        let start = Instant::now();
        let interval = Duration::from_millis(100);
        let (next, skipped) = next_deadline(start, interval, start + Duration::from_millis(10));
        assert_eq!(next, start + interval);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_next_deadline_skips_missed_ticks() {
        let start = Instant::now();
        let interval = Duration::from_millis(100);
        let (next, skipped) = next_deadline(start, interval, start + Duration::from_millis(350));
        assert_eq!(skipped, 3);
        assert_eq!(next, start + Duration::from_millis(400));
    }

    #[test]
    fn test_run_stops_when_flag_clears() {
        let flat = GradientTable::new(vec![
            Keyframe::new(hex("#123456"), Duration::ZERO),
            Keyframe::new(hex("#123456"), hours(24)),
        ])
        .unwrap();

        let mut sink = MockDeviceSink::new();
        sink.expect_set_color()
            .with(eq(hex("#123456")))
            .times(1)
            .return_const(());
        sink.expect_synchronize().times(1).returning(|| Ok(()));

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(350));
            flag.store(false, Ordering::SeqCst);
        });

        let mut pipeline = Pipeline::new(flat, sink, Log::quiet());
        pipeline.run(&running, Duration::from_millis(100)).unwrap();
        stopper.join().unwrap();
    }

    #[test]
    fn test_run_returns_forward_error() {
        let mut sink = MockDeviceSink::new();
        sink.expect_set_color().return_const(());
        sink.expect_synchronize()
            .times(1)
            .returning(|| Err(ForwardError::NoDevices));

        let running = AtomicBool::new(true);
        let mut pipeline = Pipeline::new(table(), sink, Log::quiet());
        let result = pipeline.run(&running, Duration::from_millis(100));
        assert!(matches!(result, Err(ForwardError::NoDevices)));
    }
}
