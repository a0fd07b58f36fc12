//! Signal handling for rgbshift.
//!
//! SIGINT and SIGTERM clear a shared running flag. The pipeline checks that flag
//! between ticks and while sleeping, so shutdown happens at the next chunk
//! boundary instead of mid-push.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use crate::logger::Log;

/// Install the shutdown handlers and return the running flag they control.
pub fn setup_signal_handler(log: &Log) -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    let log = log.named("signals");

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let name = if sig == SIGINT { "SIGINT" } else { "SIGTERM" };
                log.log_debug(&format!("Received {}", name));

                if running_clone.swap(false, Ordering::SeqCst) {
                    log.log_pipe();
                    log.log_info(&format!("Received {}, shutting down", name));
                } else {
                    log.log_debug("Shutdown already in progress");
                }
            }
        })
        .context("failed to spawn signal handling thread")?;

    Ok(running)
}
