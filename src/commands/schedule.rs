//! Implementation of the --schedule command.
//!
//! Builds today's gradient exactly as the main loop would and prints each
//! keyframe with its color, followed by the color for the current time. Nothing
//! is sent to the device.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::args::RunOptions;
use crate::config::Config;
use crate::gradient::{GradientTable, Segment};
use crate::logger::Log;
use crate::schedule::ANCHOR_NAMES;
use crate::solar::create_provider;
use crate::utils::{format_offset, now_since_midnight};

/// Handle the --schedule command.
pub fn handle_schedule_command(options: &RunOptions, log: &Log) -> Result<()> {
    log.log_version();

    let config = Config::load_or_default_path(options.config_path.as_deref(), log)?;
    let provider = create_provider(&config, log)?;
    let solar = provider.solar_times()?;

    log.log_block_start(&format!("Solar times from {}", provider.source_name()));
    solar.log(log);

    let table = config
        .schedule()?
        .build(&solar)
        .context("Today's solar times do not fit the configured wake/sleep window")?;

    log.log_block_start("Gradient keyframes");
    for line in keyframe_lines(&table) {
        log.log_indented(&line);
    }

    log.log_block_start(&current_color_line(&table, now_since_midnight()));
    log.log_end();
    Ok(())
}

/// One `HH:MM:SS  #rrggbb  name` line per keyframe.
pub fn keyframe_lines(table: &GradientTable) -> Vec<String> {
    let keyframes = table.keyframes();
    keyframes
        .iter()
        .enumerate()
        .map(|(index, keyframe)| {
            let name = if keyframes.len() == ANCHOR_NAMES.len() {
                ANCHOR_NAMES[index].to_string()
            } else {
                format!("keyframe {}", index)
            };
            format!(
                "{}  {}  {}",
                format_offset(keyframe.offset),
                keyframe.color,
                name
            )
        })
        .collect()
}

/// Describe the color at `t` and where it comes from.
pub fn current_color_line(table: &GradientTable, t: Duration) -> String {
    let lookup = table.lookup(t);
    match lookup.segment {
        Segment::Between { fraction, .. } => format!(
            "Current color at {}: {} ({:.1}% through segment)",
            format_offset(t),
            lookup.color,
            fraction * 100.0
        ),
        Segment::Before | Segment::After => {
            format!("Current color at {}: {}", format_offset(t), lookup.color)
        }
    }
}
