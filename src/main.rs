use anyhow::{Context, Result};
use std::process;

use rgbshift::args::{CliAction, ParsedArgs, RunOptions, display_help, display_version_info};
use rgbshift::commands;
use rgbshift::config::Config;
use rgbshift::constants::EXIT_FAILURE;
use rgbshift::device::openrgb::OpenRgbDevice;
use rgbshift::instance::{InstanceLock, lock_path};
use rgbshift::logger::Log;
use rgbshift::pipeline::Pipeline;
use rgbshift::signals::setup_signal_handler;
use rgbshift::solar::create_provider;
use rgbshift::utils::format_offset;

fn main() {
    let cli_log = Log::new(0);
    let ParsedArgs { action } = ParsedArgs::from_env(&cli_log);

    let (log, result) = match action {
        CliAction::ShowHelp => {
            display_help(&cli_log);
            return;
        }
        CliAction::ShowVersion => {
            display_version_info(&cli_log);
            return;
        }
        CliAction::ShowHelpDueToError => {
            display_help(&cli_log);
            process::exit(EXIT_FAILURE);
        }
        CliAction::Test { options, color } => {
            let log = Log::new(options.verbosity);
            let result = commands::test::handle_test_command(&options, color, &log);
            (log, result)
        }
        CliAction::PrintSchedule(options) => {
            let log = Log::new(options.verbosity);
            let result = commands::schedule::handle_schedule_command(&options, &log);
            (log, result)
        }
        CliAction::Run(options) => {
            let log = Log::new(options.verbosity);
            let result = run(&options, &log);
            (log, result)
        }
    };

    if let Err(e) = result {
        log.log_pipe();
        log.log_critical(&format!("{:#}", e));
        log.log_end();
        process::exit(EXIT_FAILURE);
    }
}

/// Main loop: build today's gradient, connect, then push color changes until
/// a shutdown signal arrives or a push fails.
fn run(options: &RunOptions, log: &Log) -> Result<()> {
    log.log_version();

    let config = Config::load_or_default_path(options.config_path.as_deref(), log)?;
    config.log_config(log);

    let provider = create_provider(&config, log)?;
    let solar = provider
        .solar_times()
        .context("Couldn't get solar times")?;
    log.log_block_start(&format!("Solar times from {}", provider.source_name()));
    solar.log(log);

    // Construction errors abort rather than exit
    let table = match config.schedule()?.build(&solar) {
        Ok(table) => table,
        Err(e) => {
            log.log_pipe();
            log.log_critical(&format!("Invalid gradient schedule: {}", e));
            log.log_end();
            process::abort();
        }
    };

    log.log_block_start(&format!(
        "Gradient ready: {} keyframes from {} to {}",
        table.keyframes().len(),
        format_offset(table.keyframes()[0].offset),
        format_offset(table.keyframes()[table.keyframes().len() - 1].offset)
    ));

    let lock = InstanceLock::acquire(&lock_path(), log.clone())?;

    let device = OpenRgbDevice::connect(config.address(), config.client_name(), log.named("openrgb"))
        .context("Couldn't synchronise devices and colors from server")?;
    log.log_decorated(&format!(
        "Connected to {} ({} controller(s), {} LEDs)",
        config.address(),
        device.controllers().len(),
        device.led_count()
    ));

    let running = setup_signal_handler(log)?;

    log.log_block_start(&format!(
        "Updating every {} ms",
        config.update_interval().as_millis()
    ));

    let mut pipeline = Pipeline::new(table, device, log.clone());
    pipeline
        .run(&running, config.update_interval())
        .context("Couldn't synchronise colors to server")?;

    log.log_block_start("Shutting down rgbshift...");
    drop(pipeline);
    drop(lock);
    log.log_end();
    Ok(())
}
