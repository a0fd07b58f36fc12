//! Command-line argument parsing and processing.
//!
//! Arguments are declared with clap's derive API and then folded into a single
//! [`CliAction`], so `main` only has to match on what to do. Help and version
//! output use the application's own log styling instead of clap's renderer.

use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;

use crate::color::Color;
use crate::logger::Log;

#[derive(Parser, Debug)]
#[command(name = "rgbshift", version, about)]
struct Cli {
    /// Increase log verbosity (-d for debug, -dd for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Read configuration from PATH instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print today's gradient and the current color, then exit
    #[arg(short, long, conflicts_with = "test")]
    schedule: bool,

    /// Push a single color to the device, then exit
    #[arg(short, long, value_name = "HEX")]
    test: Option<String>,
}

/// Settings shared by every action that loads the configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunOptions {
    pub verbosity: u8,
    pub config_path: Option<PathBuf>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the color loop
    Run(RunOptions),
    /// Print the day's keyframes and the color right now
    PrintSchedule(RunOptions),
    /// Push one color and exit
    Test { options: RunOptions, color: Color },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name, as with `std::env::args()`.
    /// Problems are logged as warnings and reported as
    /// [`CliAction::ShowHelpDueToError`].
    pub fn parse<I, S>(args: I, log: &Log) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                let action = match e.kind() {
                    ErrorKind::DisplayHelp => CliAction::ShowHelp,
                    ErrorKind::DisplayVersion => CliAction::ShowVersion,
                    _ => {
                        let message = e.to_string();
                        let first_line = message.lines().next().unwrap_or("invalid arguments");
                        log.log_warning(first_line.trim_start_matches("error: "));
                        CliAction::ShowHelpDueToError
                    }
                };
                return ParsedArgs { action };
            }
        };

        let options = RunOptions {
            verbosity: cli.debug,
            config_path: cli.config,
        };

        let action = if let Some(hex) = cli.test {
            match Color::from_hex(&hex) {
                Ok(color) => CliAction::Test { options, color },
                Err(e) => {
                    log.log_warning(&format!("Invalid color {:?} for --test: {}", hex, e));
                    CliAction::ShowHelpDueToError
                }
            }
        } else if cli.schedule {
            CliAction::PrintSchedule(options)
        } else {
            CliAction::Run(options)
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env(log: &Log) -> ParsedArgs {
        Self::parse(std::env::args_os(), log)
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info(log: &Log) {
    log.log_version();
    log.log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help(log: &Log) {
    log.log_version();
    log.log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    log.log_block_start("Usage: rgbshift [OPTIONS]");
    log.log_block_start("Options:");
    log.log_indented("-c, --config <PATH>  Use a configuration file at PATH");
    log.log_indented("-d, --debug          Enable debug output (repeat for trace output)");
    log.log_indented("-h, --help           Print help information");
    log.log_indented("-s, --schedule       Print today's gradient and current color");
    log.log_indented("-t, --test <HEX>     Push a single color, e.g. --test '#ff8000'");
    log.log_indented("-V, --version        Print version information");
    log.log_end();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        ParsedArgs::parse(args.iter().copied(), &Log::quiet()).action
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&["rgbshift"]), CliAction::Run(RunOptions::default()));
    }

    #[test]
    fn test_parse_debug_counts() {
        assert_eq!(
            parse(&["rgbshift", "-d"]),
            CliAction::Run(RunOptions {
                verbosity: 1,
                config_path: None
            })
        );
        assert_eq!(
            parse(&["rgbshift", "-dd"]),
            CliAction::Run(RunOptions {
                verbosity: 2,
                config_path: None
            })
        );
        assert_eq!(
            parse(&["rgbshift", "--debug", "--debug"]),
            CliAction::Run(RunOptions {
                verbosity: 2,
                config_path: None
            })
        );
    }

    #[test]
    fn test_parse_help_flags() {
        assert_eq!(parse(&["rgbshift", "--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["rgbshift", "-h"]), CliAction::ShowHelp);
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse(&["rgbshift", "--version"]), CliAction::ShowVersion);
        assert_eq!(parse(&["rgbshift", "-V"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert_eq!(
            parse(&["rgbshift", "--reload"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_config_path() {
        assert_eq!(
            parse(&["rgbshift", "-c", "/tmp/rgbshift.toml", "-d"]),
            CliAction::Run(RunOptions {
                verbosity: 1,
                config_path: Some(PathBuf::from("/tmp/rgbshift.toml"))
            })
        );
    }

    #[test]
    fn test_parse_schedule() {
        assert_eq!(
            parse(&["rgbshift", "--schedule"]),
            CliAction::PrintSchedule(RunOptions::default())
        );
    }

    #[test]
    fn test_parse_test_color() {
        assert_eq!(
            parse(&["rgbshift", "--test", "#FF8000"]),
            CliAction::Test {
                options: RunOptions::default(),
                color: Color::from_rgb8(0xff, 0x80, 0x00),
            }
        );
    }

    #[test]
    fn test_parse_test_invalid_color() {
        assert_eq!(
            parse(&["rgbshift", "--test", "orange"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_test_missing_value() {
        assert_eq!(parse(&["rgbshift", "--test"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_schedule_conflicts_with_test() {
        assert_eq!(
            parse(&["rgbshift", "-s", "-t", "#000000"]),
            CliAction::ShowHelpDueToError
        );
    }
}
