//! # Kalooki CLI Library
//!
//! Command-line front end for the Kalooki rummy engine: play at the table,
//! simulate bot hands, and check or summarize recorded hand histories.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line arguments
//! and executes the appropriate subcommand.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["kalooki", "play", "--vs", "bots", "--hands", "2"];
//! let code = kalooki_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Play against three bots, or watch four bots play
//! - `sim`: Play bot-only hands and write JSONL hand histories
//! - `replay`: Re-deal recorded hands and print their events
//! - `verify`: Check that recorded hands replay legally
//! - `stats`: Aggregate outcomes from hand history files
//! - `deal`: Deal a single hand for inspection
//! - `cfg`: Display the resolved configuration

use clap::Parser;
use std::io::Write;

#[macro_use]
mod macros;
pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
pub mod ui;
pub mod validation;

use cli::{Commands, KalookiCli};
use commands::{
    handle_cfg_command, handle_deal_command, handle_play_command, handle_replay_command,
    handle_sim_command, handle_stats_command, handle_verify_command,
};
use commands::play::PlayOptions;
use commands::sim::SimOptions;

pub use cli::Vs;
pub use error::{BatchValidationError, CliError};

const COMMANDS: &[&str] = &["play", "sim", "replay", "verify", "stats", "deal", "cfg"];

/// Parses `args` and runs the chosen subcommand.
///
/// Returns the process exit code: `0` on success, `2` on any error,
/// `130` when a simulation is interrupted.
///
/// ```
/// use std::io;
/// let args = vec!["kalooki", "deal", "--seed", "42"];
/// let code = kalooki_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match KalookiCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    write_or_exit!(err, "{}", e);
                    write_or_exit!(err, "");
                    write_or_exit!(err, "Kalooki CLI");
                    write_or_exit!(err, "Usage: kalooki <command> [options]\n");
                    write_or_exit!(err, "Commands:");
                    for c in COMMANDS {
                        write_or_exit!(err, "  {}", c);
                    }
                    write_or_exit!(err, "\nFor full help, run: kalooki --help");
                    exit_code::ERROR
                }
            };
        }
    };

    logging::init_logging(cli.verbose);
    let result = dispatch(cli.cmd, out, err);
    report(result, err)
}

fn dispatch(cmd: Commands, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    match cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Play {
            vs,
            hands,
            seed,
            difficulty,
        } => {
            let cfg = load_config()?;
            let opts = PlayOptions {
                vs,
                hands,
                seed: seed.or(cfg.seed),
                difficulty: difficulty.unwrap_or(cfg.difficulty),
                rules: cfg.rules(),
            };
            let stdin = std::io::stdin();
            let mut stdin_lock = stdin.lock();
            handle_play_command(opts, out, err, &mut stdin_lock)
        }
        Commands::Sim {
            hands,
            output,
            seed,
            difficulty,
            max_turns,
        } => {
            let cfg = load_config()?;
            let opts = SimOptions {
                hands,
                output,
                seed: seed.or(cfg.seed),
                difficulty: difficulty.unwrap_or(cfg.difficulty),
                max_turns,
                rules: cfg.rules(),
            };
            handle_sim_command(opts, out, err)
        }
        Commands::Replay {
            input,
            viewer,
            json,
        } => handle_replay_command(input, viewer, json, out, err),
        Commands::Verify { input } => handle_verify_command(input, out, err),
        Commands::Stats { input } => handle_stats_command(input, out, err),
        Commands::Deal { seed } => {
            let cfg = load_config()?;
            handle_deal_command(seed.or(cfg.seed), cfg.rules(), out)
        }
    }
}

fn load_config() -> Result<config::Config, CliError> {
    config::load().map_err(|e| CliError::Config(format!("Invalid configuration: {}", e)))
}

fn report(result: Result<(), CliError>, err: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(_)) => exit_code::INTERRUPTED,
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn run_args(args: &[&str]) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(args.iter().copied(), &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn every_subcommand_parses() {
        let commands = vec![
            vec!["kalooki", "cfg"],
            vec!["kalooki", "play", "--vs", "bots"],
            vec!["kalooki", "play", "--difficulty", "hard"],
            vec!["kalooki", "sim", "--hands", "1"],
            vec!["kalooki", "replay", "--input", "a.jsonl", "--viewer", "left"],
            vec!["kalooki", "verify", "--input", "a.jsonl"],
            vec!["kalooki", "stats", "--input", "a.jsonl"],
            vec!["kalooki", "deal", "--seed", "3"],
        ];
        for args in commands {
            assert!(KalookiCli::try_parse_from(&args).is_ok(), "{:?}", args);
        }
    }

    #[test]
    fn bad_values_are_rejected_by_the_parser() {
        let rejected = [
            vec!["kalooki", "play", "--difficulty", "expert"],
            vec!["kalooki", "replay", "--input", "a", "--viewer", "north"],
            vec!["kalooki", "play", "--vs", "ai"],
            vec!["kalooki", "sim", "--hands", "many"],
        ];
        for args in rejected {
            assert!(KalookiCli::try_parse_from(&args).is_err(), "{:?}", args);
        }
    }

    #[test]
    fn help_goes_to_stdout() {
        let (code, out, err) = run_args(&["kalooki", "--help"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("Usage"));
        assert!(err.is_empty());
    }

    #[test]
    fn unknown_command_lists_the_commands() {
        let (code, _, err) = run_args(&["kalooki", "shuffle"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("Kalooki CLI"));
        for c in COMMANDS {
            assert!(err.contains(&format!("  {}", c)));
        }
    }

    #[test]
    #[serial]
    fn deal_dispatches() {
        let (code, out, _) = run_args(&["kalooki", "deal", "--seed", "42"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("Seed: 42"));
    }

    #[test]
    fn missing_history_is_an_error() {
        let (code, _, err) = run_args(&["kalooki", "verify", "--input", "missing.jsonl"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("Error: "));
    }
}
