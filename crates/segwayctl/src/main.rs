//! segwayctl - balancing controller CLI
//!
//! Runs the balance loop against the in-process virtual rig and manages
//! controller configuration files.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{ConfigCommands, RunArgs};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "segwayctl")]
#[command(about = "Segway balancing controller CLI - run the balance loop and manage configuration")]
#[command(version)]
#[command(long_about = "
segwayctl drives the two-wheeled balancing controller against a simulated
rig and manages the controller configuration (loop period, gains, filter
time constants, wheel geometry, battery and actuation limits).

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the balance loop against the virtual rig
    Run(RunArgs),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("segwayctl={level},segway_core={level},segway_scheduler={level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.json),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ConfigFormatArg;
    use std::path::PathBuf;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_run_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["segwayctl", "run"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        match &cli.command {
            Commands::Run(args) => {
                assert_eq!(args.iterations, 250);
                assert!(args.config.is_none());
                assert!(!args.realtime);
                assert!(args.gyro_fault_after.is_none());
            }
            _ => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_global_json_flag_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["segwayctl", "run", "--json"])?;
        assert!(cli.json);
        Ok(())
    }

    #[test]
    fn parse_verbose_levels() -> TestResult {
        for (flag, expected) in [("-v", 1u8), ("-vv", 2), ("-vvv", 3)] {
            let cli = Cli::try_parse_from(["segwayctl", flag, "run"])?;
            assert_eq!(cli.verbose, expected);
        }
        Ok(())
    }

    #[test]
    fn parse_run_with_commands() -> TestResult {
        let cli = Cli::try_parse_from([
            "segwayctl",
            "run",
            "--iterations",
            "10",
            "--speed",
            "5.5",
            "--turn",
            "-3",
            "--gyro-bias",
            "0.25",
        ])?;
        match &cli.command {
            Commands::Run(args) => {
                assert_eq!(args.iterations, 10);
                assert!((args.speed - 5.5).abs() < f64::EPSILON);
                assert!((args.turn + 3.0).abs() < f64::EPSILON);
                assert!((args.gyro_bias - 0.25).abs() < f64::EPSILON);
            }
            _ => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_config_default_yaml() -> TestResult {
        let cli = Cli::try_parse_from(["segwayctl", "config", "default", "--format", "yaml"])?;
        match &cli.command {
            Commands::Config(ConfigCommands::Default { format, output }) => {
                assert!(matches!(format, Some(ConfigFormatArg::Yaml)));
                assert!(output.is_none());
            }
            _ => return Err("expected Config Default command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_config_validate_path() -> TestResult {
        let cli = Cli::try_parse_from(["segwayctl", "config", "validate", "robot.yaml"])?;
        match &cli.command {
            Commands::Config(ConfigCommands::Validate { path }) => {
                assert_eq!(path, &PathBuf::from("robot.yaml"));
            }
            _ => return Err("expected Config Validate command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["segwayctl", "fly"]).is_err());
    }
}
