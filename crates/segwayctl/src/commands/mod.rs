//! Command implementations for segwayctl

pub mod config;
pub mod run;

use clap::{Args, Subcommand, ValueEnum};
use segway_core::ConfigFormat;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file (JSON or YAML); defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of loop iterations to run
    #[arg(short = 'n', long, default_value_t = 250)]
    pub iterations: u64,

    /// Simulated battery voltage
    #[arg(long, default_value_t = 8.0, allow_negative_numbers = true)]
    pub voltage: f64,

    /// Constant gyro bias in deg/s
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub gyro_bias: f64,

    /// Commanded forward speed
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub speed: f64,

    /// Commanded turn rate
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub turn: f64,

    /// Wheel rotation rate of the simulated rig in deg/s
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub wheel_rate: f64,

    /// Disconnect the gyro after this many iterations
    #[arg(long)]
    pub gyro_fault_after: Option<u64>,

    /// Pace iterations with the wall clock instead of simulated time
    #[arg(long)]
    pub realtime: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the default configuration
    Default {
        /// Serialization format; defaults to the output file extension, or JSON on stdout
        #[arg(short, long, value_enum)]
        format: Option<ConfigFormatArg>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigFormatArg {
    Json,
    Yaml,
}

impl From<ConfigFormatArg> for ConfigFormat {
    fn from(arg: ConfigFormatArg) -> Self {
        match arg {
            ConfigFormatArg::Json => ConfigFormat::Json,
            ConfigFormatArg::Yaml => ConfigFormat::Yaml,
        }
    }
}
