//! Error types for segwayctl

use segway_errors::{ErrorCategory, SegwayError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Controller fault: {0}")]
    ControllerFault(SegwayError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ConfigNotFound(_) => 2,
            CliError::ControllerFault(_) => 3,
            CliError::InvalidConfiguration(_) => 4,
            CliError::IoError(_) => 1,
        }
    }
}

impl From<SegwayError> for CliError {
    fn from(err: SegwayError) -> Self {
        match err {
            SegwayError::Io(io) => CliError::IoError(io),
            other => match other.category() {
                ErrorCategory::Validation | ErrorCategory::Config => {
                    CliError::InvalidConfiguration(other.to_string())
                }
                ErrorCategory::IO | ErrorCategory::RT | ErrorCategory::Device => {
                    CliError::ControllerFault(other)
                }
            },
        }
    }
}
