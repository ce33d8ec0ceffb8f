//! Top-level error type and classification.

use core::fmt;

use crate::{DeviceError, RTError, ValidationError};

/// Top-level error type for the controller workspace.
#[derive(Debug, thiserror::Error)]
pub enum SegwayError {
    /// Loop fault without an underlying driver error
    #[error("RT error: {0}")]
    RT(#[from] RTError),

    /// Hardware fault raised from the loop, tagged with its fault code
    #[error("{code}: {source}")]
    Hardware {
        /// Fault code for the failing port
        code: RTError,
        /// Driver error
        source: DeviceError,
    },

    /// Hardware error outside the loop
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration document could not be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SegwayError {
    /// Tag a driver error with the fault code of the port it came from.
    pub fn hardware(code: RTError, source: DeviceError) -> Self {
        SegwayError::Hardware { code, source }
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        SegwayError::Config(msg.into())
    }

    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SegwayError::RT(_) => ErrorCategory::RT,
            SegwayError::Hardware { .. } | SegwayError::Device(_) => ErrorCategory::Device,
            SegwayError::Validation(_) => ErrorCategory::Validation,
            SegwayError::Io(_) => ErrorCategory::IO,
            SegwayError::Config(_) => ErrorCategory::Config,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SegwayError::RT(e) => e.severity(),
            SegwayError::Hardware { code, .. } => code.severity(),
            SegwayError::Device(e) => e.severity(),
            SegwayError::Validation(e) => e.severity(),
            SegwayError::Io(_) | SegwayError::Config(_) => ErrorSeverity::Error,
        }
    }

    /// Fault code for reporting, if this error maps onto one.
    pub fn rt_code(&self) -> Option<RTError> {
        match self {
            SegwayError::RT(code) | SegwayError::Hardware { code, .. } => Some(*code),
            SegwayError::Validation(_) | SegwayError::Config(_) => Some(RTError::InvalidConfig),
            SegwayError::Device(_) | SegwayError::Io(_) => None,
        }
    }

    /// Check if the loop may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Loop faults
    RT = 0,
    /// Device and hardware errors
    Device = 1,
    /// Configuration errors
    Config = 2,
    /// I/O errors
    IO = 3,
    /// Validation errors
    Validation = 4,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::RT => write!(f, "RT"),
            ErrorCategory::Device => write!(f, "Device"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the vehicle is no longer under control
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_hardware_error_keeps_code_and_source() {
        let err = SegwayError::hardware(
            RTError::GyroFault,
            DeviceError::read_failed("gyro", "sensor unplugged"),
        );
        assert_eq!(err.category(), ErrorCategory::Device);
        assert_eq!(err.rt_code(), Some(RTError::GyroFault));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_recoverable());
        assert!(err.to_string().starts_with("Gyro fault"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_overrun_is_recoverable() {
        let err: SegwayError = RTError::DeadlineMissed.into();
        assert!(err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::RT);
    }

    #[test]
    fn test_validation_maps_to_invalid_config() {
        let err: SegwayError = ValidationError::not_positive("timing.loop_period_s", 0.0).into();
        assert_eq!(err.rt_code(), Some(RTError::InvalidConfig));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_io_error_conversion() {
        let err: SegwayError = std::io::Error::other("disk gone").into();
        assert_eq!(err.category(), ErrorCategory::IO);
        assert_eq!(err.rt_code(), None);
    }
}
