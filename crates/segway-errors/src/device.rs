//! Hardware driver errors.
//!
//! Every variant names the device that failed so a fatal fault in the loop
//! can be traced back to a port.

use crate::common::ErrorSeverity;

/// Device and hardware errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    /// A read from the device failed
    #[error("Failed to read from {device}: {message}")]
    ReadFailed {
        /// Device identifier
        device: String,
        /// Driver message
        message: String,
    },

    /// A write to the device failed
    #[error("Failed to write to {device}: {message}")]
    WriteFailed {
        /// Device identifier
        device: String,
        /// Driver message
        message: String,
    },

    /// Device is gone
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// Device returned NaN or an infinite value
    #[error("Device {device} returned a non-finite reading: {value}")]
    InvalidReading {
        /// Device identifier
        device: String,
        /// The offending value
        value: f64,
    },
}

impl DeviceError {
    /// Get the error severity. Every hardware fault stops the loop.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }

    /// Name of the device that failed.
    pub fn device(&self) -> &str {
        match self {
            DeviceError::ReadFailed { device, .. }
            | DeviceError::WriteFailed { device, .. }
            | DeviceError::InvalidReading { device, .. } => device,
            DeviceError::Disconnected(device) => device,
        }
    }

    /// Create a read failure.
    pub fn read_failed(device: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceError::ReadFailed {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create a write failure.
    pub fn write_failed(device: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceError::WriteFailed {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        DeviceError::Disconnected(device.into())
    }

    /// Reject a non-finite reading, passing finite ones through.
    ///
    /// ```
    /// use segway_errors::DeviceError;
    ///
    /// assert_eq!(DeviceError::check_finite("gyro", 1.5), Ok(1.5));
    /// assert!(DeviceError::check_finite("gyro", f64::NAN).is_err());
    /// ```
    pub fn check_finite(device: &str, value: f64) -> Result<f64, DeviceError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DeviceError::InvalidReading {
                device: device.to_owned(),
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_names_device() {
        let err = DeviceError::read_failed("gyro:in2", "i/o timeout");
        assert_eq!(err.device(), "gyro:in2");
        assert!(err.to_string().contains("gyro:in2"));
        assert!(err.to_string().contains("i/o timeout"));

        let err = DeviceError::disconnected("motor:outA");
        assert_eq!(err.device(), "motor:outA");
    }

    #[test]
    fn test_device_error_is_critical() {
        assert_eq!(
            DeviceError::write_failed("motor:outD", "busy").severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_check_finite_rejects_infinity() {
        let err = DeviceError::check_finite("battery", f64::INFINITY);
        assert!(matches!(err, Err(DeviceError::InvalidReading { .. })));
    }
}
