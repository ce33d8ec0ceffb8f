//! Fault codes raised from the balance loop.
//!
//! These are `Copy` and carry a fixed `#[repr(u8)]` code so the loop can
//! report them without allocating.

use core::fmt;

use crate::common::ErrorSeverity;

/// Balance loop fault codes.
///
/// # Examples
///
/// ```
/// use segway_errors::{RTError, ErrorSeverity};
///
/// let err = RTError::DeadlineMissed;
/// assert_eq!(err.code(), 4);
/// assert_eq!(err.severity(), ErrorSeverity::Warning);
/// assert!(err.is_recoverable());
///
/// assert!(RTError::GyroFault.requires_safety_action());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RTError {
    /// Gyro rate read failed or returned garbage
    GyroFault = 1,
    /// Motor position read or duty write failed
    MotorFault = 2,
    /// Battery voltage read failed
    BatteryFault = 3,
    /// Loop iteration ran past its deadline
    DeadlineMissed = 4,
    /// Configuration rejected at startup
    InvalidConfig = 5,
    /// Control law produced a NaN or infinite duty
    NonFiniteOutput = 6,
}

impl RTError {
    /// Get the numeric error code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get the error severity.
    pub fn severity(self) -> ErrorSeverity {
        match self {
            RTError::GyroFault => ErrorSeverity::Critical,
            RTError::MotorFault => ErrorSeverity::Critical,
            RTError::BatteryFault => ErrorSeverity::Error,
            RTError::DeadlineMissed => ErrorSeverity::Warning,
            RTError::InvalidConfig => ErrorSeverity::Error,
            RTError::NonFiniteOutput => ErrorSeverity::Critical,
        }
    }

    /// Check if the motors must be stopped in response to this error.
    pub fn requires_safety_action(self) -> bool {
        matches!(
            self,
            RTError::GyroFault | RTError::MotorFault | RTError::NonFiniteOutput
        )
    }

    /// Check if the loop may keep running after this error.
    ///
    /// Only an overrun is recoverable: the timer proceeds immediately.
    pub fn is_recoverable(self) -> bool {
        matches!(self, RTError::DeadlineMissed)
    }

    /// Create an error from a code.
    ///
    /// Returns `None` if the code does not correspond to a known error.
    ///
    /// ```
    /// use segway_errors::RTError;
    ///
    /// assert_eq!(RTError::from_code(2), Some(RTError::MotorFault));
    /// assert_eq!(RTError::from_code(0), None);
    /// ```
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RTError::GyroFault),
            2 => Some(RTError::MotorFault),
            3 => Some(RTError::BatteryFault),
            4 => Some(RTError::DeadlineMissed),
            5 => Some(RTError::InvalidConfig),
            6 => Some(RTError::NonFiniteOutput),
            _ => None,
        }
    }
}

impl fmt::Display for RTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RTError::GyroFault => write!(f, "Gyro fault"),
            RTError::MotorFault => write!(f, "Motor fault"),
            RTError::BatteryFault => write!(f, "Battery fault"),
            RTError::DeadlineMissed => write!(f, "Loop deadline missed"),
            RTError::InvalidConfig => write!(f, "Invalid configuration parameter"),
            RTError::NonFiniteOutput => write!(f, "Control output is not finite"),
        }
    }
}

impl std::error::Error for RTError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rt_error_codes_roundtrip_through_from_code() {
        for code in 1..=6u8 {
            let err = RTError::from_code(code);
            assert_eq!(err.map(RTError::code), Some(code));
        }
        assert_eq!(RTError::from_code(7), None);
    }

    #[test]
    fn test_rt_error_severity() {
        assert_eq!(RTError::GyroFault.severity(), ErrorSeverity::Critical);
        assert_eq!(RTError::DeadlineMissed.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_only_overrun_is_recoverable() {
        assert!(RTError::DeadlineMissed.is_recoverable());
        assert!(!RTError::GyroFault.is_recoverable());
        assert!(!RTError::MotorFault.is_recoverable());
        assert!(!RTError::InvalidConfig.is_recoverable());
    }

    #[test]
    fn test_safety_action() {
        assert!(RTError::MotorFault.requires_safety_action());
        assert!(!RTError::DeadlineMissed.requires_safety_action());
        assert!(!RTError::BatteryFault.requires_safety_action());
    }

    #[test]
    fn test_rt_error_display() {
        assert_eq!(RTError::GyroFault.to_string(), "Gyro fault");
    }

    #[test]
    fn test_rt_error_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<RTError>();
    }
}
