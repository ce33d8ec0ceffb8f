//! Error types for the segway balancing controller.
//!
//! The balance loop has exactly two failure classes: hardware I/O faults,
//! which are fatal and must never be papered over with a default reading, and
//! timing overruns, which are reported but do not stop the loop. Degenerate
//! configuration is a third, startup-only class.
//!
//! - [`rt`]: copyable fault codes raised from the control loop
//! - [`device`]: gyro, motor and battery driver failures
//! - [`validation`]: configuration and input validation failures
//! - [`common`]: the top-level [`SegwayError`] plus classification helpers
//!
//! # Example
//!
//! ```
//! use segway_errors::prelude::*;
//!
//! fn check_voltage(volts: f64) -> Result<f64> {
//!     if !(volts.is_finite() && volts > 0.0) {
//!         return Err(ValidationError::out_of_range("battery.voltage", volts, 0.0, f64::MAX).into());
//!     }
//!     Ok(volts)
//! }
//!
//! assert!(check_voltage(7.9).is_ok());
//! assert!(check_voltage(0.0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod device;
pub mod prelude;
pub mod rt;
pub mod validation;

pub use common::{ErrorCategory, ErrorSeverity, SegwayError};
pub use device::DeviceError;
pub use rt::RTError;
pub use validation::ValidationError;

/// A specialized `Result` type for controller operations.
pub type Result<T> = std::result::Result<T, SegwayError>;

/// A specialized `Result` type for hot-path operations.
pub type RTResult<T = ()> = std::result::Result<T, RTError>;
