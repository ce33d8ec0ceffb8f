//! Balancing controller for a two-wheeled inverted pendulum.
//!
//! One rate gyro and two wheel encoders in; two wheel duty commands out,
//! once per fixed period. The pieces:
//!
//! - [`angle`]: tilt rate, tilt angle and integrated tilt from the gyro
//! - [`distance`]: distance, speed and position-tracking error from the
//!   wheel encoders and the reference speed
//! - [`control`]: the six-term weighted control law and wheel split
//! - [`battery`]: startup supply-voltage compensation
//! - [`controller`]: the pure per-iteration step function tying them together
//! - [`runner`]: the fixed-period loop that reads hardware, steps the
//!   controller and writes the motors
//! - [`ports`] and [`virtual_rig`]: hardware and command seams, with an
//!   in-process implementation
//!
//! # Example
//!
//! ```
//! use segway_core::prelude::*;
//! use segway_scheduler::ManualClock;
//!
//! # fn main() -> Result<(), segway_errors::SegwayError> {
//! let rig = VirtualRig::new(7.6);
//! let hardware = Hardware {
//!     gyro: rig.gyro(),
//!     left: rig.motor(Side::Left),
//!     right: rig.motor(Side::Right),
//! };
//!
//! let mut balance = BalanceLoop::with_clock(
//!     &SegwayConfig::default(),
//!     hardware,
//!     &mut rig.battery(),
//!     Stationary,
//!     ManualClock::new(),
//! )?;
//!
//! let summary = balance.run_iterations(100)?;
//! assert_eq!(summary.iterations, 100);
//! assert_eq!(rig.last_duty(Side::Left), 0.0);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod angle;
pub mod battery;
pub mod config;
pub mod control;
pub mod controller;
pub mod distance;
pub mod ports;
pub mod prelude;
pub mod runner;
pub mod virtual_rig;

pub use angle::{AngleEstimate, AngleEstimator};
pub use battery::BatteryCompensation;
pub use config::{ConfigFormat, MAX_DIFFERENTIATOR_WINDOW, SCHEMA_VERSION, SegwayConfig};
pub use control::{WheelDuty, control_law};
pub use controller::{BalanceController, ControlOutput, SensorReadings};
pub use distance::{DistanceState, DistanceTracker};
pub use ports::{Battery, Command, CommandSource, Gyro, Motor};
pub use runner::{BalanceLoop, Hardware, IterationReport, RunSummary};
pub use virtual_rig::VirtualRig;
