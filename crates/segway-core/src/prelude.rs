//! Prelude module for common controller types.

pub use crate::angle::{AngleEstimate, AngleEstimator};
pub use crate::battery::BatteryCompensation;
pub use crate::config::{ConfigFormat, SegwayConfig};
pub use crate::control::{WheelDuty, control_law};
pub use crate::controller::{BalanceController, ControlOutput, SensorReadings};
pub use crate::distance::{DistanceState, DistanceTracker};
pub use crate::ports::{
    Battery, Command, CommandSource, ConstantCommand, FnCommandSource, Gyro, Motor, Stationary,
};
pub use crate::runner::{BalanceLoop, Hardware, IterationReport, RunSummary};
pub use crate::virtual_rig::{RigDevice, RigFault, Side, VirtualRig};
