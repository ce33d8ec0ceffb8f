//! Battery voltage compensation.
//!
//! Motor torque at a given duty falls with supply voltage. Scaling every
//! duty command by `nominal / measured` keeps the loop gain at its tuned
//! value as the pack drains. The scalar is measured once at startup.

use segway_errors::DeviceError;

/// Device name used in battery errors.
pub const BATTERY_DEVICE: &str = "battery";

/// Startup voltage compensation scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryCompensation {
    nominal_voltage: f64,
    measured_voltage: f64,
    scaling: f64,
}

impl BatteryCompensation {
    /// Compute the scalar from a startup voltage reading.
    ///
    /// # Errors
    ///
    /// A measured voltage that is non-finite or not strictly positive is
    /// reported as an invalid battery reading.
    pub fn from_measurement(nominal_voltage: f64, measured_voltage: f64) -> Result<Self, DeviceError> {
        let measured_voltage = DeviceError::check_finite(BATTERY_DEVICE, measured_voltage)?;
        if measured_voltage <= 0.0 {
            return Err(DeviceError::InvalidReading {
                device: BATTERY_DEVICE.to_string(),
                value: measured_voltage,
            });
        }

        Ok(Self {
            nominal_voltage,
            measured_voltage,
            scaling: nominal_voltage / measured_voltage,
        })
    }

    /// Compensation for a battery sitting exactly at nominal.
    pub fn unity(nominal_voltage: f64) -> Self {
        Self {
            nominal_voltage,
            measured_voltage: nominal_voltage,
            scaling: 1.0,
        }
    }

    /// `nominal / measured`.
    #[inline]
    pub fn scaling(&self) -> f64 {
        self.scaling
    }

    /// Voltage read at startup.
    pub fn measured_voltage(&self) -> f64 {
        self.measured_voltage
    }

    /// Voltage the gains were tuned at.
    pub fn nominal_voltage(&self) -> f64 {
        self.nominal_voltage
    }
}
