//! In-process hardware for tests and demos.
//!
//! A [`VirtualRig`] owns shared state for one gyro, two motors and a
//! battery. Handles returned by [`VirtualRig::gyro`], [`VirtualRig::motor`]
//! and [`VirtualRig::battery`] implement the port traits and are handed to
//! the balance loop, while the test keeps the rig to script readings, move
//! the wheels, inject faults and inspect the duties that were written.
//!
//! The rig has no dynamics of its own: wheels turn at whatever rate the
//! script sets, regardless of the commanded duty.

use crate::control::WheelDuty;
use crate::ports::{Battery, Gyro, Motor};
use parking_lot::Mutex;
use segway_errors::DeviceError;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const DUTY_LOG_CAPACITY: usize = 4_096;

/// Wheel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left wheel
    Left,
    /// Right wheel
    Right,
}

impl Side {
    /// Device name used in errors.
    pub fn device_name(self) -> &'static str {
        match self {
            Side::Left => "left_motor",
            Side::Right => "right_motor",
        }
    }
}

/// Device selector for fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigDevice {
    /// The rate gyro
    Gyro,
    /// One of the wheel motors
    Motor(Side),
    /// The battery monitor
    Battery,
}

/// Failure behaviour of a faulted device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigFault {
    /// Reads fail with an I/O error
    ReadFailure,
    /// Writes fail with an I/O error; reads still work
    WriteFailure,
    /// Every access reports a disconnect
    Disconnected,
    /// Reads succeed but return NaN
    NonFinite,
}

#[derive(Debug, Default)]
struct WheelState {
    position_deg: f64,
    rate_deg_per_s: f64,
    last_duty: f64,
    writes: u64,
    fault: Option<RigFault>,
}

#[derive(Debug)]
struct RigState {
    gyro_rate: f64,
    gyro_bias: f64,
    gyro_script: VecDeque<f64>,
    gyro_reads: u64,
    gyro_fault: Option<RigFault>,
    left: WheelState,
    right: WheelState,
    voltage: f64,
    battery_reads: u64,
    battery_fault: Option<RigFault>,
    duty_log: VecDeque<WheelDuty>,
}

impl RigState {
    fn wheel_mut(&mut self, side: Side) -> &mut WheelState {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn wheel(&self, side: Side) -> &WheelState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn log_duty(&mut self) {
        if self.duty_log.len() == DUTY_LOG_CAPACITY {
            self.duty_log.pop_front();
        }
        self.duty_log.push_back(WheelDuty {
            left: self.left.last_duty,
            right: self.right.last_duty,
        });
    }
}

/// Shared state of a simulated robot.
#[derive(Debug, Clone)]
pub struct VirtualRig {
    state: Arc<Mutex<RigState>>,
}

impl VirtualRig {
    /// A level, stationary rig on a battery at `voltage`.
    pub fn new(voltage: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(RigState {
                gyro_rate: 0.0,
                gyro_bias: 0.0,
                gyro_script: VecDeque::new(),
                gyro_reads: 0,
                gyro_fault: None,
                left: WheelState::default(),
                right: WheelState::default(),
                voltage,
                battery_reads: 0,
                battery_fault: None,
                duty_log: VecDeque::with_capacity(DUTY_LOG_CAPACITY),
            })),
        }
    }

    /// Gyro handle.
    pub fn gyro(&self) -> VirtualGyro {
        VirtualGyro {
            state: Arc::clone(&self.state),
        }
    }

    /// Motor handle for one wheel.
    pub fn motor(&self, side: Side) -> VirtualMotor {
        VirtualMotor {
            side,
            state: Arc::clone(&self.state),
        }
    }

    /// Battery handle.
    pub fn battery(&self) -> VirtualBattery {
        VirtualBattery {
            state: Arc::clone(&self.state),
        }
    }

    /// Steady gyro rate returned once any scripted samples are used up.
    pub fn set_gyro_rate(&self, rate: f64) {
        self.state.lock().gyro_rate = rate;
    }

    /// Constant offset added to every gyro reading.
    pub fn set_gyro_bias(&self, bias: f64) {
        self.state.lock().gyro_bias = bias;
    }

    /// Queue gyro samples to be returned, one per read, before falling back
    /// to the steady rate.
    pub fn script_gyro<I: IntoIterator<Item = f64>>(&self, samples: I) {
        self.state.lock().gyro_script.extend(samples);
    }

    /// Set a wheel's absolute position.
    pub fn set_wheel_position(&self, side: Side, position_deg: f64) {
        self.state.lock().wheel_mut(side).position_deg = position_deg;
    }

    /// Set the rate a wheel turns at during [`advance`](Self::advance).
    pub fn set_wheel_rate(&self, side: Side, rate_deg_per_s: f64) {
        self.state.lock().wheel_mut(side).rate_deg_per_s = rate_deg_per_s;
    }

    /// Turn the wheels for `dt` at their configured rates.
    pub fn advance(&self, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        let mut state = self.state.lock();
        for side in [Side::Left, Side::Right] {
            let wheel = state.wheel_mut(side);
            wheel.position_deg += wheel.rate_deg_per_s * dt_s;
        }
    }

    /// Battery voltage.
    pub fn set_voltage(&self, voltage: f64) {
        self.state.lock().voltage = voltage;
    }

    /// Make `device` misbehave until cleared.
    pub fn inject_fault(&self, device: RigDevice, fault: RigFault) {
        let mut state = self.state.lock();
        match device {
            RigDevice::Gyro => state.gyro_fault = Some(fault),
            RigDevice::Motor(side) => state.wheel_mut(side).fault = Some(fault),
            RigDevice::Battery => state.battery_fault = Some(fault),
        }
    }

    /// Clear every injected fault.
    pub fn clear_faults(&self) {
        let mut state = self.state.lock();
        state.gyro_fault = None;
        state.left.fault = None;
        state.right.fault = None;
        state.battery_fault = None;
    }

    /// Last duty written to a wheel.
    pub fn last_duty(&self, side: Side) -> f64 {
        self.state.lock().wheel(side).last_duty
    }

    /// Duty writes accepted by a wheel.
    pub fn duty_writes(&self, side: Side) -> u64 {
        self.state.lock().wheel(side).writes
    }

    /// Recent duty pairs, oldest first, recorded on each right-wheel write.
    pub fn duty_history(&self) -> Vec<WheelDuty> {
        self.state.lock().duty_log.iter().copied().collect()
    }

    /// Gyro reads served.
    pub fn gyro_reads(&self) -> u64 {
        self.state.lock().gyro_reads
    }

    /// Battery reads served.
    pub fn battery_reads(&self) -> u64 {
        self.state.lock().battery_reads
    }
}

fn fault_error(device: &str, fault: RigFault, write: bool) -> Option<DeviceError> {
    match (fault, write) {
        (RigFault::Disconnected, _) => Some(DeviceError::disconnected(device)),
        (RigFault::ReadFailure, false) => Some(DeviceError::read_failed(device, "injected read fault")),
        (RigFault::WriteFailure, true) => {
            Some(DeviceError::write_failed(device, "injected write fault"))
        }
        _ => None,
    }
}

/// Gyro port backed by a [`VirtualRig`].
#[derive(Debug, Clone)]
pub struct VirtualGyro {
    state: Arc<Mutex<RigState>>,
}

impl Gyro for VirtualGyro {
    fn read_rate(&mut self) -> Result<f64, DeviceError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.gyro_fault {
            if let Some(err) = fault_error("gyro", fault, false) {
                return Err(err);
            }
            if fault == RigFault::NonFinite {
                return Ok(f64::NAN);
            }
        }

        state.gyro_reads = state.gyro_reads.saturating_add(1);
        let rate = state.gyro_script.pop_front().unwrap_or(state.gyro_rate);
        Ok(rate + state.gyro_bias)
    }
}

/// Motor port backed by a [`VirtualRig`].
#[derive(Debug, Clone)]
pub struct VirtualMotor {
    side: Side,
    state: Arc<Mutex<RigState>>,
}

impl VirtualMotor {
    /// Which wheel this handle drives.
    pub fn side(&self) -> Side {
        self.side
    }
}

impl Motor for VirtualMotor {
    fn position_deg(&mut self) -> Result<f64, DeviceError> {
        let state = self.state.lock();
        let wheel = state.wheel(self.side);
        if let Some(fault) = wheel.fault {
            if let Some(err) = fault_error(self.side.device_name(), fault, false) {
                return Err(err);
            }
            if fault == RigFault::NonFinite {
                return Ok(f64::NAN);
            }
        }
        Ok(wheel.position_deg)
    }

    fn set_duty(&mut self, duty: f64) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.wheel(self.side).fault
            && let Some(err) = fault_error(self.side.device_name(), fault, true)
        {
            return Err(err);
        }

        let wheel = state.wheel_mut(self.side);
        wheel.last_duty = duty;
        wheel.writes = wheel.writes.saturating_add(1);
        if self.side == Side::Right {
            state.log_duty();
        }
        Ok(())
    }
}

/// Battery port backed by a [`VirtualRig`].
#[derive(Debug, Clone)]
pub struct VirtualBattery {
    state: Arc<Mutex<RigState>>,
}

impl Battery for VirtualBattery {
    fn voltage(&mut self) -> Result<f64, DeviceError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.battery_fault {
            if let Some(err) = fault_error("battery", fault, false) {
                return Err(err);
            }
            if fault == RigFault::NonFinite {
                return Ok(f64::NAN);
            }
        }
        state.battery_reads = state.battery_reads.saturating_add(1);
        Ok(state.voltage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gyro_script_then_steady_rate() -> Result<(), DeviceError> {
        let rig = VirtualRig::new(8.0);
        rig.set_gyro_rate(1.0);
        rig.set_gyro_bias(0.5);
        rig.script_gyro([10.0, 20.0]);
        let mut gyro = rig.gyro();

        assert_eq!(gyro.read_rate()?, 10.5);
        assert_eq!(gyro.read_rate()?, 20.5);
        assert_eq!(gyro.read_rate()?, 1.5);
        assert_eq!(rig.gyro_reads(), 3);
        Ok(())
    }

    #[test]
    fn test_advance_turns_wheels() -> Result<(), DeviceError> {
        let rig = VirtualRig::new(8.0);
        rig.set_wheel_position(Side::Left, 100.0);
        rig.set_wheel_rate(Side::Left, 360.0);
        rig.set_wheel_rate(Side::Right, -180.0);

        rig.advance(Duration::from_millis(500));

        assert_eq!(rig.motor(Side::Left).position_deg()?, 280.0);
        assert_eq!(rig.motor(Side::Right).position_deg()?, -90.0);
        Ok(())
    }

    #[test]
    fn test_duty_writes_recorded() -> Result<(), DeviceError> {
        let rig = VirtualRig::new(8.0);
        let mut left = rig.motor(Side::Left);
        let mut right = rig.motor(Side::Right);

        left.set_duty(-5.0)?;
        right.set_duty(5.0)?;

        assert_eq!(rig.last_duty(Side::Left), -5.0);
        assert_eq!(rig.duty_writes(Side::Right), 1);
        assert_eq!(
            rig.duty_history(),
            vec![WheelDuty {
                left: -5.0,
                right: 5.0
            }]
        );
        Ok(())
    }

    #[test]
    fn test_injected_faults() {
        let rig = VirtualRig::new(8.0);
        let mut gyro = rig.gyro();
        let mut motor = rig.motor(Side::Right);
        let mut battery = rig.battery();

        rig.inject_fault(RigDevice::Gyro, RigFault::ReadFailure);
        rig.inject_fault(RigDevice::Motor(Side::Right), RigFault::WriteFailure);
        rig.inject_fault(RigDevice::Battery, RigFault::Disconnected);

        assert!(matches!(gyro.read_rate(), Err(DeviceError::ReadFailed { .. })));
        assert!(motor.position_deg().is_ok());
        assert!(matches!(motor.set_duty(1.0), Err(DeviceError::WriteFailed { .. })));
        assert!(matches!(battery.voltage(), Err(DeviceError::Disconnected(_))));

        rig.clear_faults();
        assert!(gyro.read_rate().is_ok());
        assert!(motor.set_duty(1.0).is_ok());
        assert!(battery.voltage().is_ok());
    }

    #[test]
    fn test_non_finite_fault_returns_nan() {
        let rig = VirtualRig::new(8.0);
        rig.inject_fault(RigDevice::Motor(Side::Left), RigFault::NonFinite);
        let reading = rig.motor(Side::Left).position_deg();
        assert!(matches!(reading, Ok(v) if v.is_nan()));
    }

    #[test]
    fn test_battery_reads_counted() -> Result<(), DeviceError> {
        let rig = VirtualRig::new(7.4);
        let mut battery = rig.battery();
        assert_eq!(battery.voltage()?, 7.4);
        rig.set_voltage(6.0);
        assert_eq!(battery.voltage()?, 6.0);
        assert_eq!(rig.battery_reads(), 2);
        Ok(())
    }
}
