//! Balance controller step function
//!
//! [`BalanceController::step`] is the whole per-iteration computation: it
//! takes the raw sensor readings and the motion command, advances both
//! estimators, evaluates the control law and returns the wheel duties. It
//! performs no I/O and never waits, so it can be driven by the real-time
//! loop, a simulator, or a test at any speed.

use crate::angle::{AngleEstimate, AngleEstimator};
use crate::battery::BatteryCompensation;
use crate::config::{GainConfig, SegwayConfig};
use crate::control::{WheelDuty, control_law};
use crate::distance::{DistanceState, DistanceTracker};
use crate::ports::Command;
use segway_errors::{RTError, RTResult, ValidationError};
use serde::Serialize;

/// Raw hardware readings for one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReadings {
    /// Gyro rate, degrees per second
    pub gyro_rate: f64,
    /// Left wheel cumulative position, degrees
    pub left_position_deg: f64,
    /// Right wheel cumulative position, degrees
    pub right_position_deg: f64,
}

/// Everything computed in one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlOutput {
    /// Tilt estimates
    pub angle: AngleEstimate,
    /// Translation estimates
    pub distance: DistanceState,
    /// Common duty before the turn split and clamp
    pub duty: f64,
    /// Duty sent to each wheel
    pub wheels: WheelDuty,
    /// Whether either wheel was clamped
    pub saturated: bool,
}

/// Estimators plus control law, owning all filter state.
#[derive(Debug, Clone)]
pub struct BalanceController {
    angle: AngleEstimator,
    distance: DistanceTracker,
    gains: GainConfig,
    battery: BatteryCompensation,
    duty_limit: Option<f64>,
    steps: u64,
}

impl BalanceController {
    /// Build a controller from a configuration and the startup battery
    /// compensation.
    ///
    /// # Errors
    ///
    /// Rejects an invalid configuration.
    pub fn new(config: &SegwayConfig, battery: BatteryCompensation) -> Result<Self, ValidationError> {
        config.validate()?;
        let dt = config.timing.loop_period_s;

        Ok(Self {
            angle: AngleEstimator::new(
                dt,
                config.filters.rate_highpass_tau_s,
                config.filters.angle_highpass_tau_s,
            ),
            distance: DistanceTracker::new(
                dt,
                config.filters.differentiator_window,
                config.geometry.distance_per_degree(),
            ),
            gains: config.gains,
            battery,
            duty_limit: config.actuation.duty_limit,
            steps: 0,
        })
    }

    /// Run one iteration of estimation and control.
    ///
    /// The two estimators are independent; both finish before the control
    /// law runs, and the full duty is known before either wheel value is
    /// produced.
    ///
    /// # Errors
    ///
    /// [`RTError::NonFiniteOutput`] if a wheel duty is NaN or infinite.
    /// Filter state has already advanced when this is returned.
    pub fn step(&mut self, readings: &SensorReadings, command: Command) -> RTResult<ControlOutput> {
        let angle = self.angle.update(readings.gyro_rate);
        let distance = self.distance.update(
            readings.left_position_deg,
            readings.right_position_deg,
            command.reference_speed,
        );

        let duty = control_law(&self.gains, self.battery.scaling(), &angle, &distance);
        let wheels = WheelDuty::split(duty, command.turn_rate, self.duty_limit);
        self.steps = self.steps.saturating_add(1);

        if !wheels.is_finite() {
            return Err(RTError::NonFiniteOutput);
        }

        Ok(ControlOutput {
            angle,
            distance,
            duty,
            wheels,
            saturated: wheels.is_saturated(self.duty_limit),
        })
    }

    /// Startup battery compensation.
    pub fn battery(&self) -> &BatteryCompensation {
        &self.battery
    }

    /// Active gains.
    pub fn gains(&self) -> &GainConfig {
        &self.gains
    }

    /// Per-wheel duty clamp.
    pub fn duty_limit(&self) -> Option<f64> {
        self.duty_limit
    }

    /// Iterations computed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Forget all estimator history. Battery compensation is kept.
    pub fn reset(&mut self) {
        self.angle.reset();
        self.distance.reset();
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller(config: &SegwayConfig) -> Result<BalanceController, ValidationError> {
        BalanceController::new(config, BatteryCompensation::unity(8.0))
    }

    #[test]
    fn test_zero_everything_gives_zero_duty() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctrl = controller(&SegwayConfig::default())?;
        for _ in 0..1_000 {
            let out = ctrl.step(&SensorReadings::default(), Command::STATIONARY)?;
            assert_eq!(out.wheels, WheelDuty::default());
            assert!(!out.saturated);
        }
        assert_eq!(ctrl.steps(), 1_000);
        Ok(())
    }

    #[test]
    fn test_first_step_is_zero_for_any_static_reading() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctrl = controller(&SegwayConfig::default())?;
        let readings = SensorReadings {
            gyro_rate: -3.2,
            left_position_deg: 12_345.0,
            right_position_deg: -678.0,
        };
        let out = ctrl.step(&readings, Command::STATIONARY)?;
        assert_eq!(out.duty, 0.0);
        Ok(())
    }

    #[test]
    fn test_turn_rate_splits_wheels() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctrl = controller(&SegwayConfig::default())?;
        let out = ctrl.step(&SensorReadings::default(), Command::new(0.0, 7.5))?;
        assert_relative_eq!(out.wheels.left, -7.5);
        assert_relative_eq!(out.wheels.right, 7.5);
        Ok(())
    }

    #[test]
    fn test_forward_tilt_drives_forward() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctrl = controller(&SegwayConfig::default())?;
        ctrl.step(&SensorReadings::default(), Command::STATIONARY)?;
        let readings = SensorReadings {
            gyro_rate: 20.0,
            ..SensorReadings::default()
        };
        let out = ctrl.step(&readings, Command::STATIONARY)?;
        assert!(out.duty > 0.0);
        assert!(out.angle.angle > 0.0);
        Ok(())
    }

    #[test]
    fn test_large_duty_is_clamped_and_reported() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctrl = controller(&SegwayConfig::default())?;
        ctrl.step(&SensorReadings::default(), Command::STATIONARY)?;
        let readings = SensorReadings {
            gyro_rate: 5_000.0,
            ..SensorReadings::default()
        };
        let out = ctrl.step(&readings, Command::STATIONARY)?;
        assert!(out.duty > 100.0);
        assert_relative_eq!(out.wheels.left, 100.0);
        assert!(out.saturated);
        Ok(())
    }

    #[test]
    fn test_no_anti_windup() -> Result<(), Box<dyn std::error::Error>> {
        // Held against a reference it cannot follow, the error integral
        // keeps growing even while the wheels are saturated
        let mut ctrl = controller(&SegwayConfig::default())?;
        let mut previous = 0.0;
        for k in 0..2_000 {
            let out = ctrl.step(&SensorReadings::default(), Command::new(50.0, 0.0))?;
            if k > 0 {
                assert!(out.distance.distance_error_sum < previous);
            }
            previous = out.distance.distance_error_sum;
        }
        assert!(previous < -1.0e4);
        Ok(())
    }

    #[test]
    fn test_nan_reading_is_non_finite_output() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctrl = controller(&SegwayConfig::default())?;
        ctrl.step(&SensorReadings::default(), Command::STATIONARY)?;
        let readings = SensorReadings {
            gyro_rate: f64::NAN,
            ..SensorReadings::default()
        };
        assert_eq!(
            ctrl.step(&readings, Command::STATIONARY),
            Err(RTError::NonFiniteOutput)
        );
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SegwayConfig::default();
        config.geometry.wheel_diameter_cm = 0.0;
        assert!(controller(&config).is_err());
    }

    #[test]
    fn test_battery_scaling_applied() -> Result<(), Box<dyn std::error::Error>> {
        let config = SegwayConfig::default();
        let mut nominal = controller(&config)?;
        let mut low = BalanceController::new(&config, BatteryCompensation::from_measurement(8.0, 6.4)?)?;
        let readings = SensorReadings {
            gyro_rate: 4.0,
            ..SensorReadings::default()
        };
        for ctrl in [&mut nominal, &mut low] {
            ctrl.step(&SensorReadings::default(), Command::STATIONARY)?;
        }
        let a = nominal.step(&readings, Command::STATIONARY)?;
        let b = low.step(&readings, Command::STATIONARY)?;
        assert_relative_eq!(b.duty, a.duty * 1.25, max_relative = 1e-12);
        Ok(())
    }
}
