//! Fixed-period balance loop driver
//!
//! Owns the loop timer, the controller, the hardware ports and the command
//! source, and runs one controller step per period:
//!
//! 1. mark the iteration start
//! 2. fetch the motion command
//! 3. read the gyro and both wheel positions
//! 4. step the controller
//! 5. write left then right duty
//! 6. wait out the rest of the period
//!
//! Any hardware failure ends the loop. Before returning the error the
//! driver tries once to zero both motors so the robot is not left driving.
//! Overruns are logged and counted but do not stop the loop.

use crate::battery::BatteryCompensation;
use crate::config::SegwayConfig;
use crate::controller::{BalanceController, ControlOutput, SensorReadings};
use crate::ports::{Battery, Command, CommandSource, Gyro, Motor};
use segway_errors::{DeviceError, RTError, SegwayError};
use segway_scheduler::{Clock, LoopTimer, SystemClock, TickReport};
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, error, info, info_span, trace, warn};

const GYRO_DEVICE: &str = "gyro";
const LEFT_MOTOR_DEVICE: &str = "left_motor";
const RIGHT_MOTOR_DEVICE: &str = "right_motor";

/// The three devices read and written every iteration.
#[derive(Debug)]
pub struct Hardware<G, M> {
    /// Rate gyro
    pub gyro: G,
    /// Left wheel motor
    pub left: M,
    /// Right wheel motor
    pub right: M,
}

/// What happened in one iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationReport {
    /// Command used
    pub command: Command,
    /// Sensor values read
    pub readings: SensorReadings,
    /// Controller output written to the motors
    pub output: ControlOutput,
    /// Timing of the iteration
    pub tick: TickReport,
}

/// Aggregate of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Iterations completed
    pub iterations: u64,
    /// Iterations that missed their deadline
    pub overruns: u64,
    /// Periods dropped to realign after overruns
    pub skipped_periods: u64,
    /// Median body execution time in nanoseconds
    pub p50_busy_ns: u64,
    /// p99 body execution time in nanoseconds
    pub p99_busy_ns: u64,
    /// Worst wake-up lateness in nanoseconds
    pub max_lateness_ns: u64,
    /// Battery voltage measured at startup
    pub battery_voltage: f64,
    /// Battery compensation scalar
    pub battery_scaling: f64,
    /// Output of the last completed iteration
    pub last_output: Option<ControlOutput>,
}

/// Balance loop over a set of hardware ports.
#[derive(Debug)]
pub struct BalanceLoop<G, M, S, C = SystemClock>
where
    G: Gyro,
    M: Motor,
    S: CommandSource,
    C: Clock,
{
    controller: BalanceController,
    timer: LoopTimer<C>,
    hardware: Hardware<G, M>,
    commands: S,
    last_output: Option<ControlOutput>,
}

impl<G, M, S> BalanceLoop<G, M, S, SystemClock>
where
    G: Gyro,
    M: Motor,
    S: CommandSource,
{
    /// Build a loop paced by the wall clock.
    ///
    /// The battery is read exactly once, here.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a failed or implausible battery reading.
    pub fn new<B: Battery>(
        config: &SegwayConfig,
        hardware: Hardware<G, M>,
        battery: &mut B,
        commands: S,
    ) -> Result<Self, SegwayError> {
        Self::with_clock(config, hardware, battery, commands, SystemClock::new())
    }
}

impl<G, M, S, C> BalanceLoop<G, M, S, C>
where
    G: Gyro,
    M: Motor,
    S: CommandSource,
    C: Clock,
{
    /// Build a loop paced by an explicit clock.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a failed or implausible battery reading.
    pub fn with_clock<B: Battery>(
        config: &SegwayConfig,
        hardware: Hardware<G, M>,
        battery: &mut B,
        commands: S,
        clock: C,
    ) -> Result<Self, SegwayError> {
        config.validate()?;

        let compensation = battery
            .voltage()
            .and_then(|v| BatteryCompensation::from_measurement(config.battery.nominal_voltage, v))
            .map_err(|err| SegwayError::hardware(RTError::BatteryFault, err))?;

        let controller = BalanceController::new(config, compensation)?;
        let timer = LoopTimer::with_clock(config.loop_period()?, clock)?;

        info!(
            battery_voltage = compensation.measured_voltage(),
            battery_scaling = compensation.scaling(),
            period_ms = config.timing.loop_period_s * 1_000.0,
            "balance loop ready"
        );
        debug!(
            gains = ?config.gains,
            filters = ?config.filters,
            duty_limit = ?config.actuation.duty_limit,
            "controller configuration"
        );

        Ok(Self {
            controller,
            timer,
            hardware,
            commands,
            last_output: None,
        })
    }

    /// Run a single iteration, including the end-of-period wait.
    ///
    /// # Errors
    ///
    /// Any device failure, non-finite reading or non-finite output. Both
    /// motors have been sent a best-effort zero duty by the time this
    /// returns an error.
    pub fn run_iteration(&mut self) -> Result<IterationReport, SegwayError> {
        self.timer.loop_start();

        match self.control_step() {
            Ok((command, readings, output)) => {
                let tick = self.timer.wait_for_completion();
                if let Some(overrun) = tick.overrun {
                    warn!(
                        code = RTError::DeadlineMissed.code(),
                        iteration = tick.iteration,
                        late_by_us = overrun.late_by.as_micros(),
                        skipped_periods = overrun.skipped_periods,
                        "control loop overran its period"
                    );
                }
                trace!(
                    iteration = tick.iteration,
                    duty = output.duty,
                    left = output.wheels.left,
                    right = output.wheels.right,
                    angle = output.angle.angle,
                    distance_error = output.distance.distance_error,
                    "iteration complete"
                );
                self.last_output = Some(output);
                Ok(IterationReport {
                    command,
                    readings,
                    output,
                    tick,
                })
            }
            Err(err) => {
                error!(
                    iteration = self.timer.iteration(),
                    error = %err,
                    severity = %err.severity(),
                    "balance loop fault, stopping motors"
                );
                self.stop_motors();
                Err(err)
            }
        }
    }

    /// Run `n` iterations.
    ///
    /// # Errors
    ///
    /// The first fault; iterations after it are not run.
    pub fn run_iterations(&mut self, n: u64) -> Result<RunSummary, SegwayError> {
        let span = info_span!("balance_loop", iterations = n);
        let _guard = span.enter();

        for _ in 0..n {
            self.run_iteration()?;
        }
        Ok(self.summary())
    }

    /// Run until a fault occurs.
    ///
    /// # Errors
    ///
    /// Always eventually: the fault that ended the loop.
    pub fn run(&mut self) -> Result<Infallible, SegwayError> {
        let span = info_span!("balance_loop");
        let _guard = span.enter();
        info!("balance loop running");

        loop {
            self.run_iteration()?;
        }
    }

    /// Timing and output summary so far.
    pub fn summary(&mut self) -> RunSummary {
        let iterations = self.timer.iteration();
        let battery = *self.controller.battery();
        let metrics = self.timer.metrics_mut();
        RunSummary {
            iterations,
            overruns: metrics.overruns,
            skipped_periods: metrics.skipped_periods,
            p50_busy_ns: metrics.p50_busy_ns(),
            p99_busy_ns: metrics.p99_busy_ns(),
            max_lateness_ns: metrics.max_lateness_ns,
            battery_voltage: battery.measured_voltage(),
            battery_scaling: battery.scaling(),
            last_output: self.last_output,
        }
    }

    /// Controller state.
    pub fn controller(&self) -> &BalanceController {
        &self.controller
    }

    /// Loop timer.
    pub fn timer(&self) -> &LoopTimer<C> {
        &self.timer
    }

    /// Output of the last completed iteration.
    pub fn last_output(&self) -> Option<&ControlOutput> {
        self.last_output.as_ref()
    }

    /// Release the hardware and command source.
    pub fn into_parts(self) -> (Hardware<G, M>, S) {
        (self.hardware, self.commands)
    }

    fn control_step(&mut self) -> Result<(Command, SensorReadings, ControlOutput), SegwayError> {
        let command = self.commands.next_command();
        let readings = self.read_sensors()?;
        let output = self.controller.step(&readings, command)?;

        self.hardware
            .left
            .set_duty(output.wheels.left)
            .map_err(|err| SegwayError::hardware(RTError::MotorFault, err))?;
        self.hardware
            .right
            .set_duty(output.wheels.right)
            .map_err(|err| SegwayError::hardware(RTError::MotorFault, err))?;

        Ok((command, readings, output))
    }

    fn read_sensors(&mut self) -> Result<SensorReadings, SegwayError> {
        let gyro_rate = self
            .hardware
            .gyro
            .read_rate()
            .and_then(|v| DeviceError::check_finite(GYRO_DEVICE, v))
            .map_err(|err| SegwayError::hardware(RTError::GyroFault, err))?;
        let left_position_deg = self
            .hardware
            .left
            .position_deg()
            .and_then(|v| DeviceError::check_finite(LEFT_MOTOR_DEVICE, v))
            .map_err(|err| SegwayError::hardware(RTError::MotorFault, err))?;
        let right_position_deg = self
            .hardware
            .right
            .position_deg()
            .and_then(|v| DeviceError::check_finite(RIGHT_MOTOR_DEVICE, v))
            .map_err(|err| SegwayError::hardware(RTError::MotorFault, err))?;

        Ok(SensorReadings {
            gyro_rate,
            left_position_deg,
            right_position_deg,
        })
    }

    fn stop_motors(&mut self) {
        for (name, motor) in [
            (LEFT_MOTOR_DEVICE, &mut self.hardware.left),
            (RIGHT_MOTOR_DEVICE, &mut self.hardware.right),
        ] {
            if let Err(err) = motor.set_duty(0.0) {
                warn!(motor = name, error = %err, "could not zero motor after fault");
            }
        }
    }
}
