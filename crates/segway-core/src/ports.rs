//! Port traits for the hardware and the command source
//!
//! The balance loop only talks to the outside world through these traits.
//! Real drivers live outside this crate; [`crate::virtual_rig`] provides
//! in-process implementations for tests and demos.
//!
//! Every read is expected once per iteration and every call must return
//! promptly: no retries, no internal waiting. A failure is reported, never
//! papered over with a default value.

use segway_errors::DeviceError;

/// Rate gyroscope measuring body tilt rate.
pub trait Gyro {
    /// Current angular rate in degrees per second.
    fn read_rate(&mut self) -> Result<f64, DeviceError>;
}

/// Wheel motor in duty-cycle mode with a shaft encoder.
pub trait Motor {
    /// Cumulative shaft rotation in degrees since the driver was opened.
    fn position_deg(&mut self) -> Result<f64, DeviceError>;

    /// Command a signed duty cycle.
    fn set_duty(&mut self, duty: f64) -> Result<(), DeviceError>;
}

/// Supply voltage monitor.
pub trait Battery {
    /// Present supply voltage in volts.
    fn voltage(&mut self) -> Result<f64, DeviceError>;
}

/// High-level motion command for one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Command {
    /// Desired forward speed in centimetres per second
    pub reference_speed: f64,
    /// Differential duty added to the right wheel and taken from the left
    pub turn_rate: f64,
}

impl Command {
    /// Balance in place.
    pub const STATIONARY: Self = Self {
        reference_speed: 0.0,
        turn_rate: 0.0,
    };

    /// Build a command.
    pub fn new(reference_speed: f64, turn_rate: f64) -> Self {
        Self {
            reference_speed,
            turn_rate,
        }
    }
}

/// Supplier of per-iteration motion commands (remote control, autonomous
/// behaviour, scripted test input).
pub trait CommandSource {
    /// Command for the upcoming iteration.
    fn next_command(&mut self) -> Command;
}

/// Always commands balancing in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stationary;

impl CommandSource for Stationary {
    fn next_command(&mut self) -> Command {
        Command::STATIONARY
    }
}

/// Repeats one fixed command forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantCommand(pub Command);

impl CommandSource for ConstantCommand {
    fn next_command(&mut self) -> Command {
        self.0
    }
}

/// Adapts a closure into a [`CommandSource`].
///
/// ```
/// use segway_core::ports::{Command, CommandSource, FnCommandSource};
///
/// let mut tick = 0u32;
/// let mut source = FnCommandSource::new(move || {
///     tick += 1;
///     Command::new(if tick > 50 { 10.0 } else { 0.0 }, 0.0)
/// });
/// assert_eq!(source.next_command(), Command::STATIONARY);
/// ```
pub struct FnCommandSource<F> {
    f: F,
}

impl<F: FnMut() -> Command> FnCommandSource<F> {
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut() -> Command> CommandSource for FnCommandSource<F> {
    fn next_command(&mut self) -> Command {
        (self.f)()
    }
}

impl<F> std::fmt::Debug for FnCommandSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCommandSource").finish_non_exhaustive()
    }
}

impl<T: CommandSource + ?Sized> CommandSource for &mut T {
    fn next_command(&mut self) -> Command {
        (**self).next_command()
    }
}

impl<T: CommandSource + ?Sized> CommandSource for Box<T> {
    fn next_command(&mut self) -> Command {
        (**self).next_command()
    }
}
