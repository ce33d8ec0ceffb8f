//! Fixed-period loop timing for the balancing controller.
//!
//! The controller body runs once per period. This crate provides:
//!
//! - **LoopTimer**: absolute-deadline period enforcement. Deadlines sit on a
//!   fixed grid anchored at the first iteration, so per-iteration sleep error
//!   never accumulates into drift.
//! - **TimingMetrics**: overrun counts, skipped periods, wake-up lateness and
//!   busy-time percentiles.
//! - **Clock**: the time source seam. [`SystemClock`] sleeps for real with a
//!   busy-spin tail; [`ManualClock`] is driven explicitly for deterministic
//!   runs.
//!
//! # RT-Safety Guarantees
//!
//! - **No heap allocations** in `loop_start`/`wait_for_completion` after the
//!   metrics ring buffers fill
//! - **Bounded execution time** apart from the intended sleep
//!
//! # Example
//!
//! ```no_run
//! use segway_scheduler::LoopTimer;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), segway_errors::ValidationError> {
//! let mut timer = LoopTimer::new(Duration::from_millis(20))?;
//!
//! loop {
//!     timer.loop_start();
//!     // Read sensors, run the controller, write actuators
//!     let tick = timer.wait_for_completion();
//!     if let Some(overrun) = tick.overrun {
//!         eprintln!("overran by {:?}", overrun.late_by);
//!     }
//! }
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod clock;
pub mod metrics;
pub mod prelude;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use metrics::TimingMetrics;
pub use timer::{LoopTimer, Overrun, TickReport};

/// Default control period of the balancing loop (50 Hz).
pub const DEFAULT_PERIOD_NS: u64 = 20_000_000;

/// Final stretch of a sleep spent busy-spinning instead of in the OS sleep.
pub const DEFAULT_SPIN_THRESHOLD_NS: u64 = 80_000;
