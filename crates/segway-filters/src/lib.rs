//! RT-safe discrete filter primitives for the balancing controller.
//!
//! Three building blocks, each a plain state struct paired with a free
//! function that advances it by one sample:
//!
//! - **High-pass**: single-pole `y[n] = α·(y[n-1] + x[n] - x[n-1])`, seeded
//!   from the first sample so startup produces no impulse
//! - **Integrator**: rectangular rule `y[n] = y[n-1] + x[n]·dt` with
//!   compensated summation
//! - **Differentiator**: windowed finite difference over `N` samples
//!
//! Every filter assumes it is called exactly once per loop period `dt`.
//!
//! # RT Safety
//!
//! - No heap allocations after construction
//! - O(1) time per sample
//! - No syscalls or I/O
//!
//! # Example
//!
//! ```
//! use segway_filters::prelude::*;
//!
//! let dt = 0.02;
//! let mut highpass = HighPassState::from_cutoff_hz(dt, 0.02);
//! let mut integrator = IntegratorState::new(dt);
//!
//! // In the loop:
//! let rate = high_pass_filter(3.0, &mut highpass);
//! let angle = integrate(rate, &mut integrator);
//! assert_eq!(rate, 0.0); // first sample seeds the filter
//! assert_eq!(angle, 0.0);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod differentiator;
pub mod high_pass;
pub mod integrator;
pub mod prelude;
pub mod state;

pub use differentiator::{DifferentiatorState, differentiate};
pub use high_pass::{HighPassState, high_pass_filter};
pub use integrator::{IntegratorState, integrate};
pub use state::FilterState;
