//! Prelude for the filters crate.
//!
//! ```
//! use segway_filters::prelude::*;
//!
//! let mut state = DifferentiatorState::new(0.02, 15);
//! assert_eq!(differentiate(10.0, &mut state), 0.0);
//! ```

pub use crate::differentiator::{DifferentiatorState, differentiate};
pub use crate::high_pass::{HighPassState, high_pass_filter};
pub use crate::integrator::{IntegratorState, integrate};
pub use crate::state::FilterState;
