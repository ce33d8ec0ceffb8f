//! Prelude module for common scheduler types.

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::metrics::TimingMetrics;
pub use crate::timer::{LoopTimer, Overrun, TickReport};
pub use crate::{DEFAULT_PERIOD_NS, DEFAULT_SPIN_THRESHOLD_NS};
