//! Time sources for the loop timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source with the ability to block until an instant.
pub trait Clock {
    /// Current monotonic time.
    fn now(&self) -> Instant;

    /// Block until `deadline`. Returns immediately if it has already passed.
    fn sleep_until(&mut self, deadline: Instant);
}

/// Wall-clock time source.
///
/// Sleeps in the OS for the bulk of the wait, then busy-spins through the
/// final stretch since OS sleeps routinely overshoot by tens of microseconds.
#[derive(Debug, Clone)]
pub struct SystemClock {
    spin_threshold: Duration,
}

impl SystemClock {
    /// Create a clock with the default spin tail.
    pub fn new() -> Self {
        Self::with_spin_threshold(Duration::from_nanos(crate::DEFAULT_SPIN_THRESHOLD_NS))
    }

    /// Create a clock that busy-spins for the last `spin_threshold` of each
    /// wait. Zero disables spinning.
    pub fn with_spin_threshold(spin_threshold: Duration) -> Self {
        Self { spin_threshold }
    }

    /// Busy-spin tail length.
    pub fn spin_threshold(&self) -> Duration {
        self.spin_threshold
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }

        if remaining > self.spin_threshold {
            std::thread::sleep(remaining.saturating_sub(self.spin_threshold));
        }

        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

/// Explicitly driven time source.
///
/// Time only moves when [`advance`](ManualClock::advance) is called or when
/// a sleep jumps it forward to the requested deadline. Clones share the same
/// time, so a test can hold one handle while the timer owns another.
///
/// ```
/// use segway_scheduler::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(clock.now() - start, Duration::from_millis(5));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by_ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let mut current = self.offset_ns.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(by_ns);
            match self.offset_ns.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::Acquire))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.elapsed();
        self.origin.checked_add(offset).unwrap_or(self.origin)
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let target = deadline.saturating_duration_since(self.origin);
        let target_ns = u64::try_from(target.as_nanos()).unwrap_or(u64::MAX);
        self.offset_ns.fetch_max(target_ns, Ordering::AcqRel);
    }
}
