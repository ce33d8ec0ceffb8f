//! Absolute-deadline loop timer.
//!
//! Each iteration's deadline is the previous deadline plus one period; only
//! the very first deadline is taken from the clock. Sleep overshoot on one
//! iteration therefore shortens the next one instead of pushing every later
//! iteration back.

use crate::clock::{Clock, SystemClock};
use crate::metrics::TimingMetrics;
use segway_errors::ValidationError;
use std::time::{Duration, Instant};

/// A missed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrun {
    /// How far past the deadline the body finished
    pub late_by: Duration,
    /// Whole periods dropped so the next deadline lies in the future
    pub skipped_periods: u64,
}

/// Outcome of one `wait_for_completion` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Zero-based iteration number
    pub iteration: u64,
    /// Deadline this iteration was measured against
    pub deadline: Instant,
    /// Time between `loop_start` and `wait_for_completion`
    pub busy: Duration,
    /// How late the timer returned relative to the deadline
    pub lateness: Duration,
    /// Present when the body missed its deadline
    pub overrun: Option<Overrun>,
}

impl TickReport {
    /// Whether the body missed its deadline.
    #[inline]
    pub fn is_overrun(&self) -> bool {
        self.overrun.is_some()
    }
}

/// Fixed-period loop timer.
///
/// Call [`loop_start`](LoopTimer::loop_start) at the top of each iteration
/// and [`wait_for_completion`](LoopTimer::wait_for_completion) at the bottom.
/// Single-threaded: the timer has one owner.
///
/// # RT-Safety
///
/// - Both hot-path calls are O(1) apart from the sleep itself
/// - Metrics storage is allocated at construction
#[derive(Debug)]
pub struct LoopTimer<C: Clock = SystemClock> {
    period_ns: u64,
    clock: C,
    anchor: Option<Instant>,
    deadline: Option<Instant>,
    body_start: Option<Instant>,
    iteration: u64,
    metrics: TimingMetrics,
}

impl LoopTimer<SystemClock> {
    /// Create a timer running on the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a zero period.
    pub fn new(period: Duration) -> Result<Self, ValidationError> {
        Self::with_clock(period, SystemClock::new())
    }
}

impl<C: Clock> LoopTimer<C> {
    /// Create a timer on an explicit time source.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a zero period or one longer than
    /// `u64::MAX` nanoseconds.
    pub fn with_clock(period: Duration, clock: C) -> Result<Self, ValidationError> {
        let period_ns = u64::try_from(period.as_nanos())
            .map_err(|err| ValidationError::constraint(format!("loop_period {period:?}: {err}")))?;
        if period_ns == 0 {
            return Err(ValidationError::not_positive("loop_period", 0.0));
        }

        Ok(Self {
            period_ns,
            clock,
            anchor: None,
            deadline: None,
            body_start: None,
            iteration: 0,
            metrics: TimingMetrics::new(),
        })
    }

    /// Create a timer from a period in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `period_s` is not finite or not
    /// greater than zero.
    pub fn from_secs_f64(period_s: f64, clock: C) -> Result<Self, ValidationError> {
        if !period_s.is_finite() {
            return Err(ValidationError::non_finite("loop_period", period_s));
        }
        if period_s <= 0.0 {
            return Err(ValidationError::not_positive("loop_period", period_s));
        }
        let period = Duration::try_from_secs_f64(period_s)
            .map_err(|err| ValidationError::constraint(format!("loop_period {period_s}: {err}")))?;
        Self::with_clock(period, clock)
    }

    /// Mark the top of an iteration and return its deadline.
    ///
    /// The first call anchors the grid at `now + period`; every later call
    /// advances the previous deadline by one period.
    pub fn loop_start(&mut self) -> Instant {
        let now = self.clock.now();
        let period = self.period();
        let deadline = match self.deadline {
            Some(previous) => advance(previous, period),
            None => {
                self.anchor = Some(now);
                advance(now, period)
            }
        };

        self.deadline = Some(deadline);
        self.body_start = Some(now);
        deadline
    }

    /// Block until the current deadline.
    ///
    /// If the deadline has already passed, returns immediately with the
    /// overrun recorded. Whole missed periods are skipped so the next
    /// deadline lies in the future and stays on the original grid.
    ///
    /// Calling this without a preceding `loop_start` starts an iteration
    /// implicitly.
    pub fn wait_for_completion(&mut self) -> TickReport {
        let (deadline, body_start) = match (self.deadline, self.body_start) {
            (Some(deadline), Some(body_start)) => (deadline, body_start),
            _ => {
                let deadline = self.loop_start();
                (deadline, self.clock.now())
            }
        };

        let finished = self.clock.now();
        let busy = finished.saturating_duration_since(body_start);

        let (lateness, overrun) = if finished > deadline {
            let late_by = finished.saturating_duration_since(deadline);
            let late_ns = u64::try_from(late_by.as_nanos()).unwrap_or(u64::MAX);
            let skipped_periods = late_ns / self.period_ns;
            let skip = Duration::from_nanos(self.period_ns.saturating_mul(skipped_periods));
            self.deadline = Some(advance(deadline, skip));
            (
                late_by,
                Some(Overrun {
                    late_by,
                    skipped_periods,
                }),
            )
        } else {
            self.clock.sleep_until(deadline);
            let woke = self.clock.now();
            (woke.saturating_duration_since(deadline), None)
        };

        self.metrics.record_tick(
            saturating_ns(busy),
            saturating_ns(lateness),
            overrun.is_some(),
            overrun.map_or(0, |o| o.skipped_periods),
        );

        let report = TickReport {
            iteration: self.iteration,
            deadline,
            busy,
            lateness,
            overrun,
        };
        self.iteration = self.iteration.saturating_add(1);
        self.body_start = None;
        report
    }

    /// Time spent in the current iteration so far.
    pub fn elapsed(&self) -> Duration {
        self.body_start.map_or(Duration::ZERO, |start| {
            self.clock.now().saturating_duration_since(start)
        })
    }

    /// Time left before the current deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.map_or(Duration::ZERO, |deadline| {
            deadline.saturating_duration_since(self.clock.now())
        })
    }

    /// Loop period.
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_nanos(self.period_ns)
    }

    /// Current deadline, if an iteration has started.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time of the first `loop_start`.
    #[inline]
    pub fn anchor(&self) -> Option<Instant> {
        self.anchor
    }

    /// Completed iterations.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Timing metrics.
    #[inline]
    pub fn metrics(&self) -> &TimingMetrics {
        &self.metrics
    }

    /// Mutable timing metrics for percentile queries.
    #[inline]
    pub fn metrics_mut(&mut self) -> &mut TimingMetrics {
        &mut self.metrics
    }

    /// Time source.
    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Forget the deadline grid and all metrics. The next `loop_start`
    /// re-anchors.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.deadline = None;
        self.body_start = None;
        self.iteration = 0;
        self.metrics.reset();
    }
}

fn advance(instant: Instant, by: Duration) -> Instant {
    instant.checked_add(by).unwrap_or(instant)
}

fn saturating_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
