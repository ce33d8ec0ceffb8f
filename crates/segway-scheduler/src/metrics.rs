//! Timing metrics collection for the control loop.
//!
//! Two quantities are tracked per iteration: how late the loop woke up
//! relative to its deadline, and how long the body ran between
//! `loop_start` and `wait_for_completion`.

use std::vec::Vec;

const DEFAULT_MAX_SAMPLES: usize = 4_096;

/// Bounded ring of recent samples with reusable percentile scratch space.
#[derive(Debug, Clone)]
struct SampleWindow {
    samples: Vec<u64>,
    max_samples: usize,
    next_index: usize,
    scratch: Vec<u64>,
}

impl SampleWindow {
    fn with_capacity(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
            next_index: 0,
            scratch: Vec::with_capacity(max_samples),
        }
    }

    fn push(&mut self, value: u64) {
        if self.max_samples == 0 {
            return;
        }

        if self.samples.len() < self.max_samples {
            self.samples.push(value);
            return;
        }

        if let Some(slot) = self.samples.get_mut(self.next_index) {
            *slot = value;
        }
        self.next_index = (self.next_index + 1) % self.max_samples;
    }

    fn percentile(&mut self, percentile: f64) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }

        let percentile = percentile.clamp(0.0, 1.0);
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.samples);

        let len = self.scratch.len();
        let index = ((len as f64 * percentile) as usize).min(len.saturating_sub(1));
        let (_, value, _) = self.scratch.select_nth_unstable(index);
        *value
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.scratch.clear();
        self.next_index = 0;
    }
}

/// Control loop timing statistics.
///
/// # RT-Safety
///
/// - `record_tick` is O(1) and allocation-free once the rings are full
/// - Percentile queries reuse scratch storage
#[derive(Debug, Clone)]
pub struct TimingMetrics {
    /// Iterations recorded
    pub total_ticks: u64,

    /// Iterations whose body finished after the deadline
    pub overruns: u64,

    /// Whole periods dropped to realign with the deadline grid
    pub skipped_periods: u64,

    /// Worst wake-up lateness in nanoseconds
    pub max_lateness_ns: u64,

    /// Longest body execution in nanoseconds
    pub max_busy_ns: u64,

    /// Most recent body execution in nanoseconds
    pub last_busy_ns: u64,

    lateness: SampleWindow,
    busy: SampleWindow,
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SAMPLES)
    }
}

impl TimingMetrics {
    /// Create a collector with default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector retaining `max_samples` recent samples of each
    /// quantity for percentile queries.
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            total_ticks: 0,
            overruns: 0,
            skipped_periods: 0,
            max_lateness_ns: 0,
            max_busy_ns: 0,
            last_busy_ns: 0,
            lateness: SampleWindow::with_capacity(max_samples),
            busy: SampleWindow::with_capacity(max_samples),
        }
    }

    /// Record one iteration.
    ///
    /// * `busy_ns` - body execution time
    /// * `lateness_ns` - how far past the deadline the loop resumed; for an
    ///   overrun this is the overrun amount
    /// * `overrun` - whether the body missed its deadline
    /// * `skipped_periods` - whole periods dropped after the overrun
    pub fn record_tick(
        &mut self,
        busy_ns: u64,
        lateness_ns: u64,
        overrun: bool,
        skipped_periods: u64,
    ) {
        self.total_ticks = self.total_ticks.saturating_add(1);
        if overrun {
            self.overruns = self.overruns.saturating_add(1);
        }
        self.skipped_periods = self.skipped_periods.saturating_add(skipped_periods);

        self.max_lateness_ns = self.max_lateness_ns.max(lateness_ns);
        self.max_busy_ns = self.max_busy_ns.max(busy_ns);
        self.last_busy_ns = busy_ns;

        self.lateness.push(lateness_ns);
        self.busy.push(busy_ns);
    }

    /// Lateness at `percentile` (0.0 to 1.0) in nanoseconds.
    pub fn percentile_lateness_ns(&mut self, percentile: f64) -> u64 {
        self.lateness.percentile(percentile)
    }

    /// p99 wake-up lateness in nanoseconds.
    pub fn p99_lateness_ns(&mut self) -> u64 {
        self.percentile_lateness_ns(0.99)
    }

    /// Busy time at `percentile` (0.0 to 1.0) in nanoseconds.
    pub fn percentile_busy_ns(&mut self, percentile: f64) -> u64 {
        self.busy.percentile(percentile)
    }

    /// Median body execution time in nanoseconds.
    pub fn p50_busy_ns(&mut self) -> u64 {
        self.percentile_busy_ns(0.50)
    }

    /// p99 body execution time in nanoseconds.
    pub fn p99_busy_ns(&mut self) -> u64 {
        self.percentile_busy_ns(0.99)
    }

    /// Fraction of iterations that overran (0.0 to 1.0).
    pub fn overrun_rate(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.overruns as f64 / self.total_ticks as f64
        }
    }

    /// Check p99 lateness and overrun rate against limits.
    pub fn meets_requirements(&mut self, max_p99_lateness_ns: u64, max_overrun_rate: f64) -> bool {
        self.p99_lateness_ns() <= max_p99_lateness_ns && self.overrun_rate() <= max_overrun_rate
    }

    /// Number of samples currently retained per quantity.
    pub fn sample_count(&self) -> usize {
        self.busy.len()
    }

    /// Reset all metrics.
    pub fn reset(&mut self) {
        self.total_ticks = 0;
        self.overruns = 0;
        self.skipped_periods = 0;
        self.max_lateness_ns = 0;
        self.max_busy_ns = 0;
        self.last_busy_ns = 0;
        self.lateness.clear();
        self.busy.clear();
    }
}
