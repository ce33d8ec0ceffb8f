//! Property-based tests for the loop timer and its metrics.

use proptest::prelude::*;
use quickcheck_macros::quickcheck;
use segway_scheduler::{Clock, LoopTimer, ManualClock, TimingMetrics};
use std::time::Duration;

proptest! {
    #[test]
    fn prop_deadline_is_anchor_plus_k_periods(
        period_us in 100u64..100_000,
        busy_fracs in prop::collection::vec(0u64..100, 1..200),
    ) {
        let period = Duration::from_micros(period_us);
        let clock = ManualClock::new();
        let mut timer = LoopTimer::with_clock(period, clock.clone())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let start = clock.now();

        for (k, frac) in busy_fracs.iter().enumerate() {
            let deadline = timer.loop_start();
            let k = u32::try_from(k + 1).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(deadline, start + period * k);

            clock.advance(period * u32::try_from(*frac).unwrap_or(0) / 100);
            let tick = timer.wait_for_completion();
            prop_assert!(!tick.is_overrun());
        }
    }

    #[test]
    fn prop_overrun_keeps_grid_phase(
        period_us in 1_000u64..50_000,
        overrun_us in 1u64..500_000,
    ) {
        let period = Duration::from_micros(period_us);
        let clock = ManualClock::new();
        let mut timer = LoopTimer::with_clock(period, clock.clone())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let start = clock.now();

        timer.loop_start();
        clock.advance(period + Duration::from_micros(overrun_us));
        let tick = timer.wait_for_completion();
        let skipped = tick.overrun.map_or(0, |o| o.skipped_periods);

        let next = timer.loop_start();
        let offset = next.duration_since(start);
        // Still on the grid, strictly in the future, no more than a period away
        prop_assert_eq!(offset.as_nanos() % period.as_nanos(), 0);
        prop_assert!(next > clock.now());
        prop_assert!(next.duration_since(clock.now()) <= period);
        prop_assert_eq!(u128::from(skipped), u128::from(overrun_us * 1_000) / period.as_nanos());
    }
}

#[quickcheck]
fn qc_max_busy_is_max_of_samples(samples: Vec<u32>) -> bool {
    let mut metrics = TimingMetrics::with_capacity(64);
    for s in &samples {
        metrics.record_tick(u64::from(*s), 0, false, 0);
    }
    let expected = samples.iter().copied().max().map_or(0, u64::from);
    metrics.max_busy_ns == expected && metrics.total_ticks == samples.len() as u64
}

#[quickcheck]
fn qc_percentiles_are_ordered(samples: Vec<u16>) -> bool {
    let mut metrics = TimingMetrics::with_capacity(128);
    for s in &samples {
        metrics.record_tick(u64::from(*s), u64::from(*s), false, 0);
    }
    let p50 = metrics.p50_busy_ns();
    let p99 = metrics.p99_busy_ns();
    p50 <= p99 && p99 <= metrics.max_busy_ns
}

#[quickcheck]
fn qc_overrun_rate_bounded(flags: Vec<bool>) -> bool {
    let mut metrics = TimingMetrics::new();
    for overrun in &flags {
        metrics.record_tick(0, 0, *overrun, 0);
    }
    let rate = metrics.overrun_rate();
    (0.0..=1.0).contains(&rate)
}
