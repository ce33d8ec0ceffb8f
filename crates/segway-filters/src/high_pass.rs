//! Single-pole High-pass Filter
//!
//! Removes slow bias and drift while passing faster dynamics. The balance
//! controller uses two of these in the tilt path: one on the raw gyro rate
//! and one on the integrated angle.

use std::f64::consts::PI;

/// State for a discrete single-pole high-pass filter.
///
/// Implements `y[n] = α·(y[n-1] + x[n] - x[n-1])` with `α = τ/(τ + dt)`.
///
/// The first sample seeds the previous input, so the first output is exactly
/// zero no matter how far the signal sits from zero at startup.
///
/// # RT Safety
///
/// - `#[repr(C)]` for stable ABI
/// - No heap allocations
/// - O(1) time complexity
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct HighPassState {
    /// Sample period in seconds
    pub dt: f64,
    /// Time constant in seconds
    pub tau: f64,
    /// Smoothing coefficient `τ/(τ + dt)`
    pub alpha: f64,
    /// Previous input sample
    pub prev_input: f64,
    /// Previous output sample
    pub prev_output: f64,
    /// Whether the first sample has been seen
    pub initialized: bool,
}

impl HighPassState {
    /// Create a high-pass filter with time constant `tau` seconds, sampled
    /// every `dt` seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use segway_filters::HighPassState;
    ///
    /// let state = HighPassState::new(0.02, 0.18);
    /// assert!((state.alpha - 0.9).abs() < 1e-12);
    /// ```
    pub fn new(dt: f64, tau: f64) -> Self {
        Self {
            dt,
            tau,
            alpha: tau / (tau + dt),
            prev_input: 0.0,
            prev_output: 0.0,
            initialized: false,
        }
    }

    /// Create a high-pass filter from a -3 dB cutoff frequency in Hz.
    ///
    /// `τ = 1 / (2π·f_c)`.
    pub fn from_cutoff_hz(dt: f64, cutoff_hz: f64) -> Self {
        Self::new(dt, time_constant_for_cutoff(cutoff_hz))
    }

    /// Cutoff frequency in Hz corresponding to this filter's time constant.
    pub fn cutoff_hz(&self) -> f64 {
        1.0 / (2.0 * PI * self.tau)
    }

    /// Most recent output, or zero before the first sample.
    #[inline]
    pub fn output(&self) -> f64 {
        self.prev_output
    }
}

/// Time constant in seconds for a -3 dB cutoff frequency in Hz.
pub fn time_constant_for_cutoff(cutoff_hz: f64) -> f64 {
    1.0 / (2.0 * PI * cutoff_hz)
}

/// High-pass filter one sample.
///
/// # RT Safety
///
/// - No heap allocations
/// - O(1) time complexity
///
/// # Example
///
/// ```
/// use segway_filters::prelude::*;
///
/// let mut state = HighPassState::new(0.02, 0.5);
///
/// // Large constant offset at startup: no impulse
/// assert_eq!(high_pass_filter(250.0, &mut state), 0.0);
/// assert_eq!(high_pass_filter(250.0, &mut state), 0.0);
///
/// // A step passes through, scaled by alpha
/// let y = high_pass_filter(251.0, &mut state);
/// assert!((y - state.alpha).abs() < 1e-12);
/// ```
#[inline]
pub fn high_pass_filter(x: f64, state: &mut HighPassState) -> f64 {
    if !state.initialized {
        state.prev_input = x;
        state.prev_output = 0.0;
        state.initialized = true;
        return 0.0;
    }

    let y = state.alpha * (state.prev_output + x - state.prev_input);
    state.prev_input = x;
    state.prev_output = y;
    y
}
