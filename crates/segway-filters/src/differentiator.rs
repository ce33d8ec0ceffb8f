//! Windowed Differentiator
//!
//! Estimates `dx/dt` from a quantized position signal. A one-sample
//! difference of encoder counts is dominated by quantization noise, so the
//! difference is taken across a window of `N` samples:
//! `y[n] = (x[n] - x[n-N]) / (N·dt)`. The cost is `N·dt/2` seconds of lag.

/// State for a windowed finite-difference differentiator.
///
/// The history ring is allocated once at construction and seeded with the
/// first sample, so the first output is zero and the estimate ramps up over
/// the first `N` samples.
///
/// # RT Safety
///
/// - Single allocation at construction, none per sample
/// - O(1) time complexity
#[derive(Clone, Debug)]
pub struct DifferentiatorState {
    dt: f64,
    history: Box<[f64]>,
    head: usize,
    samples_seen: usize,
}

impl DifferentiatorState {
    /// Create a differentiator over `window` samples of period `dt`.
    ///
    /// A window of zero is treated as one.
    ///
    /// ```
    /// use segway_filters::DifferentiatorState;
    ///
    /// let state = DifferentiatorState::new(0.02, 15);
    /// assert_eq!(state.window(), 15);
    /// assert!(!state.is_settled());
    /// ```
    pub fn new(dt: f64, window: usize) -> Self {
        let window = window.max(1);
        Self {
            dt,
            history: vec![0.0; window].into_boxed_slice(),
            head: 0,
            samples_seen: 0,
        }
    }

    /// Number of samples the difference spans.
    #[inline]
    pub fn window(&self) -> usize {
        self.history.len()
    }

    /// Sample period in seconds.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// True once the window holds only real samples rather than the seed.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.samples_seen > self.window()
    }

    /// Group delay in seconds introduced by the window.
    pub fn lag_s(&self) -> f64 {
        self.window() as f64 * self.dt / 2.0
    }

    pub(crate) fn clear_history(&mut self) {
        self.history.fill(0.0);
        self.head = 0;
        self.samples_seen = 0;
    }
}

/// Differentiate one sample and return the rate estimate.
///
/// # Example
///
/// ```
/// use segway_filters::prelude::*;
///
/// let dt = 0.02;
/// let mut state = DifferentiatorState::new(dt, 4);
/// let mut y = 0.0;
/// for n in 0..10 {
///     y = differentiate(3.0 * n as f64 * dt, &mut state);
/// }
/// assert!((y - 3.0).abs() < 1e-9);
/// ```
#[inline]
pub fn differentiate(x: f64, state: &mut DifferentiatorState) -> f64 {
    if state.samples_seen == 0 {
        state.history.fill(x);
        state.samples_seen = 1;
        return 0.0;
    }

    let window = state.window();
    let oldest = match state.history.get_mut(state.head) {
        Some(slot) => std::mem::replace(slot, x),
        None => x,
    };
    state.head = (state.head + 1) % window;
    state.samples_seen = state.samples_seen.saturating_add(1);

    (x - oldest) / (window as f64 * state.dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_output_is_zero() {
        let mut state = DifferentiatorState::new(0.02, 15);
        assert_eq!(differentiate(123_456.0, &mut state), 0.0);
    }

    #[test]
    fn test_ramp_converges_to_slope_after_window() {
        let dt = 0.02;
        let window = 15;
        let slope = -4.25;
        let mut state = DifferentiatorState::new(dt, window);

        for n in 0..=100usize {
            let y = differentiate(slope * n as f64 * dt, &mut state);
            if n >= window {
                assert_relative_eq!(y, slope, max_relative = 1e-9);
            }
        }
        assert!(state.is_settled());
    }

    #[test]
    fn test_ramp_transient_is_linear_in_samples() {
        // While the seed is still in the window, output is slope * n / N
        let dt = 0.1;
        let window = 5;
        let mut state = DifferentiatorState::new(dt, window);
        differentiate(0.0, &mut state);
        for n in 1..window {
            let y = differentiate(2.0 * n as f64 * dt, &mut state);
            assert_relative_eq!(y, 2.0 * n as f64 / window as f64, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_constant_input_gives_zero() {
        let mut state = DifferentiatorState::new(0.02, 15);
        for _ in 0..100 {
            assert_eq!(differentiate(-17.5, &mut state), 0.0);
        }
    }

    #[test]
    fn test_large_offset_keeps_precision() {
        let dt = 0.02;
        let mut state = DifferentiatorState::new(dt, 15);
        let base = 1.0e12;
        let mut y = 0.0;
        for n in 0..200 {
            y = differentiate(base + 360.0 * n as f64 * dt, &mut state);
        }
        assert_relative_eq!(y, 360.0, max_relative = 1e-4);
    }

    #[test]
    fn test_zero_window_treated_as_one() {
        let mut state = DifferentiatorState::new(0.5, 0);
        assert_eq!(state.window(), 1);
        differentiate(1.0, &mut state);
        assert_relative_eq!(differentiate(2.0, &mut state), 2.0);
    }

    #[test]
    fn test_lag() {
        let state = DifferentiatorState::new(0.02, 15);
        assert_relative_eq!(state.lag_s(), 0.15);
    }
}
