//! Rectangular-rule Integrator
//!
//! Accumulates `y[n] = y[n-1] + x[n]·dt`. Used both for bounded signals
//! (tilt angle) and for signals that grow without bound over a long run
//! (reference distance, position error sum), so the running sum is kept
//! with Neumaier compensation: small increments landing on a large total
//! are not rounded away.

/// State for a forward-Euler integrator.
///
/// # RT Safety
///
/// - `#[repr(C)]` for stable ABI
/// - No heap allocations
/// - O(1) time complexity
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct IntegratorState {
    /// Sample period in seconds
    pub dt: f64,
    /// Running sum
    pub sum: f64,
    /// Accumulated rounding error not yet folded into `sum`
    pub compensation: f64,
}

impl IntegratorState {
    /// Create an integrator starting at zero.
    ///
    /// ```
    /// use segway_filters::IntegratorState;
    ///
    /// let state = IntegratorState::new(0.02);
    /// assert_eq!(state.output(), 0.0);
    /// ```
    pub fn new(dt: f64) -> Self {
        Self::with_initial(dt, 0.0)
    }

    /// Create an integrator starting at `initial`.
    pub fn with_initial(dt: f64, initial: f64) -> Self {
        Self {
            dt,
            sum: initial,
            compensation: 0.0,
        }
    }

    /// Current integral value.
    #[inline]
    pub fn output(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Integrate one sample and return the updated integral.
///
/// # Example
///
/// ```
/// use segway_filters::prelude::*;
///
/// let mut state = IntegratorState::new(0.5);
/// assert_eq!(integrate(2.0, &mut state), 1.0);
/// assert_eq!(integrate(2.0, &mut state), 2.0);
/// ```
#[inline]
pub fn integrate(x: f64, state: &mut IntegratorState) -> f64 {
    let term = x * state.dt;
    let total = state.sum + term;
    if state.sum.abs() >= term.abs() {
        state.compensation += (state.sum - total) + term;
    } else {
        state.compensation += (term - total) + state.sum;
    }
    state.sum = total;
    state.output()
}
