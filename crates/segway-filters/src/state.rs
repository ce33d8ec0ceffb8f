//! Common filter state behaviour.

/// Operations shared by every filter state.
pub trait FilterState: std::fmt::Debug {
    /// Forget all history so the next sample re-seeds the filter.
    fn reset(&mut self);

    /// Sample period the filter was built for, in seconds.
    fn sample_period(&self) -> f64;
}

impl FilterState for crate::HighPassState {
    fn reset(&mut self) {
        self.prev_input = 0.0;
        self.prev_output = 0.0;
        self.initialized = false;
    }

    fn sample_period(&self) -> f64 {
        self.dt
    }
}

impl FilterState for crate::IntegratorState {
    fn reset(&mut self) {
        self.sum = 0.0;
        self.compensation = 0.0;
    }

    fn sample_period(&self) -> f64 {
        self.dt
    }
}

impl FilterState for crate::DifferentiatorState {
    fn reset(&mut self) {
        self.clear_history();
    }

    fn sample_period(&self) -> f64 {
        self.dt()
    }
}
