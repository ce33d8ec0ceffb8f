//! Tilt estimation from a single rate gyro.
//!
//! A gyro rate carries a slowly wandering bias. Integrating it directly
//! would walk the angle estimate away without bound, so the cascade is
//! high-pass → integrate → high-pass:
//!
//! ```text
//! rate      = HP1(raw_rate)
//! angle     = HP2(∫ rate)
//! angle_sum = ∫ angle
//! ```
//!
//! The resulting angle is relative to whatever average tilt the body holds,
//! which is exactly the reference a balancing controller wants.

use segway_filters::prelude::*;
use serde::Serialize;

/// Tilt estimates for one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AngleEstimate {
    /// Bias-removed tilt rate, degrees per second
    pub rate: f64,
    /// Tilt angle, degrees
    pub angle: f64,
    /// Integrated tilt angle, degree-seconds
    pub angle_sum: f64,
}

/// Gyro-only tilt estimator.
#[derive(Debug, Clone)]
pub struct AngleEstimator {
    rate_highpass: HighPassState,
    rate_integrator: IntegratorState,
    angle_highpass: HighPassState,
    angle_integrator: IntegratorState,
}

impl AngleEstimator {
    /// Build the cascade for sample period `dt` and the two high-pass time
    /// constants.
    pub fn new(dt: f64, rate_tau: f64, angle_tau: f64) -> Self {
        Self {
            rate_highpass: HighPassState::new(dt, rate_tau),
            rate_integrator: IntegratorState::new(dt),
            angle_highpass: HighPassState::new(dt, angle_tau),
            angle_integrator: IntegratorState::new(dt),
        }
    }

    /// Advance by one gyro sample.
    pub fn update(&mut self, raw_rate: f64) -> AngleEstimate {
        let rate = high_pass_filter(raw_rate, &mut self.rate_highpass);
        let integrated = integrate(rate, &mut self.rate_integrator);
        let angle = high_pass_filter(integrated, &mut self.angle_highpass);
        let angle_sum = integrate(angle, &mut self.angle_integrator);

        AngleEstimate {
            rate,
            angle,
            angle_sum,
        }
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.rate_highpass.reset();
        self.rate_integrator.reset();
        self.angle_highpass.reset();
        self.angle_integrator.reset();
    }
}
