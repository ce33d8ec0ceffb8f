//! Wheel translation and position tracking.
//!
//! ```text
//! distance           = (avg(left, right) - origin) · distance_per_degree
//! speed              = d/dt distance          (windowed differentiator)
//! reference_distance = ∫ reference_speed
//! distance_error     = distance - reference_distance
//! distance_error_sum = ∫ distance_error
//! ```
//!
//! The origin is the average wheel position seen on the first update, so
//! encoders that were not zeroed before startup do not show up as an
//! initial position error.

use segway_filters::prelude::*;
use serde::Serialize;

/// Translation estimates for one iteration. Distances in centimetres,
/// speeds in centimetres per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistanceState {
    /// Distance travelled since the first update
    pub distance: f64,
    /// Smoothed wheel speed
    pub speed: f64,
    /// Integrated reference speed
    pub reference_distance: f64,
    /// `distance - reference_distance`
    pub distance_error: f64,
    /// Integrated position error
    pub distance_error_sum: f64,
}

/// Motor-position pipeline.
#[derive(Debug, Clone)]
pub struct DistanceTracker {
    distance_per_degree: f64,
    origin_deg: Option<f64>,
    speed: DifferentiatorState,
    reference: IntegratorState,
    error_sum: IntegratorState,
}

impl DistanceTracker {
    /// Build the tracker for sample period `dt`.
    pub fn new(dt: f64, differentiator_window: usize, distance_per_degree: f64) -> Self {
        Self {
            distance_per_degree,
            origin_deg: None,
            speed: DifferentiatorState::new(dt, differentiator_window),
            reference: IntegratorState::new(dt),
            error_sum: IntegratorState::new(dt),
        }
    }

    /// Advance by one pair of wheel positions (degrees) and one reference
    /// speed sample.
    pub fn update(&mut self, left_deg: f64, right_deg: f64, reference_speed: f64) -> DistanceState {
        let average_deg = (left_deg + right_deg) / 2.0;
        let origin = *self.origin_deg.get_or_insert(average_deg);

        let distance = (average_deg - origin) * self.distance_per_degree;
        let speed = differentiate(distance, &mut self.speed);

        let reference_distance = integrate(reference_speed, &mut self.reference);
        let distance_error = distance - reference_distance;
        let distance_error_sum = integrate(distance_error, &mut self.error_sum);

        DistanceState {
            distance,
            speed,
            reference_distance,
            distance_error,
            distance_error_sum,
        }
    }

    /// Wheel position treated as zero distance, once known.
    pub fn origin_deg(&self) -> Option<f64> {
        self.origin_deg
    }

    /// Centimetres travelled per degree of wheel rotation.
    pub fn distance_per_degree(&self) -> f64 {
        self.distance_per_degree
    }

    /// Forget all history including the origin.
    pub fn reset(&mut self) {
        self.origin_deg = None;
        self.speed.reset();
        self.reference.reset();
        self.error_sum.reset();
    }
}
