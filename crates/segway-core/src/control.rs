//! Control law and per-wheel duty split.

use crate::angle::AngleEstimate;
use crate::config::GainConfig;
use crate::distance::DistanceState;
use serde::Serialize;

/// Weighted sum of the six feedback terms, scaled for battery voltage.
///
/// ```text
/// duty = scaling · (g_rate·rate + g_angle·angle + g_angle_sum·angle_sum
///                 + g_speed·speed + g_err·distance_error
///                 + g_err_sum·distance_error_sum)
/// ```
#[inline]
pub fn control_law(
    gains: &GainConfig,
    battery_scaling: f64,
    angle: &AngleEstimate,
    distance: &DistanceState,
) -> f64 {
    let feedback = gains.rate * angle.rate
        + gains.angle * angle.angle
        + gains.angle_sum * angle.angle_sum
        + gains.speed * distance.speed
        + gains.distance_error * distance.distance_error
        + gains.distance_error_sum * distance.distance_error_sum;
    battery_scaling * feedback
}

/// Duty commands for the two wheels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelDuty {
    /// Left wheel duty
    pub left: f64,
    /// Right wheel duty
    pub right: f64,
}

impl WheelDuty {
    /// Split a common duty into left/right with a differential turn term,
    /// clamping each wheel to `±limit` when a limit is given.
    pub fn split(duty: f64, turn_rate: f64, limit: Option<f64>) -> Self {
        let left = duty - turn_rate;
        let right = duty + turn_rate;
        match limit {
            Some(limit) => Self {
                left: clamp_symmetric(left, limit),
                right: clamp_symmetric(right, limit),
            },
            None => Self { left, right },
        }
    }

    /// Whether either wheel sits at `±limit`.
    pub fn is_saturated(&self, limit: Option<f64>) -> bool {
        limit.is_some_and(|limit| self.left.abs() >= limit || self.right.abs() >= limit)
    }

    /// Both wheels finite.
    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.right.is_finite()
    }
}

// NaN passes through so the caller can detect it
fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    if value.is_nan() {
        value
    } else {
        value.max(-limit).min(limit)
    }
}
