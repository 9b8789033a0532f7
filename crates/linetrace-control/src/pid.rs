//! Discrete PID controller.
//!
//! The integral accumulates the raw error once per call and the derivative is
//! the raw difference between consecutive errors, so `ki` and `kd` already
//! absorb the tick length. Retune them if the simulation step changes.
//! The integral is not clamped.

use tracing::trace;

use crate::error::{ControlError, Result};

/// PID controller with clamped output.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    /// Error seen on the previous call.
    last_error: f64,
    /// Sum of all errors since construction or the last reset.
    integral_error: f64,
    output_min: f64,
    output_max: f64,
}

impl PidController {
    /// Create a controller with output limits `[0, 1]`.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        PidController {
            kp,
            ki,
            kd,
            last_error: 0.0,
            integral_error: 0.0,
            output_min: 0.0,
            output_max: 1.0,
        }
    }

    /// Replace the output limits.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidLimits` if `min > max` or either bound is NaN.
    pub fn with_limits(mut self, min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ControlError::InvalidLimits { min, max });
        }
        self.output_min = min;
        self.output_max = max;
        Ok(self)
    }

    /// Retune the gains. Accumulated state is kept.
    pub fn set(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Forget the accumulated integral and the previous error.
    pub fn reset(&mut self) {
        self.last_error = 0.0;
        self.integral_error = 0.0;
    }

    /// Feed one error sample and get the clamped correction.
    pub fn compute(&mut self, error: f64) -> f64 {
        self.integral_error += error;
        let derivative = error - self.last_error;
        let raw = self.kp * error + self.ki * self.integral_error + self.kd * derivative;
        self.last_error = error;

        let output = raw.clamp(self.output_min, self.output_max);
        trace!(error, derivative, integral = self.integral_error, raw, output, "PID step");
        output
    }

    /// Gains as `(kp, ki, kd)`.
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    /// Output limits as `(min, max)`.
    pub fn limits(&self) -> (f64, f64) {
        (self.output_min, self.output_max)
    }

    /// Error passed to the previous `compute` call.
    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    /// Accumulated error.
    pub fn integral_error(&self) -> f64 {
        self.integral_error
    }
}
