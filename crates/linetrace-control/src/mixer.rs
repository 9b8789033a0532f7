//! Steering correction to motor powers.

use crate::calibration::FULL_POWER;
use crate::error::{ControlError, Result};

/// Splits a steering correction across the two motors around a base power.
///
/// A positive correction speeds up the right wheel and slows the left,
/// turning the robot left.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mixer {
    base_power: i32,
    max_power: i32,
}

impl Mixer {
    /// Create a mixer.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidPower` unless `0 <= base_power <= max_power <= 255`.
    pub fn new(base_power: i32, max_power: i32) -> Result<Self> {
        if !(0..=FULL_POWER).contains(&max_power) {
            return Err(ControlError::InvalidPower("max power must be in [0, 255]"));
        }
        if !(0..=max_power).contains(&base_power) {
            return Err(ControlError::InvalidPower("base power must be in [0, max power]"));
        }
        Ok(Mixer {
            base_power,
            max_power,
        })
    }

    /// Returns the base power.
    pub fn base_power(&self) -> i32 {
        self.base_power
    }

    /// Left and right powers for a correction, nominally in `[-1, 1]`.
    pub fn mix(&self, correction: f64) -> (i32, i32) {
        let base = self.base_power as f64;
        let limit = self.max_power as f64;
        let left = (base - correction * base).round().clamp(-limit, limit);
        let right = (base + correction * base).round().clamp(-limit, limit);
        (left as i32, right as i32)
    }
}
