//! Motor power calibration and unit conversion.
//!
//! Motor commands are integer powers in `[-255, 255]`. A [`PowerCurve`]
//! maps a power to the ground speed it produces in centimetres per second;
//! the simulator then works in track pixels, half a centimetre each.

use linetrace_kinematics::WheelVelocities;

use crate::error::{ControlError, Result};

/// Largest power magnitude a motor accepts.
pub const FULL_POWER: i32 = 255;

/// Track pixels per centimetre.
pub const PX_PER_CM: f64 = 2.0;

/// Centimetres to track pixels.
#[inline]
pub fn cm_to_px(cm: f64) -> f64 {
    cm * PX_PER_CM
}

/// Track pixels to centimetres.
#[inline]
pub fn px_to_cm(px: f64) -> f64 {
    px / PX_PER_CM
}

/// Power to ground speed calibration of one motor.
pub trait PowerCurve {
    /// Ground speed in cm/s for a power in `[-255, 255]`.
    fn velocity(&self, power: i32) -> f64;
}

impl<F: Fn(i32) -> f64> PowerCurve for F {
    fn velocity(&self, power: i32) -> f64 {
        self(power)
    }
}

/// Linear curve with a symmetric dead band.
///
/// Powers within the dead band produce no motion; above it speed rises
/// linearly to `max_speed` at full power.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPowerCurve {
    max_speed: f64,
    dead_band: i32,
}

impl LinearPowerCurve {
    /// Build a curve reaching `max_speed` cm/s at full power.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidPower` if `dead_band` is not in `[0, 255)`.
    pub fn new(max_speed: f64, dead_band: i32) -> Result<Self> {
        if !(0..FULL_POWER).contains(&dead_band) {
            return Err(ControlError::InvalidPower("dead band must be in [0, 255)"));
        }
        Ok(LinearPowerCurve {
            max_speed,
            dead_band,
        })
    }
}

impl PowerCurve for LinearPowerCurve {
    fn velocity(&self, power: i32) -> f64 {
        let magnitude = power.abs().min(FULL_POWER);
        if magnitude <= self.dead_band {
            return 0.0;
        }
        let span = (FULL_POWER - self.dead_band) as f64;
        let speed = self.max_speed * (magnitude - self.dead_band) as f64 / span;
        speed * power.signum() as f64
    }
}

/// Wheel velocities in pixels per second for a pair of motor powers.
pub fn wheel_velocities<C: PowerCurve + ?Sized>(curve: &C, left: i32, right: i32) -> WheelVelocities {
    WheelVelocities::new(
        cm_to_px(curve.velocity(left)),
        cm_to_px(curve.velocity(right)),
    )
}
