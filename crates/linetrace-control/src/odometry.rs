//! Dead reckoning from commanded motor powers.
//!
//! This is the robot's own estimate, not the simulator's ground truth: it
//! knows only the powers it sent and assumes a fixed full-power forward
//! and turn rate.

use std::fmt;

/// Forward speed at full power on both motors (cm/s).
pub const MAX_FORWARD_SPEED: f64 = 100.0;
/// Turn rate at full opposite power (deg/s).
pub const MAX_TURN_SPEED: f64 = 500.0;

/// Distance travelled along the path and heading relative to the start.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerOdometry {
    /// Centimetres, positive forward of the start.
    pub dist_along: f64,
    /// Degrees, positive nose-left.
    pub angle_from: f64,
}

impl PowerOdometry {
    /// Start at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate one control period of `seconds`.
    ///
    /// The half sums use integer division, matching the motor firmware.
    pub fn update(&mut self, left_power: i32, right_power: i32, seconds: f64) {
        let forward_speed = ((left_power + right_power) / 2) as f64 * MAX_FORWARD_SPEED / 255.0;
        let turn_speed = ((right_power - left_power) / 2) as f64 * MAX_TURN_SPEED / 255.0;

        self.dist_along += forward_speed * seconds;
        self.angle_from += turn_speed * seconds;
    }

    /// [`update`](Self::update) for a firmware timer step in whole milliseconds.
    pub fn update_ms(&mut self, left_power: i32, right_power: i32, timestep_ms: u32) {
        self.update(left_power, right_power, timestep_ms as f64 / 1000.0);
    }
}

impl fmt::Display for PowerOdometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(d, theta) = ({:.2}, {:.2})", self.dist_along, self.angle_from)
    }
}
