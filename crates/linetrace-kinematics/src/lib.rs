#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for exact 2D differential-drive pose integration."]
#![doc = ""]
#![doc = "Poses live in screen space: `y` grows downward and a positive heading turns the"]
#![doc = "robot visually counter-clockwise. The forward unit vector is `(cos θ, -sin θ)` and"]
#![doc = "the unit vector pointing to the robot's left is `(-sin θ, -cos θ)`."]

use core::f64::consts::PI;
use core::fmt;
use libm::{atan2, cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// A 2‑D pose `(x, y, θ)` in world units (pixels of the track image) and radians.
///
/// `theta` is unbounded; it is never wrapped by the integrator. Use
/// [`Pose::normalize_angle`] when presenting it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position, growing to the right.
    pub x: f64,
    /// World‑frame y position, growing downward.
    pub y: f64,
    /// Heading (rad), counter‑clockwise on screen.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position.
    /// * `y`: World-frame y position (downward).
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Place a robot on `from`, aimed at `toward`.
    ///
    /// This is how a robot is dropped onto the first segment of a route.
    pub fn facing(from: (f64, f64), toward: (f64, f64)) -> Self {
        let theta = atan2(from.1 - toward.1, toward.0 - from.0);
        Pose::new(from.0, from.1, theta)
    }

    /// Unit vector along the current heading.
    pub fn forward(&self) -> (f64, f64) {
        (cos(self.theta), -sin(self.theta))
    }

    /// Unit vector pointing to the robot's left.
    pub fn left(&self) -> (f64, f64) {
        (-sin(self.theta), -cos(self.theta))
    }

    /// World position of a point fixed to the chassis.
    ///
    /// # Arguments
    ///
    /// * `forward`: Offset along the heading.
    /// * `lateral`: Offset to the robot's left (negative is right).
    pub fn project(&self, forward: f64, lateral: f64) -> (f64, f64) {
        let (fx, fy) = self.forward();
        let (lx, ly) = self.left();
        (
            self.x + forward * fx + lateral * lx,
            self.y + forward * fy + lateral * ly,
        )
    }

    /// Drive the pose directly, bypassing the wheels.
    ///
    /// The heading is turned by `dtheta * dt` first, then the pose moves
    /// `delta * dt` along the new heading.
    pub fn nudge(&mut self, delta: f64, dtheta: f64, dt: f64) {
        self.theta += dtheta * dt;
        let (fx, fy) = self.forward();
        self.x += delta * fx * dt;
        self.y += delta * fy * dt;
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {:.2}, y: {:.2}, θ: {:.2} rad)",
            self.x,
            self.y,
            Pose::normalize_angle(self.theta)
        )
    }
}

/// Left and right wheel ground velocities, in world units per time unit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelVelocities {
    /// Left wheel velocity.
    pub left: f64,
    /// Right wheel velocity.
    pub right: f64,
}

impl WheelVelocities {
    /// Construct wheel velocities.
    pub const fn new(left: f64, right: f64) -> Self {
        WheelVelocities { left, right }
    }

    /// Both wheels reversed.
    pub fn reversed(&self) -> Self {
        WheelVelocities::new(-self.left, -self.right)
    }
}

impl fmt::Display for WheelVelocities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(vL: {:.2}, vR: {:.2})", self.left, self.right)
    }
}

/// Linear and angular chassis velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Linear speed of the axle midpoint.
    pub v: f64,
    /// Angular speed (rad per time unit), positive counter‑clockwise on screen.
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    pub const fn new(v: f64, omega: f64) -> Self {
        ChassisSpeeds { v, omega }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.2}, ω: {:.2} rad)", self.v, self.omega)
    }
}

/// Differential‑drive geometry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    /// Distance between the two wheel contact points.
    wheel_distance: f64,
}

impl DifferentialDrive {
    /// Construct a new differential‑drive helper.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidWheelDistance)` if `wheel_distance` is not
    /// a positive finite number.
    pub fn new(wheel_distance: f64) -> Result<Self, KinematicsError> {
        if !(wheel_distance > 0.0) || !wheel_distance.is_finite() {
            return Err(KinematicsError::InvalidWheelDistance("must be positive"));
        }
        Ok(DifferentialDrive { wheel_distance })
    }

    /// Returns the wheel distance.
    pub fn wheel_distance(&self) -> f64 {
        self.wheel_distance
    }

    /// Chassis speeds produced by the given wheel velocities.
    pub fn forward_kinematics(&self, wheels: WheelVelocities) -> ChassisSpeeds {
        let v = (wheels.left + wheels.right) / 2.0;
        let omega = (wheels.right - wheels.left) / self.wheel_distance;
        ChassisSpeeds::new(v, omega)
    }

    /// The point the robot is currently turning about.
    ///
    /// Returns `None` while both wheels turn at the same speed, since the
    /// robot then drives in a straight line.
    pub fn instantaneous_center(&self, pose: Pose, wheels: WheelVelocities) -> Option<(f64, f64)> {
        let w = (wheels.right - wheels.left) / self.wheel_distance;
        if w == 0.0 {
            return None;
        }
        let r = (wheels.left + wheels.right) / (2.0 * w);
        let (lx, ly) = pose.left();
        Some((pose.x + r * lx, pose.y + r * ly))
    }
}

impl fmt::Display for DifferentialDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DifferentialDrive (L: {:.2})", self.wheel_distance)
    }
}

/// Fixed-step pose integrator.
///
/// Each call to [`KinematicIntegrator::advance`] rotates the robot about its
/// instantaneous center of curvature, which is exact as long as the wheel
/// velocities are constant over the step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicIntegrator {
    drive: DifferentialDrive,
    dt: f64,
}

impl KinematicIntegrator {
    /// Construct an integrator with a fixed time step.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NonPositiveTimeStep)` if `dt` is not a positive
    /// finite number.
    pub fn new(drive: DifferentialDrive, dt: f64) -> Result<Self, KinematicsError> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(KinematicsError::NonPositiveTimeStep("must be positive"));
        }
        Ok(KinematicIntegrator { drive, dt })
    }

    /// Returns the drive geometry.
    pub fn drive(&self) -> &DifferentialDrive {
        &self.drive
    }

    /// Returns the fixed time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Advance `pose` by one time step.
    pub fn advance(&self, pose: Pose, wheels: WheelVelocities) -> Pose {
        let w = (wheels.right - wheels.left) / self.drive.wheel_distance;

        if w == 0.0 {
            // Straight line, the ICC is at infinity.
            let (fx, fy) = pose.forward();
            let step = wheels.left * self.dt;
            return Pose {
                x: pose.x + step * fx,
                y: pose.y + step * fy,
                theta: pose.theta,
            };
        }

        let r = (wheels.left + wheels.right) / (2.0 * w);
        let icc_x = pose.x - r * sin(pose.theta);
        let icc_y = pose.y - r * cos(pose.theta);

        // Y points down, so the screen-space rotation angle is negated.
        let angle = -w * self.dt;
        let (ca, sa) = (cos(angle), sin(angle));
        let dx = pose.x - icc_x;
        let dy = pose.y - icc_y;

        Pose {
            x: ca * dx - sa * dy + icc_x,
            y: sa * dx + ca * dy + icc_y,
            theta: pose.theta + w * self.dt,
        }
    }
}
