//! In-memory path recording.
//!
//! While following the line the robot drops one [`PathPoint`] per whole
//! centimetre of odometry distance. A later run can look points up by
//! distance to decide where to speed up.

use std::fmt;

use crate::error::{ControlError, Result};
use crate::odometry::PowerOdometry;

/// Speed class of a path segment, `0` (slowest) to `7` (full speed).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    /// Slowest class.
    pub const MIN: SpeedLevel = SpeedLevel(0);
    /// Full speed.
    pub const FULL: SpeedLevel = SpeedLevel(7);

    /// Build a speed level.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidSpeedLevel` above 7.
    pub fn new(level: u8) -> Result<Self> {
        if level > Self::FULL.0 {
            return Err(ControlError::InvalidSpeedLevel(level));
        }
        Ok(SpeedLevel(level))
    }

    /// The raw level.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        Self::FULL
    }
}

/// One recorded centimetre of path.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Whether the line was under the robot here.
    pub on_line: bool,
    /// Speed class for this segment.
    pub speed: SpeedLevel,
    /// Odometry heading when the point was recorded (degrees).
    pub wrapped_angle: f64,
}

impl Default for PathPoint {
    fn default() -> Self {
        PathPoint {
            on_line: true,
            speed: SpeedLevel::FULL,
            wrapped_angle: 0.0,
        }
    }
}

/// A bounded sequence of path points indexed by centimetre.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<PathPoint>,
    capacity: usize,
    use_left_sensor: bool,
}

impl Path {
    /// An empty path that holds at most `capacity` points.
    ///
    /// `use_left_sensor` records which edge of the bar judged on/off line.
    pub fn new(capacity: usize, use_left_sensor: bool) -> Self {
        Path {
            points: Vec::with_capacity(capacity),
            capacity,
            use_left_sensor,
        }
    }

    /// Whether the left edge of the sensor bar judges on/off line.
    pub fn use_left_sensor(&self) -> bool {
        self.use_left_sensor
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the path is full.
    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    /// Record a point if the robot has passed the next whole centimetre.
    ///
    /// Returns `true` if a point was appended.
    pub fn attempt_update(&mut self, odometry: &PowerOdometry, on_line: bool) -> bool {
        let travelled = odometry.dist_along.trunc();
        if travelled > self.points.len() as f64 && !self.is_full() {
            self.points.push(PathPoint {
                on_line,
                wrapped_angle: odometry.angle_from,
                ..PathPoint::default()
            });
            true
        } else {
            false
        }
    }

    /// The point covering `dist_along` centimetres; the last point past the end.
    pub fn point(&self, dist_along: f64) -> Option<&PathPoint> {
        if self.points.is_empty() || !(dist_along >= 0.0) {
            return None;
        }
        let index = (dist_along as usize).min(self.points.len() - 1);
        self.points.get(index)
    }

    /// Mutable access to the point covering `dist_along`.
    pub fn point_mut(&mut self, dist_along: f64) -> Option<&mut PathPoint> {
        if self.points.is_empty() || !(dist_along >= 0.0) {
            return None;
        }
        let index = (dist_along as usize).min(self.points.len() - 1);
        self.points.get_mut(index)
    }

    /// All points in recording order.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id\tspeed\tisOffLine\tangle")?;
        for (i, p) in self.points.iter().enumerate() {
            writeln!(
                f,
                "{}\t{:b}\t{}\t{:.2}",
                i,
                p.speed.get(),
                u8::from(!p.on_line),
                p.wrapped_angle
            )?;
        }
        Ok(())
    }
}
