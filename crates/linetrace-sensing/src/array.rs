//! The sensor bar.
//!
//! Six downward-facing reflectance sensors sit in a row across the front of
//! the robot. Each one sees a disk of the ground whose radius follows from
//! its mounting height and field of view; its reading is the mean
//! normalized intensity over that disk.

use std::fmt;
use std::ops::Index;

use linetrace_kinematics::Pose;
use tracing::debug;

use crate::error::{Result, SensingError};
use crate::field::{IntensityField, OutOfBounds, sample};

/// Number of sensors on the bar.
pub const SENSOR_COUNT: usize = 6;

/// Lateral position of each sensor in units of the lateral offset, left to right.
const LATERAL_SLOTS: [f64; SENSOR_COUNT] = [5.0, 3.0, 1.0, -1.0, -3.0, -5.0];

/// Largest footprint radius, in pixels, a sensor may have.
pub const MAX_CONE_RADIUS: f64 = 64.0;

/// Radius of the ground footprint of a sensor mounted at height `h` with a
/// full field of view `fov` (radians).
pub fn cone_radius(h: f64, fov: f64) -> f64 {
    h * (fov / 2.0).tan()
}

/// Where the sensor bar sits on the chassis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorGeometry {
    /// Distance from the axle midpoint to the bar, along the heading.
    pub forward_offset: f64,
    /// Half the spacing between two neighbouring sensors.
    pub lateral_offset: f64,
    /// Height of the sensors above the ground.
    pub mount_height: f64,
    /// Full field of view of one sensor (radians).
    pub field_of_view: f64,
}

impl SensorGeometry {
    fn validate(&self) -> Result<()> {
        if !self.forward_offset.is_finite() || !self.lateral_offset.is_finite() {
            return Err(SensingError::InvalidGeometry("offsets must be finite"));
        }
        if !(self.mount_height >= 0.0) || !self.mount_height.is_finite() {
            return Err(SensingError::InvalidGeometry("mount height must be non-negative"));
        }
        if !(self.field_of_view >= 0.0 && self.field_of_view < std::f64::consts::PI) {
            return Err(SensingError::InvalidGeometry("field of view must be in [0, PI)"));
        }
        if self.cone_radius() > MAX_CONE_RADIUS {
            return Err(SensingError::InvalidGeometry("sensor footprint is too large"));
        }
        Ok(())
    }

    /// Ground footprint radius of each sensor.
    pub fn cone_radius(&self) -> f64 {
        cone_radius(self.mount_height, self.field_of_view)
    }
}

/// One normalized intensity per sensor, ordered left to right.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading(pub [f64; SENSOR_COUNT]);

impl SensorReading {
    /// The six readings, left to right.
    pub fn values(&self) -> &[f64; SENSOR_COUNT] {
        &self.0
    }

    /// Index of the darkest sensor. Ties go to the leftmost.
    pub fn darkest(&self) -> usize {
        let mut best = 0;
        for (i, v) in self.0.iter().enumerate() {
            if *v < self.0[best] {
                best = i;
            }
        }
        best
    }
}

impl Index<usize> for SensorReading {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:.2}", v)?;
        }
        write!(f, "]")
    }
}

/// Simulated sensor bar of one robot.
#[derive(Debug, Clone)]
pub struct SensorArray {
    geometry: SensorGeometry,
    policy: OutOfBounds,
    /// Integer offsets inside the footprint, in sampling order.
    footprint: Vec<(i64, i64)>,
    reading: SensorReading,
}

impl SensorArray {
    /// Build a sensor bar.
    ///
    /// # Errors
    ///
    /// Returns `SensingError::InvalidGeometry` for non-finite offsets, a negative
    /// mount height, a field of view outside `[0, PI)` or a cone radius above
    /// [`MAX_CONE_RADIUS`], and `SensingError::InvalidOutOfBounds` for a
    /// constant out-of-bounds intensity outside `[0, 1]`.
    pub fn new(geometry: SensorGeometry, policy: OutOfBounds) -> Result<Self> {
        geometry.validate()?;
        policy.validate()?;
        Ok(SensorArray {
            footprint: footprint(geometry.cone_radius()),
            geometry,
            policy,
            reading: SensorReading::default(),
        })
    }

    /// Returns the geometry.
    pub fn geometry(&self) -> &SensorGeometry {
        &self.geometry
    }

    /// Number of ground samples averaged per sensor.
    pub fn samples_per_sensor(&self) -> usize {
        self.footprint.len()
    }

    /// The most recent reading.
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    /// Re-mount the bar at a new height; the footprint follows.
    pub fn set_mount_height(&mut self, h: f64) -> Result<()> {
        let geometry = SensorGeometry {
            mount_height: h,
            ..self.geometry
        };
        geometry.validate()?;
        self.geometry = geometry;
        self.footprint = footprint(geometry.cone_radius());
        debug!(
            mount_height = h,
            cone_radius = geometry.cone_radius(),
            samples = self.footprint.len(),
            "Sensor bar re-mounted"
        );
        Ok(())
    }

    /// World positions of the sensors for `pose`, left to right.
    pub fn positions(&self, pose: &Pose) -> [(f64, f64); SENSOR_COUNT] {
        let mut out = [(0.0, 0.0); SENSOR_COUNT];
        for (slot, p) in LATERAL_SLOTS.iter().zip(out.iter_mut()) {
            *p = pose.project(self.geometry.forward_offset, slot * self.geometry.lateral_offset);
        }
        out
    }

    /// Read every sensor at `pose`.
    ///
    /// When the footprint is empty (zero cone radius) the previous reading is
    /// kept.
    pub fn sense<F: IntensityField + ?Sized>(&mut self, pose: &Pose, field: &F) -> &SensorReading {
        let n = self.footprint.len();
        if n == 0 {
            debug!("Empty sensor footprint, holding previous reading");
            return &self.reading;
        }

        let positions = self.positions(pose);
        let mut sum = [0.0f64; SENSOR_COUNT];
        for &(dx, dy) in &self.footprint {
            for (acc, &(x, y)) in sum.iter_mut().zip(positions.iter()) {
                let px = (x + dx as f64).round() as i64;
                let py = (y + dy as f64).round() as i64;
                *acc += sample(field, self.policy, px, py);
            }
        }

        for (value, acc) in self.reading.0.iter_mut().zip(sum) {
            *value = acc / n as f64;
        }
        &self.reading
    }
}

/// Integer offsets strictly inside a disk of radius `cr`, column by column.
fn footprint(cr: f64) -> Vec<(i64, i64)> {
    let r = cr.round() as i64;
    let limit = cr * cr;
    let mut out = Vec::new();
    for dx in -r..=r {
        for dy in -r..=r {
            if ((dx * dx + dy * dy) as f64) < limit {
                out.push((dx, dy));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-9;

    fn geometry(mount_height: f64) -> SensorGeometry {
        SensorGeometry {
            forward_offset: 0.0,
            lateral_offset: 4.0,
            mount_height,
            field_of_view: FRAC_PI_2,
        }
    }

    #[test]
    fn test_cone_radius() {
        assert!((cone_radius(6.0, FRAC_PI_2) - 6.0).abs() < EPSILON);
        assert_eq!(cone_radius(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_footprint_excludes_circle_boundary() {
        // cr = 2: (±2, 0) and (0, ±2) lie on the circle and are excluded.
        let pts = footprint(2.0);
        assert_eq!(pts.len(), 9);
        assert!(!pts.contains(&(2, 0)));
        assert!(pts.contains(&(1, 1)));
        assert!(footprint(0.0).is_empty());
        // A sub-pixel cone still sees the pixel under the sensor.
        assert_eq!(footprint(0.4), vec![(0, 0)]);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(SensorArray::new(geometry(-1.0), OutOfBounds::Clamp).is_err());
        let mut g = geometry(2.0);
        g.field_of_view = std::f64::consts::PI;
        assert!(matches!(
            SensorArray::new(g, OutOfBounds::Clamp),
            Err(SensingError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_footprint() {
        assert!(matches!(
            SensorArray::new(geometry(1e6), OutOfBounds::Clamp),
            Err(SensingError::InvalidGeometry(_))
        ));
        let mut g = geometry(4.0);
        g.field_of_view = std::f64::consts::PI - 1e-9;
        assert!(SensorArray::new(g, OutOfBounds::Clamp).is_err());

        let mut array = SensorArray::new(geometry(2.0), OutOfBounds::Clamp).unwrap();
        assert!(array.set_mount_height(MAX_CONE_RADIUS + 1.0).is_err());
        assert!(array.set_mount_height(MAX_CONE_RADIUS - 1.0).is_ok());
        assert_eq!(array.geometry().mount_height, MAX_CONE_RADIUS - 1.0);
    }

    #[test]
    fn test_constant_out_of_bounds_must_be_normalized() {
        for bad in [5.0, -0.1, f64::NAN] {
            assert!(matches!(
                SensorArray::new(geometry(2.0), OutOfBounds::Constant(bad)),
                Err(SensingError::InvalidOutOfBounds(_))
            ));
        }

        let field = GrayImage::from_pixel(4, 4, Luma([0]));
        let mut array = SensorArray::new(geometry(2.0), OutOfBounds::Constant(0.75)).unwrap();
        let reading = *array.sense(&Pose::new(100.0, 100.0, 0.0), &field);
        for v in reading.values() {
            assert!((0.0..=1.0).contains(v));
            assert!((v - 0.75).abs() < EPSILON);
        }
    }

    #[test]
    fn test_positions_left_to_right() {
        let array = SensorArray::new(geometry(2.0), OutOfBounds::Clamp).unwrap();
        let pose = Pose::new(50.0, 50.0, 0.0);
        let pos = array.positions(&pose);
        // Facing +x, the robot's left is -y.
        assert!((pos[0].1 - 30.0).abs() < EPSILON);
        assert!((pos[2].1 - 46.0).abs() < EPSILON);
        assert!((pos[5].1 - 70.0).abs() < EPSILON);
        for p in pos {
            assert!((p.0 - 50.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_uniform_field_reads_its_intensity() {
        let field = GrayImage::from_pixel(100, 100, Luma([51]));
        let mut array = SensorArray::new(geometry(3.0), OutOfBounds::Clamp).unwrap();
        let reading = *array.sense(&Pose::new(50.0, 50.0, 0.3), &field);
        for v in reading.values() {
            assert!((v - 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_line_under_one_side() {
        // Dark horizontal band at y in [20, 32): under the left sensors of a
        // robot at y = 50 facing +x.
        let field = GrayImage::from_fn(100, 100, |_, y| {
            if (20..32).contains(&y) { Luma([0]) } else { Luma([255]) }
        });
        let mut array = SensorArray::new(geometry(2.0), OutOfBounds::Clamp).unwrap();
        let reading = *array.sense(&Pose::new(50.0, 50.0, 0.0), &field);
        assert!(reading[0] < 0.01);
        assert!(reading[5] > 0.99);
        assert_eq!(reading.darkest(), 0);
    }

    #[test]
    fn test_zero_footprint_holds_previous_reading() {
        let white = GrayImage::from_pixel(20, 20, Luma([255]));
        let black = GrayImage::from_pixel(20, 20, Luma([0]));
        let mut array = SensorArray::new(geometry(2.0), OutOfBounds::Clamp).unwrap();
        let pose = Pose::new(10.0, 10.0, 0.0);
        array.sense(&pose, &white);

        array.set_mount_height(0.0).unwrap();
        assert_eq!(array.samples_per_sensor(), 0);
        let reading = *array.sense(&pose, &black);
        assert_eq!(reading, SensorReading([1.0; SENSOR_COUNT]));
    }

    #[test]
    fn test_monotonic_approach_to_disk() {
        // White field with a black disk of radius 10 at (100, 100).
        let field = GrayImage::from_fn(200, 200, |x, y| {
            let d = (x as f64 - 100.0).hypot(y as f64 - 100.0);
            if d <= 10.0 { Luma([0]) } else { Luma([255]) }
        });
        let mut array = SensorArray::new(geometry(6.0), OutOfBounds::Clamp).unwrap();

        // Slide the robot down the screen so its rightmost sensor (at y + 20)
        // approaches the disk centre from above.
        let mut previous = f64::INFINITY;
        let mut first = None;
        for step in 0..=20 {
            let y = 50.0 + step as f64 * 1.5;
            let reading = *array.sense(&Pose::new(100.0, y, 0.0), &field);
            let right = reading[5];
            assert!(right <= previous + EPSILON, "reading rose at y = {}", y);
            previous = right;
            first.get_or_insert(right);
        }
        assert!((first.unwrap() - 1.0).abs() < EPSILON);
        assert!(previous < 0.05);
    }

    #[test]
    fn test_sensing_is_deterministic() {
        let field = GrayImage::from_fn(64, 64, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let mut a = SensorArray::new(geometry(3.0), OutOfBounds::Clamp).unwrap();
        let mut b = a.clone();
        let pose = Pose::new(31.3, 22.8, 0.77);
        assert_eq!(a.sense(&pose, &field), b.sense(&pose, &field));
    }
}
