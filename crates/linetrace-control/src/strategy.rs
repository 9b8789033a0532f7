//! Line-following strategies: reduce a sensor reading to a steering error.

use linetrace_sensing::{SENSOR_COUNT, SensorReading};
use tracing::debug;

/// Turns a sensor reading into a scalar error for the PID controller.
pub trait LineStrategy {
    /// Error for this reading, or `None` when no sensor sees the line.
    fn error(&mut self, reading: &SensorReading) -> Option<f64>;

    /// The last error produced while the line was visible.
    fn last_error(&self) -> f64;
}

/// Lateral position of each sensor on `[-1, 1]`, left positive.
const SENSOR_WEIGHTS: [f64; SENSOR_COUNT] = [1.0, 0.6, 0.2, -0.2, -0.6, -1.0];

/// Darkness-weighted centroid of the sensor bar.
///
/// Each sensor's darkness is `1 - reading`. The error is the darkness-weighted
/// mean lateral position, in `[-1, 1]`; positive means the line is left of
/// centre.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCentroid {
    /// Minimum darkness on at least one sensor for the line to count as seen.
    threshold: f64,
    last_error: f64,
}

impl WeightedCentroid {
    /// Create a strategy with the given visibility threshold.
    pub fn new(threshold: f64) -> Self {
        WeightedCentroid {
            threshold,
            last_error: 0.0,
        }
    }

    /// Returns the visibility threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether any sensor is darker than the threshold.
    pub fn sees_line(&self, reading: &SensorReading) -> bool {
        reading.values().iter().any(|v| 1.0 - v >= self.threshold)
    }
}

impl Default for WeightedCentroid {
    fn default() -> Self {
        WeightedCentroid::new(0.2)
    }
}

impl LineStrategy for WeightedCentroid {
    fn error(&mut self, reading: &SensorReading) -> Option<f64> {
        if !self.sees_line(reading) {
            debug!(last_error = self.last_error, "Line lost");
            return None;
        }

        let mut weighted = 0.0;
        let mut total = 0.0;
        for (v, w) in reading.values().iter().zip(SENSOR_WEIGHTS) {
            let darkness = (1.0 - v).max(0.0);
            weighted += w * darkness;
            total += darkness;
        }

        let error = weighted / total;
        self.last_error = error;
        Some(error)
    }

    fn last_error(&self) -> f64 {
        self.last_error
    }
}
