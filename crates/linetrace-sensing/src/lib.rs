//! Ground-truth line sensor simulation.
//!
//! A [`SensorArray`] turns a robot [`Pose`](linetrace_kinematics::Pose) and a
//! reference [`IntensityField`] into a [`SensorReading`]: six normalized
//! intensities, left to right, each the mean over the sensor's conical
//! ground footprint.

#![warn(missing_docs)]

pub mod array;
pub mod error;
pub mod field;
pub mod track;

pub use array::{MAX_CONE_RADIUS, SENSOR_COUNT, SensorArray, SensorGeometry, SensorReading, cone_radius};
pub use error::SensingError;
pub use field::{IntensityField, OutOfBounds};
pub use track::Track;
