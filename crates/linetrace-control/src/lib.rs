//! Closed-loop control for the simulated line follower.
//!
//! Per tick the host runs: sensor reading → [`LineStrategy`] error →
//! [`PidController`] correction → [`Mixer`] motor powers → [`PowerCurve`]
//! wheel velocities. Dead-reckoning [`PowerOdometry`] and [`Path`]
//! recording ride along on the same powers.

#![warn(missing_docs)]

pub mod calibration;
pub mod error;
pub mod mixer;
pub mod odometry;
pub mod path;
pub mod pid;
pub mod strategy;

pub use calibration::{LinearPowerCurve, PowerCurve, cm_to_px, px_to_cm, wheel_velocities};
pub use error::ControlError;
pub use mixer::Mixer;
pub use odometry::PowerOdometry;
pub use path::{Path, PathPoint, SpeedLevel};
pub use pid::PidController;
pub use strategy::{LineStrategy, WeightedCentroid};
