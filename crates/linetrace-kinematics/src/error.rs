#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! Only construction can fail. Once a drive and an integrator exist, every
//! pose update is total.

use core::fmt;

/// Errors that can occur when building kinematic helpers.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid wheel distance.
    /// This variant is returned when the axle separation is not positive (or not finite).
    InvalidWheelDistance(&'static str),
    /// Error for an invalid integration step.
    /// This variant is returned when the fixed time step is zero, negative or not finite.
    NonPositiveTimeStep(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidWheelDistance(msg) => write!(f, "Invalid wheel distance: {}", msg),
            KinematicsError::NonPositiveTimeStep(msg) => write!(f, "Invalid time step: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
