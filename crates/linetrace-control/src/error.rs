//! Error types for the `linetrace-control` crate.

/// Error type for controller and mixer configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    /// Output limits are reversed or not finite.
    #[error("Invalid output limits: min {min} must not exceed max {max}")]
    InvalidLimits {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },

    /// A power value lies outside what the motor driver accepts.
    #[error("Invalid power: {0}")]
    InvalidPower(&'static str),

    /// A speed level outside `0..=7`.
    #[error("Speed level {0} out of range 0..=7")]
    InvalidSpeedLevel(u8),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ControlError>;
