//! This module defines the error types used by the `linetrace-sensing` crate.

use std::path::PathBuf;

/// Error type for sensing setup.
///
/// Sampling itself never fails; these are raised while loading a track or
/// validating the sensor bar geometry.
#[derive(Debug, thiserror::Error)]
pub enum SensingError {
    /// The track image could not be opened or decoded.
    #[error("Failed to load track image {path}: {source}")]
    TrackLoad {
        /// Path that was requested.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The track image has no pixels.
    #[error("Track image is empty ({width}x{height})")]
    EmptyTrack {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// A sensor geometry parameter is out of range.
    #[error("Invalid sensor geometry: {0}")]
    InvalidGeometry(&'static str),

    /// The constant out-of-bounds intensity is not a normalized value.
    #[error("Out-of-bounds intensity {0} is not in [0, 1]")]
    InvalidOutOfBounds(f64),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SensingError>;
