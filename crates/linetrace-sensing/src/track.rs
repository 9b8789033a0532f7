//! Track images: loading from disk and synthetic generation.

use std::path::Path;

use image::{GrayImage, Luma, RgbImage};
use tracing::info;

use crate::error::{Result, SensingError};
use crate::field::IntensityField;

/// Gray level of the printed line on generated tracks.
pub const LINE_GRAY: u8 = 20;
/// Gray level of the background on generated tracks.
pub const BACKGROUND_GRAY: u8 = 255;

/// A track the robots drive over.
#[derive(Debug, Clone)]
pub enum Track {
    /// A generated single-channel track.
    Gray(GrayImage),
    /// A colour track loaded from disk.
    Rgb(RgbImage),
}

impl Track {
    /// Load a track image (PNG, PNM or BMP).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| SensingError::TrackLoad {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgb8();

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(SensingError::EmptyTrack { width, height });
        }
        info!(path = %path.display(), width, height, "Loaded track image");
        Ok(Track::Rgb(img))
    }

    /// A white field with a dark ring centred in the image.
    ///
    /// Pixels whose centre lies within `thickness / 2` of the circle of
    /// radius `radius` are painted with [`LINE_GRAY`].
    pub fn ring(width: u32, height: u32, radius: f64, thickness: f64) -> Self {
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let half = thickness / 2.0;
        let img = GrayImage::from_fn(width, height, |x, y| {
            let d = (x as f64 + 0.5 - cx).hypot(y as f64 + 0.5 - cy);
            if (d - radius).abs() <= half {
                Luma([LINE_GRAY])
            } else {
                Luma([BACKGROUND_GRAY])
            }
        });
        Track::Gray(img)
    }
}

impl IntensityField for Track {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            Track::Gray(img) => img.dimensions(),
            Track::Rgb(img) => img.dimensions(),
        }
    }

    fn gray(&self, x: u32, y: u32) -> u8 {
        match self {
            Track::Gray(img) => IntensityField::gray(img, x, y),
            Track::Rgb(img) => IntensityField::gray(img, x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_paints_line_only_on_circle() {
        let track = Track::ring(200, 200, 60.0, 8.0);
        assert_eq!(track.dimensions(), (200, 200));
        // On the ring, right of centre.
        assert_eq!(track.gray(160, 100), LINE_GRAY);
        // Centre and corner are background.
        assert_eq!(track.gray(100, 100), BACKGROUND_GRAY);
        assert_eq!(track.gray(0, 0), BACKGROUND_GRAY);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Track::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, SensingError::TrackLoad { .. }));
    }
}
