//! Reference intensity fields.
//!
//! A field is the ground truth the sensors look at: a grayscale bitmap where
//! the printed line is darker than the background. The sensing code only
//! reads it.

use image::{GrayImage, RgbImage, RgbaImage};

use crate::error::{Result, SensingError};

/// A read-only 2-D grayscale field addressable by integer pixel coordinates.
pub trait IntensityField {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Gray level (0 = black, 255 = white) of an in-bounds pixel.
    fn gray(&self, x: u32, y: u32) -> u8;
}

/// Integer luma of an RGB triple, weighted 11:16:5.
#[inline]
pub fn gray_of(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 11 + g as u32 * 16 + b as u32 * 5) / 32) as u8
}

impl IntensityField for GrayImage {
    fn dimensions(&self) -> (u32, u32) {
        GrayImage::dimensions(self)
    }

    fn gray(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y).0[0]
    }
}

impl IntensityField for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbImage::dimensions(self)
    }

    fn gray(&self, x: u32, y: u32) -> u8 {
        let [r, g, b] = self.get_pixel(x, y).0;
        gray_of(r, g, b)
    }
}

impl IntensityField for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    // Alpha is ignored.
    fn gray(&self, x: u32, y: u32) -> u8 {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        gray_of(r, g, b)
    }
}

/// What a sample outside the field reads.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutOfBounds {
    /// Read the nearest edge pixel.
    #[default]
    Clamp,
    /// Read a fixed normalized intensity in `[0, 1]`.
    Constant(f64),
}

impl OutOfBounds {
    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            OutOfBounds::Constant(v) if !(0.0..=1.0).contains(&v) => {
                Err(SensingError::InvalidOutOfBounds(v))
            }
            _ => Ok(()),
        }
    }
}

/// Normalized intensity in `[0, 1]` at integer coordinates, applying `policy`
/// outside the field.
///
/// An empty field reads as white under [`OutOfBounds::Clamp`].
pub fn sample<F: IntensityField + ?Sized>(field: &F, policy: OutOfBounds, x: i64, y: i64) -> f64 {
    let (width, height) = field.dimensions();
    let inside = x >= 0 && y >= 0 && x < width as i64 && y < height as i64;
    if inside {
        return field.gray(x as u32, y as u32) as f64 / 255.0;
    }
    match policy {
        OutOfBounds::Constant(value) => value,
        OutOfBounds::Clamp => {
            if width == 0 || height == 0 {
                return 1.0;
            }
            let cx = x.clamp(0, width as i64 - 1) as u32;
            let cy = y.clamp(0, height as i64 - 1) as u32;
            field.gray(cx, cy) as f64 / 255.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_gray_weights() {
        assert_eq!(gray_of(255, 255, 255), 255);
        assert_eq!(gray_of(0, 0, 0), 0);
        assert_eq!(gray_of(255, 0, 0), 87);
        assert_eq!(gray_of(0, 255, 0), 127);
        assert_eq!(gray_of(0, 0, 255), 39);
    }

    #[test]
    fn test_rgb_field_uses_integer_luma() {
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 0]));
        assert_eq!(IntensityField::gray(&img, 1, 1), 87);
        assert!((sample(&img, OutOfBounds::Clamp, 0, 0) - 87.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_bounds_clamps_to_edge() {
        // Left column black, everything else white.
        let img = GrayImage::from_fn(4, 3, |x, _| if x == 0 { Luma([0]) } else { Luma([255]) });
        assert_eq!(sample(&img, OutOfBounds::Clamp, -10, 1), 0.0);
        assert_eq!(sample(&img, OutOfBounds::Clamp, 50, -3), 1.0);
        assert_eq!(sample(&img, OutOfBounds::Clamp, 0, 99), 0.0);
    }

    #[test]
    fn test_out_of_bounds_constant() {
        let img = GrayImage::from_pixel(4, 4, Luma([0]));
        assert_eq!(sample(&img, OutOfBounds::Constant(0.5), 4, 0), 0.5);
        assert_eq!(sample(&img, OutOfBounds::Constant(0.5), 3, 3), 0.0);
    }

    #[test]
    fn test_empty_field_reads_white() {
        let img = GrayImage::new(0, 0);
        assert_eq!(sample(&img, OutOfBounds::Clamp, 0, 0), 1.0);
        assert_eq!(sample(&img, OutOfBounds::Constant(0.25), 0, 0), 0.25);
    }
}
