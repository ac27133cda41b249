//! Synthetic source images for tests.

use blinkcheck_core::SourceImage;
use image::{DynamicImage, Rgb, RgbImage};

/// Builder for deterministic test images.
///
/// None of these look like real photos; they exist to drive the pipeline,
/// crop geometry and rendering with known pixel content.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// A uniform RGB image.
    #[must_use]
    pub fn uniform_rgb(width: u32, height: u32, r: u8, g: u8, b: u8) -> SourceImage {
        let img = RgbImage::from_pixel(width, height, Rgb([r, g, b]));
        SourceImage::new("synthetic://uniform_rgb", DynamicImage::ImageRgb8(img))
    }

    /// A high-contrast checkerboard.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> SourceImage {
        let cell = cell_size.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        SourceImage::new("synthetic://checkerboard", DynamicImage::ImageRgb8(img))
    }

    /// A light backdrop with a single dark face-sized patch centered at
    /// `(cx, cy)` with half-extents `(hw, hh)`.
    #[must_use]
    pub fn portrait(width: u32, height: u32, cx: u32, cy: u32, hw: u32, hh: u32) -> SourceImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if x.abs_diff(cx) < hw && y.abs_diff(cy) < hh {
                Rgb([92, 70, 58])
            } else {
                Rgb([210, 210, 225])
            }
        });
        SourceImage::new("synthetic://portrait", DynamicImage::ImageRgb8(img))
    }

    /// A 2x2 image with explicit pixel values (minimal processable size).
    #[must_use]
    pub fn tiny(values: [[u8; 2]; 2]) -> SourceImage {
        let mut img = RgbImage::new(2, 2);
        for (y, row) in values.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                img.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
            }
        }
        SourceImage::new("synthetic://tiny", DynamicImage::ImageRgb8(img))
    }
}
