//! Fixed-size square pixel buffers handed to the models.

use anyhow::Result;
use image::{imageops::FilterType, DynamicImage, RgbImage};

/// The transient pixel buffer a model consumes.
///
/// Always square, always RGB, built fresh for each model invocation and
/// discarded afterwards. Construction uses an exact resize with no aspect
/// preservation: normalized detector output maps straight back onto the
/// original image dimensions, which is only coherent if the input was
/// squashed rather than letterboxed.
#[derive(Debug, Clone)]
pub struct ModelInput {
    size: u32,
    pixels: RgbImage,
}

impl ModelInput {
    /// Resizes `image` into a `size` x `size` RGB buffer.
    ///
    /// # Errors
    ///
    /// Fails if `size` is zero or the source image is empty.
    pub fn from_image(image: &DynamicImage, size: u32) -> Result<Self> {
        anyhow::ensure!(size > 0, "model input size must be non-zero");
        anyhow::ensure!(
            image.width() > 0 && image.height() > 0,
            "cannot build a {size}x{size} model input from an empty image"
        );

        let pixels = image
            .resize_exact(size, size, FilterType::Lanczos3)
            .to_rgb8();
        Ok(Self { size, pixels })
    }

    /// Side length of the square buffer.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub const fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}
