//! Predict results and source image wrappers.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

use super::geometry::NormalizedBox;

/// A detected box with its classification outcome attached.
///
/// `score` is the probability that the eyes inside the box are open; `None`
/// means classification could not be computed for this box (it serializes
/// as `null` and renders with the neutral treatment). Created once per
/// detected box, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBox {
    /// The detector box, center-based and normalized.
    pub bbox: NormalizedBox,
    /// Open-eyes probability, absent if classification failed.
    pub score: Option<f32>,
}

impl AnnotatedBox {
    #[must_use]
    pub const fn new(bbox: NormalizedBox, score: Option<f32>) -> Self {
        Self { bbox, score }
    }

    /// True if classification produced a usable probability.
    #[must_use]
    pub const fn is_classified(&self) -> bool {
        self.score.is_some()
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Complete result of one predict run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictReport {
    /// Path or identifier of the analyzed image.
    pub path: String,
    /// Timestamp of the run (RFC 3339).
    pub timestamp: String,
    /// Source image dimensions.
    pub dimensions: ImageDimensions,
    /// One entry per detected face, in detector order.
    pub faces: Vec<AnnotatedBox>,
}

/// A decoded source image plus where it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Path or identifier the image was loaded from.
    pub path: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Decoded pixel data, orientation already applied.
    pub image: DynamicImage,
}

impl SourceImage {
    #[must_use]
    pub fn new(path: impl Into<String>, image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            path: path.into(),
            width,
            height,
            image,
        }
    }
}
