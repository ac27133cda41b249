//! Face detector port.

use crate::domain::{ModelInput, NormalizedBox};

/// Detection thresholds supplied with every detector invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Non-maximum-suppression IoU threshold.
    pub iou_threshold: f32,
    /// Minimum confidence for a candidate box to be kept.
    pub confidence_threshold: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            confidence_threshold: 0.3,
        }
    }
}

/// Port for the external face detection model.
///
/// Implementations consume a fixed-size square pixel buffer and return zero
/// or more center-based normalized boxes, already filtered by the supplied
/// thresholds and ordered by descending confidence.
pub trait FaceDetector: Send + Sync {
    /// Side length of the square input buffer the model expects.
    fn input_size(&self) -> u32;

    /// Runs detection on a prepared input buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the model invocation fails.
    fn detect(
        &self,
        input: &ModelInput,
        params: &DetectionParams,
    ) -> anyhow::Result<Vec<NormalizedBox>>;
}
