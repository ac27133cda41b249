//! Typed failures of the predict pipeline.

use thiserror::Error;

use super::geometry::PixelRect;

/// Failure of a whole predict action.
///
/// These abort the run before any boxes are produced. They are reported to
/// the caller; they never terminate the process.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The source image could not be loaded or decoded.
    #[error("failed to load source image")]
    ImageLoad(#[source] anyhow::Error),

    /// The face detector input could not be built or its invocation failed.
    #[error("face detector invocation failed")]
    Detector(#[source] anyhow::Error),
}

/// Per-box failure inside the crop-and-classify stage.
///
/// A stage failure degrades the affected box to an absent score; it is never
/// propagated to the rest of the batch and there are no retries.
#[derive(Debug, Error)]
pub enum StageFailure {
    /// The crop rectangle is degenerate or leaves the image.
    #[error("crop rectangle {0:?} is degenerate or out of bounds")]
    Crop(PixelRect),

    /// The crop could not be converted into the classifier's input buffer.
    #[error("classifier input buffer conversion failed")]
    BufferConversion(#[source] anyhow::Error),

    /// The classifier invocation failed.
    #[error("classifier invocation failed")]
    Classifier(#[source] anyhow::Error),

    /// The classifier output carried no probability for the expected label.
    #[error("label `{0}` missing from classifier output")]
    MissingLabel(&'static str),
}
