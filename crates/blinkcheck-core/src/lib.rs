//! blinkcheck core - domain types, ports and the detection-crop-classify
//! pipeline.
//!
//! The two ML models (a face detector and an eye-state classifier) are
//! external, pre-trained artifacts. The pipeline talks to them through the
//! [`ports`] traits; [`inference`] ships candle-backed wrappers that execute
//! their weights.

pub mod domain;
pub mod inference;
pub mod pipeline;
pub mod ports;

pub use domain::{
    AnnotatedBox, ImageDimensions, ModelInput, NormalizedBox, PixelRect, PredictError,
    PredictReport, SourceImage, StageFailure,
};
pub use pipeline::Predictor;
pub use ports::{
    DetectionParams, EyeClassification, EyeClassifier, FaceDetector, ReportOutput, CLOSED_LABEL,
    OPEN_LABEL,
};
