//! Core domain types for the predict pipeline.

mod buffer;
mod error;
mod geometry;
mod report;

pub use buffer::ModelInput;
pub use error::{PredictError, StageFailure};
pub use geometry::{NormalizedBox, PixelRect};
pub use report::{AnnotatedBox, ImageDimensions, PredictReport, SourceImage};
