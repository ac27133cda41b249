//! Test support utilities for blinkcheck.
//!
//! Provides mock model ports and synthetic image builders for testing the
//! detection-crop-classify pipeline without real weights.
//!
//! # Example
//!
//! ```
//! use blinkcheck_test_support::{MockFaceDetector, SyntheticImageBuilder};
//! use blinkcheck_core::NormalizedBox;
//!
//! let source = SyntheticImageBuilder::uniform_rgb(100, 100, 128, 128, 128);
//! let detector = MockFaceDetector::returning(vec![
//!     NormalizedBox::new(0.5, 0.5, 0.2, 0.2),
//! ]);
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use mocks::{
    MockEyeClassifier, MockFaceDetector, MockReportOutput, ScriptedClassification,
};
