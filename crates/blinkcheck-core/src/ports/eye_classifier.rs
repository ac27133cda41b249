//! Eye-state classifier port.

use std::collections::HashMap;

use crate::domain::ModelInput;

/// Well-known label for the open-eyes class.
pub const OPEN_LABEL: &str = "open";
/// Well-known label for the closed-eyes class.
pub const CLOSED_LABEL: &str = "closed";

/// Output of one classifier invocation: the winning label plus the full
/// label-to-probability distribution.
#[derive(Debug, Clone)]
pub struct EyeClassification {
    pub top_label: String,
    pub probabilities: HashMap<String, f32>,
}

impl EyeClassification {
    /// Probability of the open-eyes label, if present in the distribution.
    #[must_use]
    pub fn open_probability(&self) -> Option<f32> {
        self.probabilities.get(OPEN_LABEL).copied()
    }
}

/// Port for the external eye-state model.
pub trait EyeClassifier: Send + Sync {
    /// Side length of the square input buffer the model expects.
    fn input_size(&self) -> u32;

    /// Classifies a face crop prepared as a model input buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the model invocation fails.
    fn classify(&self, input: &ModelInput) -> anyhow::Result<EyeClassification>;
}
