//! Mock implementations of the core port traits.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use blinkcheck_core::{
    DetectionParams, EyeClassification, EyeClassifier, FaceDetector, ModelInput, NormalizedBox,
    PredictReport, ReportOutput, CLOSED_LABEL, OPEN_LABEL,
};

/// Mock face detector yielding a fixed box list (or failing).
pub struct MockFaceDetector {
    boxes: Vec<NormalizedBox>,
    fail: bool,
    calls: Mutex<usize>,
}

impl MockFaceDetector {
    /// Detector that returns the given boxes on every invocation.
    #[must_use]
    pub fn returning(boxes: Vec<NormalizedBox>) -> Self {
        Self {
            boxes,
            fail: false,
            calls: Mutex::new(0),
        }
    }

    /// Detector whose invocation always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            boxes: Vec::new(),
            fail: true,
            calls: Mutex::new(0),
        }
    }

    /// Number of times `detect` was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FaceDetector for MockFaceDetector {
    fn input_size(&self) -> u32 {
        64
    }

    fn detect(
        &self,
        _input: &ModelInput,
        _params: &DetectionParams,
    ) -> anyhow::Result<Vec<NormalizedBox>> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if self.fail {
            anyhow::bail!("mock detector failure");
        }
        Ok(self.boxes.clone())
    }
}

/// Scripted outcome of one classifier invocation.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedClassification {
    /// Succeed with the given open-eyes probability.
    Score(f32),
    /// Fail the invocation.
    Fail,
    /// Succeed, but without an open-eyes entry in the distribution.
    MissingOpenLabel,
}

/// Mock eye classifier driven by a per-call script.
///
/// Outcomes are consumed in order; once the script is exhausted, every call
/// succeeds with the fallback score.
pub struct MockEyeClassifier {
    script: Mutex<VecDeque<ScriptedClassification>>,
    fallback_score: f32,
    calls: Mutex<usize>,
}

impl MockEyeClassifier {
    /// Classifier that always succeeds with `score`.
    #[must_use]
    pub fn always(score: f32) -> Self {
        Self::scripted_with_fallback(Vec::new(), score)
    }

    /// Classifier that plays back `outcomes` in order.
    #[must_use]
    pub fn scripted(outcomes: Vec<ScriptedClassification>) -> Self {
        Self::scripted_with_fallback(outcomes, 0.9)
    }

    #[must_use]
    pub fn scripted_with_fallback(
        outcomes: Vec<ScriptedClassification>,
        fallback_score: f32,
    ) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback_score,
            calls: Mutex::new(0),
        }
    }

    /// Number of times `classify` was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EyeClassifier for MockEyeClassifier {
    fn input_size(&self) -> u32 {
        32
    }

    fn classify(&self, _input: &ModelInput) -> anyhow::Result<EyeClassification> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        let outcome = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(ScriptedClassification::Score(self.fallback_score));

        match outcome {
            ScriptedClassification::Score(score) => Ok(classification(score)),
            ScriptedClassification::Fail => anyhow::bail!("mock classifier failure"),
            ScriptedClassification::MissingOpenLabel => Ok(EyeClassification {
                top_label: CLOSED_LABEL.to_string(),
                probabilities: HashMap::from([(CLOSED_LABEL.to_string(), 1.0)]),
            }),
        }
    }
}

fn classification(open_score: f32) -> EyeClassification {
    let top_label = if open_score >= 0.5 {
        OPEN_LABEL
    } else {
        CLOSED_LABEL
    };
    EyeClassification {
        top_label: top_label.to_string(),
        probabilities: HashMap::from([
            (OPEN_LABEL.to_string(), open_score),
            (CLOSED_LABEL.to_string(), 1.0 - open_score),
        ]),
    }
}

/// Mock report output capturing written reports for assertions.
#[derive(Default)]
pub struct MockReportOutput {
    reports: Mutex<Vec<PredictReport>>,
    flushes: Mutex<usize>,
}

impl MockReportOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<PredictReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times `flush` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportOutput for MockReportOutput {
    fn write(&self, report: &PredictReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self.flushes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use blinkcheck_core::{ImageDimensions, ModelInput};
    use image::DynamicImage;

    fn input() -> ModelInput {
        ModelInput::from_image(&DynamicImage::new_rgb8(10, 10), 32).unwrap()
    }

    #[test]
    fn test_mock_detector_counts_calls() {
        let detector = MockFaceDetector::returning(vec![NormalizedBox::new(0.5, 0.5, 0.1, 0.1)]);
        let boxes = detector
            .detect(&input(), &DetectionParams::default())
            .unwrap();

        assert_eq!(boxes.len(), 1);
        assert_eq!(detector.call_count(), 1);
    }

    #[test]
    fn test_mock_classifier_script_then_fallback() {
        let classifier = MockEyeClassifier::scripted_with_fallback(
            vec![ScriptedClassification::Score(0.2)],
            0.7,
        );

        let first = classifier.classify(&input()).unwrap();
        assert_eq!(first.probabilities[OPEN_LABEL], 0.2);
        assert_eq!(first.top_label, CLOSED_LABEL);

        let second = classifier.classify(&input()).unwrap();
        assert_eq!(second.probabilities[OPEN_LABEL], 0.7);
        assert_eq!(classifier.call_count(), 2);
    }

    #[test]
    fn test_mock_classifier_missing_label() {
        let classifier =
            MockEyeClassifier::scripted(vec![ScriptedClassification::MissingOpenLabel]);
        let result = classifier.classify(&input()).unwrap();
        assert!(!result.probabilities.contains_key(OPEN_LABEL));
    }

    #[test]
    fn test_mock_report_output_captures() {
        let output = MockReportOutput::new();
        let report = PredictReport {
            path: "test.jpg".into(),
            timestamp: "2024-01-05T00:00:00Z".into(),
            dimensions: ImageDimensions::new(100, 100),
            faces: vec![],
        };

        output.write(&report).unwrap();
        output.flush().unwrap();

        assert_eq!(output.reports().len(), 1);
        assert_eq!(output.reports()[0].path, "test.jpg");
        assert_eq!(output.flush_count(), 1);
    }
}
