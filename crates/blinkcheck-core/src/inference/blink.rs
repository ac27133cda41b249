//! Candle wrapper executing the external eye-state weights.
//!
//! A compact convolutional classifier over RGB face crops producing an
//! open/closed probability distribution plus the winning label.

use std::collections::HashMap;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

use super::ops::softmax;
use crate::domain::ModelInput;
use crate::ports::{EyeClassification, EyeClassifier, CLOSED_LABEL, OPEN_LABEL};

/// Input side length the classifier expects.
pub const INPUT_SIZE: u32 = 128;

/// Class labels in logit order.
const LABELS: [&str; 2] = [CLOSED_LABEL, OPEN_LABEL];

/// Eye-state classifier model wrapper.
pub struct BlinkClassifier {
    convs: Vec<Conv2d>,
    fc1: Linear,
    fc2: Linear,
    device: Device,
}

impl BlinkClassifier {
    /// Builds the graph from externally supplied weights.
    ///
    /// # Errors
    ///
    /// Returns an error if any expected tensor is missing or malformed.
    pub fn new(vb: &VarBuilder) -> Result<Self> {
        let device = vb.device().clone();

        // Four conv+pool blocks: 128 -> 64 -> 32 -> 16 -> 8.
        let channels = [(3, 16), (16, 32), (32, 64), (64, 64)];
        let mut convs = Vec::with_capacity(channels.len());
        for (i, (in_c, out_c)) in channels.iter().enumerate() {
            convs.push(conv2d(
                *in_c,
                *out_c,
                3,
                Conv2dConfig {
                    padding: 1,
                    ..Conv2dConfig::default()
                },
                vb.pp(format!("conv{i}")),
            )?);
        }

        // 64 channels over an 8x8 map after four 2x2 pools.
        let fc1 = linear(64 * 8 * 8, 128, vb.pp("fc1"))?;
        let fc2 = linear(128, LABELS.len(), vb.pp("fc2"))?;

        Ok(Self {
            convs,
            fc1,
            fc2,
            device,
        })
    }

    /// Converts the input buffer into a `(1, 3, S, S)` tensor in `[0, 1]`.
    fn preprocess(&self, input: &ModelInput) -> Result<Tensor> {
        anyhow::ensure!(
            input.size() == INPUT_SIZE,
            "classifier expects a {INPUT_SIZE}x{INPUT_SIZE} buffer, got {}",
            input.size()
        );

        let size = input.size() as usize;
        let data: Vec<f32> = input
            .pixels()
            .pixels()
            .flat_map(|p| {
                [
                    f32::from(p[0]) / 255.0,
                    f32::from(p[1]) / 255.0,
                    f32::from(p[2]) / 255.0,
                ]
            })
            .collect();

        let tensor = Tensor::from_vec(data, (1, size, size, 3), &self.device)?;
        tensor
            .permute((0, 3, 1, 2))?
            .to_dtype(DType::F32)
            .context("failed to build classifier input tensor")
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let mut h = x.clone();
        for conv in &self.convs {
            h = conv.forward(&h)?.relu()?.max_pool2d(2)?;
        }

        let h = h.flatten_from(1)?;
        let h = self.fc1.forward(&h)?.relu()?;
        Ok(self.fc2.forward(&h)?)
    }
}

impl EyeClassifier for BlinkClassifier {
    fn input_size(&self) -> u32 {
        INPUT_SIZE
    }

    fn classify(&self, input: &ModelInput) -> Result<EyeClassification> {
        let x = self.preprocess(input)?;
        let logits = self.forward(&x)?.squeeze(0)?.to_vec1::<f32>()?;
        let probs = softmax(&logits);

        let probabilities: HashMap<String, f32> = LABELS
            .iter()
            .map(|label| (*label).to_string())
            .zip(probs.iter().copied())
            .collect();

        let top_label = LABELS
            .iter()
            .zip(&probs)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map_or(OPEN_LABEL, |(label, _)| *label)
            .to_string();

        Ok(EyeClassification {
            top_label,
            probabilities,
        })
    }
}
