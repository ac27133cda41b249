//! Candle wrapper executing the external face detection weights.
//!
//! A single-scale anchor detector: a strided convolutional backbone reduces
//! the input to a 12x12 grid, and two 1x1 heads score and regress a fixed
//! set of anchors per cell. Decoded boxes are center-based and normalized,
//! which is exactly the form the crop stage consumes.

// Allow common ML code patterns
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};

use super::ops::sigmoid;
use crate::domain::{ModelInput, NormalizedBox};
use crate::ports::{DetectionParams, FaceDetector};

/// Input side length the detector expects.
pub const INPUT_SIZE: u32 = 192;

/// Grid resolution of the detection head.
const GRID: usize = 12;
/// Anchors per grid cell.
const ANCHORS_PER_CELL: usize = 2;
/// Total anchor count.
const NUM_ANCHORS: usize = GRID * GRID * ANCHORS_PER_CELL;

/// Face detection model wrapper.
pub struct FaceFinder {
    backbone: Vec<Conv2d>,
    head_score: Conv2d,
    head_box: Conv2d,
    anchors: Vec<[f32; 2]>,
    device: Device,
}

impl FaceFinder {
    /// Builds the graph from externally supplied weights.
    ///
    /// # Errors
    ///
    /// Returns an error if any expected tensor is missing or malformed.
    pub fn new(vb: &VarBuilder) -> Result<Self> {
        let device = vb.device().clone();

        // Four stride-2 stages: 192 -> 96 -> 48 -> 24 -> 12.
        let stages = [(3, 16), (16, 32), (32, 48), (48, 64)];

        let mut backbone = Vec::with_capacity(stages.len());
        for (i, (in_c, out_c)) in stages.iter().enumerate() {
            let layer = conv2d(
                *in_c,
                *out_c,
                3,
                Conv2dConfig {
                    stride: 2,
                    padding: 1,
                    ..Conv2dConfig::default()
                },
                vb.pp(format!("backbone.{i}")),
            )?;
            backbone.push(layer);
        }

        let head_score = conv2d(
            64,
            ANCHORS_PER_CELL,
            1,
            Conv2dConfig::default(),
            vb.pp("head.score"),
        )?;
        let head_box = conv2d(
            64,
            ANCHORS_PER_CELL * 4,
            1,
            Conv2dConfig::default(),
            vb.pp("head.box"),
        )?;

        Ok(Self {
            backbone,
            head_score,
            head_box,
            anchors: cell_anchors(),
            device,
        })
    }

    /// Converts the input buffer into a `(1, 3, S, S)` tensor in `[-1, 1]`.
    fn preprocess(&self, input: &ModelInput) -> Result<Tensor> {
        anyhow::ensure!(
            input.size() == INPUT_SIZE,
            "detector expects a {INPUT_SIZE}x{INPUT_SIZE} buffer, got {}",
            input.size()
        );

        let size = input.size() as usize;
        let data: Vec<f32> = input
            .pixels()
            .pixels()
            .flat_map(|p| {
                [
                    (f32::from(p[0]) / 127.5) - 1.0,
                    (f32::from(p[1]) / 127.5) - 1.0,
                    (f32::from(p[2]) / 127.5) - 1.0,
                ]
            })
            .collect();

        let tensor = Tensor::from_vec(data, (1, size, size, 3), &self.device)?;
        tensor
            .permute((0, 3, 1, 2))?
            .to_dtype(DType::F32)
            .context("failed to build detector input tensor")
    }

    fn forward(&self, x: &Tensor) -> Result<(Tensor, Tensor)> {
        let mut h = x.clone();
        for layer in &self.backbone {
            h = layer.forward(&h)?.relu()?;
        }

        let scores = self
            .head_score
            .forward(&h)?
            .permute((0, 2, 3, 1))?
            .reshape((NUM_ANCHORS, 1))?;
        let boxes = self
            .head_box
            .forward(&h)?
            .permute((0, 2, 3, 1))?
            .reshape((NUM_ANCHORS, 4))?;

        Ok((scores, boxes))
    }

    /// Decodes raw head output into scored candidate boxes.
    fn decode(
        &self,
        scores: &Tensor,
        boxes: &Tensor,
        params: &DetectionParams,
    ) -> Result<Vec<(f32, NormalizedBox)>> {
        let scores = scores.to_vec2::<f32>()?;
        let boxes = boxes.to_vec2::<f32>()?;
        let input = INPUT_SIZE as f32;

        let mut candidates = Vec::new();
        for i in 0..NUM_ANCHORS {
            let score = sigmoid(scores[i][0]);
            if score < params.confidence_threshold {
                continue;
            }

            let [anchor_x, anchor_y] = self.anchors[i];
            let reg = &boxes[i];
            let bbox = NormalizedBox::new(
                (anchor_x + reg[0] / input).clamp(0.0, 1.0),
                (anchor_y + reg[1] / input).clamp(0.0, 1.0),
                (reg[2] / input).clamp(0.0, 1.0),
                (reg[3] / input).clamp(0.0, 1.0),
            );
            candidates.push((score, bbox));
        }

        Ok(candidates)
    }
}

impl FaceDetector for FaceFinder {
    fn input_size(&self) -> u32 {
        INPUT_SIZE
    }

    fn detect(
        &self,
        input: &ModelInput,
        params: &DetectionParams,
    ) -> Result<Vec<NormalizedBox>> {
        let x = self.preprocess(input)?;
        let (scores, boxes) = self.forward(&x)?;
        let candidates = self.decode(&scores, &boxes, params)?;
        Ok(non_max_suppression(candidates, params.iou_threshold))
    }
}

/// Cell-center anchors for the detection grid.
fn cell_anchors() -> Vec<[f32; 2]> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);
    for y in 0..GRID {
        for x in 0..GRID {
            for _ in 0..ANCHORS_PER_CELL {
                anchors.push([
                    (x as f32 + 0.5) / GRID as f32,
                    (y as f32 + 0.5) / GRID as f32,
                ]);
            }
        }
    }
    anchors
}

/// Greedy non-maximum suppression over scored center boxes.
///
/// Returns the surviving boxes ordered by descending score.
fn non_max_suppression(
    mut candidates: Vec<(f32, NormalizedBox)>,
    iou_threshold: f32,
) -> Vec<NormalizedBox> {
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut keep: Vec<NormalizedBox> = Vec::new();
    'candidates: for (_, candidate) in candidates {
        for kept in &keep {
            if iou(kept, &candidate) >= iou_threshold {
                continue 'candidates;
            }
        }
        keep.push(candidate);
    }
    keep
}

/// Intersection over union of two center-based normalized boxes.
fn iou(a: &NormalizedBox, b: &NormalizedBox) -> f32 {
    let (a_left, a_top, a_right, a_bottom) = corners(a);
    let (b_left, b_top, b_right, b_bottom) = corners(b);

    let left = a_left.max(b_left);
    let top = a_top.max(b_top);
    let right = a_right.min(b_right);
    let bottom = a_bottom.min(b_bottom);

    let intersection = (right - left).max(0.0) * (bottom - top).max(0.0);
    let union = a.w * a.h + b.w * b.h - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

fn corners(bbox: &NormalizedBox) -> (f32, f32, f32, f32) {
    (
        bbox.x - bbox.w / 2.0,
        bbox.y - bbox.h / 2.0,
        bbox.x + bbox.w / 2.0,
        bbox.y + bbox.h / 2.0,
    )
}
