//! Weight loading for the externally supplied model artifacts.

use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use tracing::debug;

/// Reads a safetensors file into a [`VarBuilder`] on the given device.
///
/// Loading happens eagerly, once, when a model is constructed at startup; a
/// bad artifact surfaces here instead of mid-pipeline.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid safetensors data.
pub fn load_weights(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    debug!("loading weights from {}", path.display());

    let data = std::fs::read(path)
        .with_context(|| format!("failed to read model file: {}", path.display()))?;

    VarBuilder::from_buffered_safetensors(data, DType::F32, device)
        .with_context(|| format!("failed to parse safetensors: {}", path.display()))
}
