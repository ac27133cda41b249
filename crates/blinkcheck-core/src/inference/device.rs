//! Inference device selection.

use candle_core::Device;
use tracing::info;

/// Picks the best available device for inference.
///
/// Prefers Metal or CUDA when the corresponding feature is enabled and the
/// device initializes, falling back to CPU.
#[must_use]
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    if let Ok(device) = Device::new_metal(0) {
        info!("using Metal device for inference");
        return device;
    }

    #[cfg(feature = "cuda")]
    if let Ok(device) = Device::new_cuda(0) {
        info!("using CUDA device for inference");
        return device;
    }

    info!("using CPU for inference");
    Device::Cpu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_device_never_panics() {
        let _device = select_device();
    }
}
