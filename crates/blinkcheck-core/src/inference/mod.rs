//! Candle-backed execution of the two external model artifacts.
//!
//! The models are opaque, pre-trained safetensors weights; these wrappers
//! define just enough graph to run them and adapt their raw output to the
//! port traits.

mod blink;
mod device;
mod face_finder;
mod loader;
mod ops;

pub use blink::BlinkClassifier;
pub use device::select_device;
pub use face_finder::FaceFinder;
pub use loader::load_weights;
pub use ops::{sigmoid, softmax};
