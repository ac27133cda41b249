//! blinkcheck adapters - everything that touches the outside world.
//!
//! This crate provides adapters for:
//! - Filesystem image loading (with EXIF orientation)
//! - Model weight downloading and caching
//! - Overlay rendering of annotated boxes

pub mod fs;
pub mod models;
pub mod overlay;

pub use fs::{load_image, sample_image};
pub use models::{model_path, models_dir, set_models_dir};
pub use overlay::Overlay;
