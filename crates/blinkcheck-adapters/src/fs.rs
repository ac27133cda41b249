//! Filesystem adapter: image decoding with EXIF orientation applied.

use std::path::Path;

use anyhow::{Context, Result};
use blinkcheck_core::SourceImage;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::debug;

/// Raster formats the predict command accepts.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif"];

/// Loads and decodes an image, applying its EXIF orientation.
///
/// Orientation is applied once here so that every downstream crop and the
/// overlay inherit it. A load failure aborts the predict action before any
/// detection happens.
///
/// # Errors
///
/// Fails if the extension is unsupported or the file cannot be decoded.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    anyhow::ensure!(
        is_supported_image(path),
        "unsupported image type: {}",
        path.display()
    );

    let image = image::open(path)
        .with_context(|| format!("failed to open image: {}", path.display()))?;

    let image = match read_orientation(path) {
        Some(orientation) if orientation > 1 => {
            debug!("applying EXIF orientation {orientation}");
            apply_orientation(image, orientation)
        }
        _ => image,
    };

    Ok(SourceImage::new(path.to_string_lossy(), image))
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Reads the EXIF orientation tag, if any.
fn read_orientation(path: &Path) -> Option<u32> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = std::io::BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

/// Maps an EXIF orientation value onto the matching rotation/flip.
fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// The built-in demo scene used when no image path is given.
///
/// Deterministic stand-in for a bundled photo asset: a light backdrop with
/// two darker face-sized patches.
#[must_use]
pub fn sample_image() -> SourceImage {
    #[allow(clippy::cast_possible_truncation)]
    let image = RgbImage::from_fn(480, 480, |x, y| {
        let base = 200u8.saturating_sub((y / 8) as u8);
        if in_patch(x, y, 120, 180) || in_patch(x, y, 330, 200) {
            Rgb([90, 70, 60])
        } else {
            Rgb([base, base, base.saturating_add(20)])
        }
    });

    SourceImage::new("builtin://sample", DynamicImage::ImageRgb8(image))
}

fn in_patch(x: u32, y: u32, cx: u32, cy: u32) -> bool {
    x.abs_diff(cx) < 40 && y.abs_diff(cy) < 52
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("face.jpg")));
        assert!(is_supported_image(Path::new("face.JPEG")));
        assert!(is_supported_image(Path::new("face.png")));
        assert!(!is_supported_image(Path::new("face.txt")));
        assert!(!is_supported_image(Path::new("face")));
    }

    #[test]
    fn test_load_image_missing_file() {
        assert!(load_image(Path::new("/nonexistent/face.jpg")).is_err());
    }

    #[test]
    fn test_load_image_unsupported_extension() {
        let result = load_image(Path::new("/tmp/whatever.xyz"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_image_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("gray.png");
        RgbImage::from_pixel(12, 8, Rgb([40, 50, 60]))
            .save(&path)
            .expect("save");

        let source = load_image(&path).expect("load");
        assert_eq!((source.width, source.height), (12, 8));
    }

    #[test]
    fn test_apply_orientation_rotate180() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let rotated = apply_orientation(DynamicImage::ImageRgb8(img), 3).to_rgb8();
        assert_eq!(rotated.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(rotated.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 2));
        let rotated = apply_orientation(img, 6);
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
    }

    #[test]
    fn test_sample_image_is_deterministic() {
        let a = sample_image();
        let b = sample_image();

        assert_eq!(a.path, "builtin://sample");
        assert_eq!((a.width, a.height), (480, 480));
        assert_eq!(a.image.to_rgb8().as_raw(), b.image.to_rgb8().as_raw());
    }
}
