//! Box geometry shared by the detector output and the crop stage.

use serde::{Deserialize, Serialize};

/// A detector box in normalized image coordinates.
///
/// `(x, y)` is the box *center* and `(w, h)` the full extent, all expressed
/// as fractions of the image dimensions in `[0, 1]`. Produced by the
/// detector; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl NormalizedBox {
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Converts the center-based box into an absolute pixel rectangle of an
    /// image with dimensions `width` x `height`.
    ///
    /// The result is not clamped: a box close to an image edge can produce a
    /// rectangle that leaves the frame. Callers decide what to do with such
    /// rectangles; the crop stage rejects them.
    #[must_use]
    pub fn to_pixel_rect(&self, width: f32, height: f32) -> PixelRect {
        PixelRect {
            left: width * (self.x - self.w / 2.0),
            top: height * (self.y - self.h / 2.0),
            width: width * self.w,
            height: height * self.h,
        }
    }
}

/// An absolute rectangle in the pixel space of a concrete image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    /// Right edge, `left + width`.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge, `top + height`.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// True if the rectangle has positive area and lies fully inside an
    /// image of the given dimensions.
    #[must_use]
    pub fn fits_within(&self, width: f32, height: f32) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.left >= 0.0
            && self.top >= 0.0
            && self.right() <= width
            && self.bottom() <= height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_box_to_pixel_rect() {
        let bbox = NormalizedBox::new(0.5, 0.5, 0.2, 0.3);
        let rect = bbox.to_pixel_rect(960.0, 960.0);

        assert!((rect.left - 384.0).abs() < 1e-3);
        assert!((rect.top - 336.0).abs() < 1e-3);
        assert!((rect.width - 192.0).abs() < 1e-3);
        assert!((rect.height - 288.0).abs() < 1e-3);
    }

    #[test]
    fn test_corner_conversion_round_trip() {
        // left + width must land on the right edge the center form implies.
        let dims = [(960.0, 960.0), (640.0, 480.0), (1.0, 1.0)];
        let boxes = [
            NormalizedBox::new(0.5, 0.5, 0.2, 0.3),
            NormalizedBox::new(0.1, 0.9, 0.05, 0.1),
            NormalizedBox::new(0.75, 0.25, 1.0, 1.0),
        ];

        for (w, h) in dims {
            for bbox in boxes {
                let rect = bbox.to_pixel_rect(w, h);
                assert!((rect.right() - w * (bbox.x + bbox.w / 2.0)).abs() < 1e-3);
                assert!((rect.bottom() - h * (bbox.y + bbox.h / 2.0)).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_edge_box_leaves_frame() {
        // A box hugging the left edge maps to a negative left coordinate.
        let bbox = NormalizedBox::new(0.05, 0.5, 0.2, 0.2);
        let rect = bbox.to_pixel_rect(100.0, 100.0);

        assert!(rect.left < 0.0);
        assert!(!rect.fits_within(100.0, 100.0));
    }

    #[test]
    fn test_fits_within() {
        let inside = PixelRect {
            left: 10.0,
            top: 10.0,
            width: 50.0,
            height: 50.0,
        };
        assert!(inside.fits_within(100.0, 100.0));

        let spills = PixelRect {
            left: 60.0,
            top: 10.0,
            width: 50.0,
            height: 50.0,
        };
        assert!(!spills.fits_within(100.0, 100.0));

        let degenerate = PixelRect {
            left: 10.0,
            top: 10.0,
            width: 0.0,
            height: 50.0,
        };
        assert!(!degenerate.fits_within(100.0, 100.0));
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let full = PixelRect {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 100.0,
        };
        assert!(full.fits_within(100.0, 100.0));
    }
}
