//! Overlay renderer: annotated boxes drawn back onto the source image.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use blinkcheck_core::AnnotatedBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

/// Score above which a box is rendered with the open-eyes treatment.
pub const OPEN_SCORE_THRESHOLD: f32 = 0.4;

const OPEN_COLOR: Rgb<u8> = Rgb([40, 200, 60]);
const CLOSED_COLOR: Rgb<u8> = Rgb([220, 50, 40]);
const NEUTRAL_COLOR: Rgb<u8> = Rgb([160, 160, 160]);
const BORDER_THICKNESS: i32 = 2;
const LABEL_FONT_SIZE: f32 = 18.0;

/// Draws annotated boxes and score labels onto an image.
///
/// Score labels need a font file; without one only the rectangles are drawn,
/// with the color still encoding the classification outcome.
pub struct Overlay {
    font: Option<FontVec>,
}

impl Overlay {
    #[must_use]
    pub const fn new() -> Self {
        Self { font: None }
    }

    /// Loads a TTF/OTF font used for score labels.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed as a font.
    pub fn with_font_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font: {}", path.display()))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|e| anyhow::anyhow!("failed to parse font {}: {e}", path.display()))?;
        Ok(Self { font: Some(font) })
    }

    /// Draws every box onto `image`, in order.
    pub fn draw(&self, image: &mut RgbImage, faces: &[AnnotatedBox]) {
        for face in faces {
            self.draw_box(image, face);
        }
    }

    /// Draws one box, clamped to the frame for display.
    ///
    /// Clamping here is cosmetic only; classification already ran on the
    /// unclamped crop. A box with no visible area is skipped.
    fn draw_box(&self, image: &mut RgbImage, face: &AnnotatedBox) {
        #[allow(clippy::cast_precision_loss)]
        let (width, height) = (image.width() as f32, image.height() as f32);
        let rect = face.bbox.to_pixel_rect(width, height);

        let left = rect.left.max(0.0);
        let top = rect.top.max(0.0);
        let right = rect.right().min(width);
        let bottom = rect.bottom().min(height);
        if right - left < 1.0 || bottom - top < 1.0 {
            return;
        }

        let color = score_color(face.score);

        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = (left as i32, top as i32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (box_w, box_h) = ((right - left) as u32, (bottom - top) as u32);

        for t in 0..BORDER_THICKNESS {
            #[allow(clippy::cast_sign_loss)]
            let inset = (2 * t) as u32;
            let (inner_w, inner_h) = (box_w.saturating_sub(inset), box_h.saturating_sub(inset));
            if inner_w == 0 || inner_h == 0 {
                break;
            }
            draw_hollow_rect_mut(image, Rect::at(x + t, y + t).of_size(inner_w, inner_h), color);
        }

        if let Some(ref font) = self.font {
            let label = face
                .score
                .map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}"));
            #[allow(clippy::cast_possible_truncation)]
            let label_y = (y - LABEL_FONT_SIZE as i32).max(0);
            draw_text_mut(
                image,
                color,
                x,
                label_y,
                PxScale::from(LABEL_FONT_SIZE),
                font,
                &label,
            );
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a score onto the fixed render color scheme: above the threshold is
/// the open treatment, at or below is closed, absent is neutral.
#[must_use]
pub fn score_color(score: Option<f32>) -> Rgb<u8> {
    match score {
        Some(s) if s > OPEN_SCORE_THRESHOLD => OPEN_COLOR,
        Some(_) => CLOSED_COLOR,
        None => NEUTRAL_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blinkcheck_core::NormalizedBox;

    #[test]
    fn test_score_color_treatments() {
        assert_eq!(score_color(Some(0.9)), OPEN_COLOR);
        assert_eq!(score_color(Some(0.41)), OPEN_COLOR);
        assert_eq!(score_color(Some(0.4)), CLOSED_COLOR);
        assert_eq!(score_color(Some(0.1)), CLOSED_COLOR);
        assert_eq!(score_color(None), NEUTRAL_COLOR);
    }

    #[test]
    fn test_draw_marks_border_pixels() {
        let mut canvas = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        let face = AnnotatedBox::new(NormalizedBox::new(0.5, 0.5, 0.5, 0.5), Some(0.9));

        Overlay::new().draw(&mut canvas, &[face]);

        // Border of the 32x32 centered box starts at (16, 16).
        assert_eq!(*canvas.get_pixel(16, 16), OPEN_COLOR);
        // Center stays untouched.
        assert_eq!(*canvas.get_pixel(32, 32), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_clamps_edge_box_for_display() {
        let mut canvas = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        // Center close to the left edge, box spills out of frame.
        let face = AnnotatedBox::new(NormalizedBox::new(0.05, 0.5, 0.4, 0.4), None);

        Overlay::new().draw(&mut canvas, &[face]);

        // Clamped to x = 0; the visible part of the border is drawn.
        assert_eq!(*canvas.get_pixel(0, 32), NEUTRAL_COLOR);
    }

    #[test]
    fn test_draw_skips_invisible_box() {
        let mut canvas = RgbImage::from_pixel(32, 32, Rgb([7, 7, 7]));
        let face = AnnotatedBox::new(NormalizedBox::new(2.0, 2.0, 0.1, 0.1), Some(0.5));

        Overlay::new().draw(&mut canvas, &[face]);

        assert!(canvas.pixels().all(|p| *p == Rgb([7, 7, 7])));
    }
}
