use image::{GrayImage, Luma};

use crate::effects::domain::effect_kind::EffectKind;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::domain::face_effect::FaceEffect;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{DEFAULT_CANNY_HIGH, DEFAULT_CANNY_LOW};
use crate::shared::frame::{Frame, CHANNELS};

use super::roi::rois_for;

/// Canny edges of the whole frame, drawn in `params.edge_color` on black,
/// kept only inside face boxes.
///
/// The output replaces the frame entirely; earlier effects do not show
/// through.
///
/// `imageproc`'s Canny smooths with a Gaussian (σ ≈ 1.4) and thresholds
/// the L2 gradient magnitude, so the low and high thresholds do not select
/// the same edges as an unsmoothed L1 Canny would.
pub struct EdgeHighlightEffect {
    low_threshold: f32,
    high_threshold: f32,
}

impl EdgeHighlightEffect {
    pub fn new(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            low_threshold,
            high_threshold,
        }
    }
}

impl Default for EdgeHighlightEffect {
    fn default() -> Self {
        Self::new(DEFAULT_CANNY_LOW, DEFAULT_CANNY_HIGH)
    }
}

/// BT.601 luma of a BGR frame.
fn grayscale(frame: &Frame) -> GrayImage {
    let mut gray = GrayImage::new(frame.width(), frame.height());
    for (dst, px) in gray.pixels_mut().zip(frame.data().chunks_exact(CHANNELS)) {
        let (b, g, r) = (px[0] as f32, px[1] as f32, px[2] as f32);
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        *dst = Luma([y.round().clamp(0.0, 255.0) as u8]);
    }
    gray
}

impl FaceEffect for EdgeHighlightEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::HighlightEdges
    }

    fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if boxes.is_empty() || frame.is_empty() {
            return Ok(());
        }
        let edges = imageproc::edges::canny(
            &grayscale(frame),
            self.low_threshold,
            self.high_threshold,
        );

        let mut canvas = Frame::filled(frame.width(), frame.height(), [0, 0, 0]).with_index(frame.index());
        for rect in rois_for(frame, boxes) {
            for y in rect.y..rect.y + rect.h {
                for x in rect.x..rect.x + rect.w {
                    if edges.get_pixel(x as u32, y as u32)[0] > 0 {
                        canvas.set_pixel(x as u32, y as u32, params.edge_color.0);
                    }
                }
            }
        }
        *frame = canvas;
        Ok(())
    }
}
