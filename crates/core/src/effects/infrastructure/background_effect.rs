use image::imageops::FilterType;

use crate::effects::domain::effect_kind::EffectKind;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::domain::face_effect::FaceEffect;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::{Frame, CHANNELS};

use super::roi::rois_for;

/// Replaces everything outside the face boxes.
///
/// The fill is `params.background_image` resized to the frame when set,
/// else `params.background_color`. With neither, the frame is untouched.
pub struct BackgroundEffect;

/// Per-pixel mask, `true` where any box covers the pixel.
fn face_mask(frame: &Frame, boxes: &[BoundingBox]) -> Vec<bool> {
    let fw = frame.width() as usize;
    let mut mask = vec![false; fw * frame.height() as usize];
    for rect in rois_for(frame, boxes) {
        for y in rect.y..rect.y + rect.h {
            mask[y * fw + rect.x..y * fw + rect.x + rect.w].fill(true);
        }
    }
    mask
}

impl FaceEffect for BackgroundEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::ChangeBackground
    }

    fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if boxes.is_empty() {
            return Ok(());
        }
        let (w, h) = (frame.width(), frame.height());
        let background = match (&params.background_image, params.background_color) {
            (Some(image), _) if !image.is_empty() => image.resized(w, h, FilterType::Triangle),
            (_, Some(color)) => Frame::filled(w, h, color.0),
            _ => {
                log::debug!("No background set, skipping background change");
                return Ok(());
            }
        };

        let mask = face_mask(frame, boxes);
        let data = frame.data_mut();
        for (i, (px, bg)) in data
            .chunks_exact_mut(CHANNELS)
            .zip(background.data().chunks_exact(CHANNELS))
            .enumerate()
        {
            if !mask[i] {
                px.copy_from_slice(bg);
            }
        }
        Ok(())
    }
}
