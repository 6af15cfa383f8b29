use image::imageops::FilterType;

use crate::effects::domain::effect_kind::EffectKind;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::domain::face_effect::FaceEffect;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::roi::rois_for;

/// Pastes `params.replacement`, stretched to fit, over every face box.
pub struct ReplaceEffect;

impl FaceEffect for ReplaceEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Replace
    }

    fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(replacement) = params.replacement.as_ref().filter(|r| !r.is_empty()) else {
            log::debug!("No replacement image set, skipping face replacement");
            return Ok(());
        };

        for rect in rois_for(frame, boxes) {
            let patch = replacement.resized(rect.w as u32, rect.h as u32, FilterType::Triangle);
            frame.paste(&patch, rect.x as u32, rect.y as u32);
        }
        Ok(())
    }
}
