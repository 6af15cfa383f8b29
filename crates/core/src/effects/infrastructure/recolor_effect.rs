use crate::effects::domain::effect_kind::EffectKind;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::domain::face_effect::FaceEffect;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::color::{bgr_to_hsv, hsv_to_bgr};
use crate::shared::frame::{Frame, CHANNELS};

use super::roi::rois_for;

/// Tints each face region with `params.face_color`.
///
/// Hue and saturation come from the target color, value (brightness) is
/// kept from the original pixel so shading survives.
pub struct RecolorEffect;

impl FaceEffect for RecolorEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Recolor
    }

    fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let [target_h, target_s, _] = params.face_color.to_hsv();
        let rects = rois_for(frame, boxes);
        let fw = frame.width() as usize;
        let data = frame.data_mut();

        for rect in rects {
            for y in rect.y..rect.y + rect.h {
                let row = (y * fw + rect.x) * CHANNELS;
                for px in data[row..row + rect.w * CHANNELS].chunks_exact_mut(CHANNELS) {
                    let [_, _, v] = bgr_to_hsv([px[0], px[1], px[2]]);
                    px.copy_from_slice(&hsv_to_bgr([target_h, target_s, v]));
                }
            }
        }
        Ok(())
    }
}
