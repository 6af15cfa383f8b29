use crate::effects::domain::effect_kind::EffectKind;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for a cosmetic transform applied to face regions.
///
/// Implementations modify the frame in place. An empty `boxes` slice must
/// leave the frame untouched, and boxes that cover no pixels are skipped.
/// A missing parameter the effect depends on makes it a no-op, not an error.
pub trait FaceEffect: Send {
    fn kind(&self) -> EffectKind;

    fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
