use crate::effects::domain::effect_kind::{EffectKind, StrategySet};
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::domain::face_effect::FaceEffect;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::PipelineConfig;
use crate::shared::frame::Frame;

use super::background_effect::BackgroundEffect;
use super::blur_effect::BlurEffect;
use super::edge_highlight_effect::EdgeHighlightEffect;
use super::pixelate_effect::PixelateEffect;
use super::recolor_effect::RecolorEffect;
use super::replace_effect::ReplaceEffect;

/// Builds the effect for `kind`, tuned from `config`.
pub fn create_effect(kind: EffectKind, config: &PipelineConfig) -> Box<dyn FaceEffect> {
    match kind {
        EffectKind::Blur => Box::new(BlurEffect::new(config.blur_kernel_size, config.blur_sigma)),
        EffectKind::ChangeBackground => Box::new(BackgroundEffect),
        EffectKind::Recolor => Box::new(RecolorEffect),
        EffectKind::Replace => Box::new(ReplaceEffect),
        EffectKind::HighlightEdges => {
            Box::new(EdgeHighlightEffect::new(config.canny_low, config.canny_high))
        }
        EffectKind::Pixelate => Box::new(PixelateEffect::new(config.pixel_tile)),
    }
}

/// One instance of every effect, held in canonical order.
pub struct EffectRegistry {
    effects: Vec<Box<dyn FaceEffect>>,
}

impl EffectRegistry {
    pub fn new(config: &PipelineConfig) -> Self {
        log::debug!(
            "Building effects (blur kernel={}, sigma={}, canny={}/{}, tile={})",
            config.blur_kernel_size,
            config.blur_sigma,
            config.canny_low,
            config.canny_high,
            config.pixel_tile
        );
        Self {
            effects: EffectKind::CANONICAL_ORDER
                .iter()
                .map(|&kind| create_effect(kind, config))
                .collect(),
        }
    }

    /// Applies the selected effects to `frame` in canonical order,
    /// whatever order `strategies` was built in.
    pub fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        strategies: &StrategySet,
        params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for effect in self.effects.iter().filter(|e| strategies.contains(e.kind())) {
            log::trace!("Applying {} to {} box(es)", effect.kind(), boxes.len());
            effect.apply(frame, boxes, params)?;
        }
        Ok(())
    }
}
