use image::imageops::FilterType;

use crate::effects::domain::effect_kind::EffectKind;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::domain::face_effect::FaceEffect;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::DEFAULT_PIXEL_TILE;
use crate::shared::frame::Frame;

use super::roi::rois_for;

/// Blocky pixelation: each region is shrunk to a small tile with bilinear
/// filtering, then blown back up with nearest-neighbour sampling.
pub struct PixelateEffect {
    tile: u32,
}

impl PixelateEffect {
    pub fn new(tile: u32) -> Self {
        Self { tile: tile.max(1) }
    }
}

impl Default for PixelateEffect {
    fn default() -> Self {
        Self::new(DEFAULT_PIXEL_TILE)
    }
}

impl FaceEffect for PixelateEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Pixelate
    }

    fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        _params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for rect in rois_for(frame, boxes) {
            let (w, h) = (rect.w as u32, rect.h as u32);
            // Never upsample a region that is already smaller than a tile.
            let small = frame
                .crop(&rect.to_box())
                .resized(self.tile.min(w), self.tile.min(h), FilterType::Triangle);
            let blocky = small.resized(w, h, FilterType::Nearest);
            frame.paste(&blocky, rect.x as u32, rect.y as u32);
        }
        Ok(())
    }
}
