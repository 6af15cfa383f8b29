use image::imageops::FilterType;

use crate::detection::domain::detection_model::DetectionModel;
use crate::effects::domain::effect_kind::StrategySet;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::infrastructure::effect_factory::EffectRegistry;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::color::Bgr;
use crate::shared::config::PipelineConfig;
use crate::shared::face_gallery::FaceGallery;
use crate::shared::frame::Frame;

use super::frame_pipeline::PreparedFrame;

/// Turns suppressed detections into boxes, face crops and an annotated
/// image.
pub struct DetectionPostProcessor {
    confidence_threshold: f32,
    box_color: Bgr,
    line_thickness: u32,
    effects: EffectRegistry,
}

impl DetectionPostProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            box_color: config.box_color,
            line_thickness: config.line_thickness,
            effects: EffectRegistry::new(config),
        }
    }

    /// Processes one detector pass.
    ///
    /// Detections scoring strictly above the threshold each add one crop
    /// (taken from `original`, never from the annotated image) to `faces`
    /// and one box to the result, in matching order. Boxes are drawn and
    /// effects applied on the working frame, which is then resized back to
    /// the original size. Returned boxes are in original-image pixels.
    pub fn apply(
        &self,
        model: &dyn DetectionModel,
        prepared: PreparedFrame,
        original: &Frame,
        faces: &mut FaceGallery,
        strategies: &StrategySet,
        params: &EffectParameters,
    ) -> Result<(Vec<BoundingBox>, Frame), Box<dyn std::error::Error>> {
        let PreparedFrame {
            detections,
            mut working,
            tensor_shape,
            original_size,
        } = prepared;
        let tensor_hw = (tensor_shape[2] as u32, tensor_shape[3] as u32);
        let (work_w, work_h) = (working.width(), working.height());
        let (orig_h, orig_w) = original_size;
        let sx = orig_w as f64 / work_w.max(1) as f64;
        let sy = orig_h as f64 / work_h.max(1) as f64;

        let mut working_boxes = Vec::new();
        let mut boxes = Vec::new();

        for batch in &detections {
            if batch.is_empty() {
                continue;
            }
            for det in batch.iter().rev() {
                if det.confidence <= self.confidence_threshold {
                    continue;
                }
                let corners = model.scale_coords(tensor_hw, det.bbox, (work_h, work_w));
                let bbox = BoundingBox::from_corners(corners).clamped(work_w, work_h);
                let original_box = bbox.scaled(sx, sy).clamped(orig_w, orig_h);
                if bbox.is_degenerate() || original_box.is_degenerate() {
                    log::debug!("Skipping degenerate detection {:?} -> {bbox:?}", det.bbox);
                    continue;
                }

                faces.push(original.crop(&original_box));

                let label = format!("{} {:.2}", class_label(model, det.class_id), det.confidence);
                model.draw_box(
                    &mut working,
                    &bbox,
                    Some(&label),
                    self.box_color,
                    self.line_thickness,
                );

                working_boxes.push(bbox);
                boxes.push(original_box);
            }

            self.effects
                .apply(&mut working, &working_boxes, strategies, params)?;
        }

        let annotated = working
            .resized(orig_w, orig_h, FilterType::Triangle)
            .with_index(original.index());
        Ok((boxes, annotated))
    }
}

fn class_label(model: &dyn DetectionModel, class_id: usize) -> String {
    model
        .class_names()
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| class_id.to_string())
}
