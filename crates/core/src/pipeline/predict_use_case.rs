use std::time::Instant;

use crate::detection::domain::detection_model::DetectionModel;
use crate::effects::domain::effect_kind::StrategySet;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::PipelineConfig;
use crate::shared::face_gallery::FaceGallery;
use crate::shared::frame::Frame;

use super::frame_pipeline::process_image;
use super::pipeline_logger::{PipelineLogger, METRIC_FACES, STAGE_POSTPROCESS};
use super::post_processor::DetectionPostProcessor;

/// Result of one prediction.
#[derive(Clone, Debug)]
pub struct Prediction {
    /// Face boxes in input-image pixels, one per new gallery entry.
    pub boxes: Vec<BoundingBox>,
    /// The input with boxes drawn and effects applied, same size as the input.
    pub image: Frame,
    /// Gallery length before this prediction added its crops.
    pub first_face: usize,
}

impl Prediction {
    /// The crops this prediction appended to `gallery`.
    pub fn faces<'a>(&self, gallery: &'a FaceGallery) -> &'a [Frame] {
        gallery.since(self.first_face)
    }
}

/// Detect faces, crop them, annotate and apply the selected effects.
///
/// One instance per session: the detector is loaded once and reused for
/// every image or frame.
pub struct PredictUseCase {
    model: Box<dyn DetectionModel>,
    post_processor: DetectionPostProcessor,
    input_rgb: bool,
    logger: Box<dyn PipelineLogger>,
}

impl PredictUseCase {
    pub fn new(
        model: Box<dyn DetectionModel>,
        config: &PipelineConfig,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            model,
            post_processor: DetectionPostProcessor::new(config),
            input_rgb: config.input_rgb,
            logger,
        }
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    pub fn logger_mut(&mut self) -> &mut dyn PipelineLogger {
        self.logger.as_mut()
    }

    /// Runs the full pipeline on one image.
    ///
    /// Returns `Ok(None)` when there is no image. New face crops are
    /// appended to `faces`; existing entries are left alone.
    pub fn predict(
        &mut self,
        image: Option<&Frame>,
        faces: &mut FaceGallery,
        strategies: &StrategySet,
        params: &EffectParameters,
    ) -> Result<Option<Prediction>, Box<dyn std::error::Error>> {
        let Some(image) = image.filter(|i| !i.is_empty()) else {
            log::warn!("Could not read image, skipping prediction");
            return Ok(None);
        };

        let prepared = process_image(image, self.model.as_mut(), self.input_rgb, self.logger.as_mut())?;

        let t0 = Instant::now();
        let first_face = faces.len();
        let (boxes, annotated) = self.post_processor.apply(
            self.model.as_ref(),
            prepared,
            image,
            faces,
            strategies,
            params,
        )?;
        self.logger
            .timing(STAGE_POSTPROCESS, t0.elapsed().as_secs_f64() * 1000.0);
        self.logger.metric(METRIC_FACES, boxes.len() as f64);

        Ok(Some(Prediction {
            boxes,
            image: annotated,
            first_face,
        }))
    }

    /// Streaming variant: returns the annotated frame, or the input
    /// unchanged when prediction yields nothing or fails.
    pub fn process_frame(
        &mut self,
        frame: Frame,
        faces: &mut FaceGallery,
        strategies: &StrategySet,
        params: &EffectParameters,
    ) -> Frame {
        match self.predict(Some(&frame), faces, strategies, params) {
            Ok(Some(prediction)) => prediction.image,
            Ok(None) => frame,
            Err(e) => {
                log::error!("Frame {} failed: {e}", frame.index());
                frame
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::raw_predictions::RawPredictions;
    use crate::effects::domain::effect_kind::EffectKind;
    use crate::pipeline::pipeline_logger::{
        NullPipelineLogger, StdoutPipelineLogger, STAGE_INFERENCE, STAGE_PREPROCESS,
    };
    use crate::shared::bounding_box::Detection;
    use ndarray::Array4;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubModel {
        detections: Vec<Detection>,
        fail: bool,
        names: Vec<String>,
    }

    impl StubModel {
        fn new(detections: Vec<Detection>) -> Self {
            Self {
                detections,
                fail: false,
                names: vec!["face".into()],
            }
        }
    }

    impl DetectionModel for StubModel {
        fn stride(&self) -> u32 {
            32
        }

        fn class_names(&self) -> &[String] {
            &self.names
        }

        fn infer(&mut self, _: Array4<f32>) -> Result<RawPredictions, Box<dyn std::error::Error>> {
            if self.fail {
                return Err("inference failed".into());
            }
            Ok(RawPredictions::new(ndarray::Array3::zeros((1, 0, 6))))
        }

        fn suppress(&self, _: &RawPredictions) -> Vec<Vec<Detection>> {
            vec![self.detections.clone()]
        }
    }

    /// Shares its recorded events with the test after being boxed.
    struct RecordingLogger {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, _current: usize, _total: usize) {}

        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.events.lock().unwrap().push(stage.to_string());
        }

        fn metric(&mut self, name: &str, value: f64) {
            self.events.lock().unwrap().push(format!("{name}={value}"));
        }
    }

    // --- Helpers ---

    fn det(bbox: [f32; 4], confidence: f32) -> Detection {
        Detection {
            bbox,
            confidence,
            class_id: 0,
        }
    }

    fn use_case(model: StubModel) -> PredictUseCase {
        PredictUseCase::new(
            Box::new(model),
            &PipelineConfig::default(),
            Box::new(NullPipelineLogger),
        )
    }

    // --- Tests ---

    #[test]
    fn test_missing_image_returns_none() {
        let mut uc = use_case(StubModel::new(vec![det([0.0, 0.0, 10.0, 10.0], 0.9)]));
        let mut faces = FaceGallery::new();
        let result = uc
            .predict(None, &mut faces, &StrategySet::new(), &EffectParameters::default())
            .unwrap();
        assert!(result.is_none());
        assert!(faces.is_empty());
    }

    #[test]
    fn test_prediction_reports_new_faces() {
        let mut uc = use_case(StubModel::new(vec![
            det([0.0, 0.0, 16.0, 16.0], 0.9),
            det([32.0, 32.0, 48.0, 48.0], 0.3),
        ]));
        let mut faces = FaceGallery::new();
        faces.push(Frame::filled(2, 2, [0, 0, 0]));

        let image = Frame::filled(64, 64, [40, 40, 40]);
        let prediction = uc
            .predict(Some(&image), &mut faces, &StrategySet::new(), &EffectParameters::default())
            .unwrap()
            .unwrap();

        assert_eq!(prediction.boxes, vec![BoundingBox::new(0, 0, 16, 16)]);
        assert_eq!(prediction.first_face, 1);
        assert_eq!(prediction.faces(&faces).len(), 1);
        assert_eq!(prediction.image.size(), image.size());
    }

    #[test]
    fn test_output_keeps_input_size_when_not_aligned() {
        let mut uc = use_case(StubModel::new(vec![det([4.0, 4.0, 20.0, 20.0], 0.9)]));
        let mut faces = FaceGallery::new();
        let image = Frame::filled(101, 77, [10, 20, 30]);
        let strategies: StrategySet = [EffectKind::Blur, EffectKind::Pixelate].into_iter().collect();
        let prediction = uc
            .predict(Some(&image), &mut faces, &strategies, &EffectParameters::default())
            .unwrap()
            .unwrap();
        assert_eq!(prediction.image.size(), (77, 101));
        assert_eq!(faces.len(), 1);
    }

    #[test]
    fn test_logs_stage_timings_and_face_count() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut uc = PredictUseCase::new(
            Box::new(StubModel::new(vec![det([0.0, 0.0, 16.0, 16.0], 0.9)])),
            &PipelineConfig::default(),
            Box::new(RecordingLogger {
                events: events.clone(),
            }),
        );
        let mut faces = FaceGallery::new();
        uc.predict(
            Some(&Frame::filled(64, 64, [0, 0, 0])),
            &mut faces,
            &StrategySet::new(),
            &EffectParameters::default(),
        )
        .unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                STAGE_PREPROCESS.to_string(),
                STAGE_INFERENCE.to_string(),
                STAGE_POSTPROCESS.to_string(),
                "faces=1".to_string(),
            ]
        );
    }

    #[test]
    fn test_inference_error_propagates() {
        let mut model = StubModel::new(Vec::new());
        model.fail = true;
        let mut uc = use_case(model);
        let mut faces = FaceGallery::new();
        let result = uc.predict(
            Some(&Frame::filled(32, 32, [0, 0, 0])),
            &mut faces,
            &StrategySet::new(),
            &EffectParameters::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_process_frame_passes_through_on_failure() {
        let mut model = StubModel::new(Vec::new());
        model.fail = true;
        let mut uc = use_case(model);
        let mut faces = FaceGallery::new();
        let frame = Frame::filled(32, 32, [5, 6, 7]).with_index(42);
        let out = uc.process_frame(
            frame.clone(),
            &mut faces,
            &StrategySet::new(),
            &EffectParameters::default(),
        );
        assert_eq!(out, frame);
    }

    #[test]
    fn test_process_frame_keeps_index() {
        let mut uc = use_case(StubModel::new(vec![det([0.0, 0.0, 16.0, 16.0], 0.9)]));
        let mut faces = FaceGallery::new();
        let out = uc.process_frame(
            Frame::filled(64, 64, [0, 0, 0]).with_index(7),
            &mut faces,
            &StrategySet::new(),
            &EffectParameters::default(),
        );
        assert_eq!(out.index(), 7);
        assert_eq!(faces.len(), 1);
    }

    #[test]
    fn test_stdout_logger_collects_through_use_case() {
        let mut uc = PredictUseCase::new(
            Box::new(StubModel::new(Vec::new())),
            &PipelineConfig::default(),
            Box::new(StdoutPipelineLogger::new(1)),
        );
        let mut faces = FaceGallery::new();
        for _ in 0..3 {
            uc.predict(
                Some(&Frame::filled(32, 32, [0, 0, 0])),
                &mut faces,
                &StrategySet::new(),
                &EffectParameters::default(),
            )
            .unwrap();
        }
        uc.logger_mut().progress(3, 3);
        uc.logger().summary();
    }
}
