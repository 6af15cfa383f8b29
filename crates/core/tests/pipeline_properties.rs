use facefx_core::annotation::box_painter::label_height;
use facefx_core::detection::domain::detection_model::DetectionModel;
use facefx_core::detection::domain::raw_predictions::RawPredictions;
use facefx_core::effects::domain::effect_kind::{EffectKind, StrategySet};
use facefx_core::effects::domain::effect_parameters::EffectParameters;
use facefx_core::effects::infrastructure::effect_factory::{create_effect, EffectRegistry};
use facefx_core::pipeline::pipeline_logger::NullPipelineLogger;
use facefx_core::pipeline::predict_use_case::{PredictUseCase, Prediction};
use facefx_core::shared::bounding_box::{BoundingBox, Detection};
use facefx_core::shared::color::{bgr_to_hsv, Bgr};
use facefx_core::shared::config::PipelineConfig;
use facefx_core::shared::face_gallery::FaceGallery;
use facefx_core::shared::frame::Frame;
use ndarray::{Array3, Array4};
use rstest::rstest;

// --- Stubs ---

/// Returns a fixed detection list for every image.
struct StubModel {
    detections: Vec<Detection>,
    names: Vec<String>,
}

impl StubModel {
    fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
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
        Ok(RawPredictions::new(Array3::zeros((1, 0, 6))))
    }

    fn suppress(&self, _: &RawPredictions) -> Vec<Vec<Detection>> {
        vec![self.detections.clone()]
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

fn gradient(width: u32, height: u32) -> Frame {
    let mut frame = Frame::filled(width, height, [0, 0, 0]);
    for y in 0..height {
        for x in 0..width {
            frame.set_pixel(x, y, [(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8]);
        }
    }
    frame
}

fn predict(
    detections: Vec<Detection>,
    image: &Frame,
    strategies: &StrategySet,
    params: &EffectParameters,
) -> (Prediction, FaceGallery) {
    let mut use_case = PredictUseCase::new(
        Box::new(StubModel::new(detections)),
        &PipelineConfig::default(),
        Box::new(NullPipelineLogger),
    );
    let mut faces = FaceGallery::new();
    let prediction = use_case
        .predict(Some(image), &mut faces, strategies, params)
        .unwrap()
        .unwrap();
    (prediction, faces)
}

// --- Properties ---

#[rstest]
#[case(vec![])]
#[case(vec![0.9])]
#[case(vec![0.1, 0.39, 0.4])]
#[case(vec![0.41, 0.2, 0.95, 0.4, 0.6])]
fn test_box_and_face_counts_match_confident_detections(#[case] confidences: Vec<f32>) {
    let detections: Vec<Detection> = confidences
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let offset = (i * 12) as f32;
            det([offset, offset, offset + 10.0, offset + 10.0], c)
        })
        .collect();
    let expected = confidences.iter().filter(|&&c| c > 0.4).count();

    let (prediction, faces) = predict(
        detections,
        &gradient(64, 64),
        &StrategySet::new(),
        &EffectParameters::default(),
    );

    assert_eq!(prediction.boxes.len(), expected);
    assert_eq!(faces.len(), expected);
}

#[test]
fn test_confidence_boundary_is_strict() {
    let (prediction, faces) = predict(
        vec![
            det([0.0, 0.0, 16.0, 16.0], 0.4),
            det([32.0, 32.0, 48.0, 48.0], 0.4001),
        ],
        &gradient(64, 64),
        &StrategySet::new(),
        &EffectParameters::default(),
    );
    assert_eq!(prediction.boxes, vec![BoundingBox::new(32, 32, 48, 48)]);
    assert_eq!(faces.len(), 1);
}

#[test]
fn test_empty_strategies_only_draw_boxes() {
    let image = gradient(64, 64);
    let bbox = BoundingBox::new(20, 30, 40, 50);
    let (prediction, _) = predict(
        vec![det([20.0, 30.0, 40.0, 50.0], 0.9)],
        &image,
        &StrategySet::new(),
        &EffectParameters::default(),
    );

    // Stroke reaches one pixel outside the box; the label tab sits above it
    // and may run to the right edge.
    let label_top = bbox.y1 - label_height(3) as i32 - 1;
    let touched = |x: i32, y: i32| x >= bbox.x1 - 1 && y >= label_top && y <= bbox.y2;

    let mut changed_inside_border = false;
    for y in 0..64 {
        for x in 0..64 {
            let same = prediction.image.pixel(x, y) == image.pixel(x, y);
            if !touched(x as i32, y as i32) {
                assert!(same, "pixel ({x}, {y}) changed outside the drawn box");
            } else if !same {
                changed_inside_border = true;
            }
        }
    }
    assert!(changed_inside_border);
    assert_eq!(prediction.image.pixel(30, 40), image.pixel(30, 40));
}

#[rstest]
#[case(64, 64)]
#[case(100, 80)]
#[case(33, 97)]
#[case(20, 20)]
fn test_output_keeps_input_dimensions(#[case] width: u32, #[case] height: u32) {
    let image = gradient(width, height);
    let strategies: StrategySet = "blur,recolor,pixelate,highlight-edges".parse().unwrap();
    let (prediction, _) = predict(
        vec![det([2.0, 2.0, 14.0, 14.0], 0.9)],
        &image,
        &strategies,
        &EffectParameters::default(),
    );
    assert_eq!(prediction.image.size(), image.size());
}

#[test]
fn test_blur_applies_before_pixelate_in_any_selection_order() {
    let config = PipelineConfig::default();
    let registry = EffectRegistry::new(&config);
    let params = EffectParameters::default();
    let boxes = [BoundingBox::new(4, 4, 36, 36)];

    let mut image = Frame::filled(40, 40, [0, 0, 0]);
    for y in 0..40 {
        for x in 20..40 {
            image.set_pixel(x, y, [255, 255, 255]);
        }
    }

    let run = |selection: &str| {
        let mut frame = image.clone();
        let strategies: StrategySet = selection.parse().unwrap();
        registry.apply(&mut frame, &boxes, &strategies, &params).unwrap();
        frame
    };
    let pixelate_first = run("pixelate,blur");
    let blur_first = run("blur,pixelate");
    assert_eq!(pixelate_first, blur_first);

    let mut expected = image.clone();
    create_effect(EffectKind::Blur, &config)
        .apply(&mut expected, &boxes, &params)
        .unwrap();
    create_effect(EffectKind::Pixelate, &config)
        .apply(&mut expected, &boxes, &params)
        .unwrap();
    assert_eq!(blur_first, expected);

    let mut reversed = image.clone();
    create_effect(EffectKind::Pixelate, &config)
        .apply(&mut reversed, &boxes, &params)
        .unwrap();
    create_effect(EffectKind::Blur, &config)
        .apply(&mut reversed, &boxes, &params)
        .unwrap();
    assert_ne!(blur_first, reversed);
}

#[test]
fn test_recolor_sets_hue_and_saturation_keeps_value() {
    let target = Bgr::from_hex("#3060c0").unwrap();
    let [th, ts, _] = target.to_hsv();
    let image = gradient(64, 64);
    let strategies: StrategySet = [EffectKind::Recolor].into_iter().collect();
    let params = EffectParameters::default().with_face_color(target);

    let (prediction, _) = predict(
        vec![det([8.0, 24.0, 56.0, 56.0], 0.9)],
        &image,
        &strategies,
        &params,
    );

    for y in 28..52 {
        for x in 12..52 {
            let [h, s, v] = bgr_to_hsv(prediction.image.pixel(x, y));
            let [_, _, v0] = bgr_to_hsv(image.pixel(x, y));
            let hue_diff = (h as i32 - th as i32).rem_euclid(180);
            assert!(hue_diff.min(180 - hue_diff) <= 2, "hue {h} vs {th} at ({x}, {y})");
            assert!((s as i32 - ts as i32).abs() <= 3, "sat {s} vs {ts} at ({x}, {y})");
            assert!((v as i32 - v0 as i32).abs() <= 1, "value {v} vs {v0} at ({x}, {y})");
        }
    }
}

#[test]
fn test_white_background_scenario() {
    let mut frame = Frame::filled(100, 100, [0, 0, 0]);
    let bbox = BoundingBox::new(10, 10, 50, 50);
    let strategies: StrategySet = [EffectKind::ChangeBackground].into_iter().collect();
    let params = EffectParameters::default().with_background_color(Bgr::from_hex("#FFFFFF").unwrap());

    EffectRegistry::new(&PipelineConfig::default())
        .apply(&mut frame, &[bbox], &strategies, &params)
        .unwrap();

    for y in 0..100 {
        for x in 0..100 {
            let expected = if bbox.contains(x, y) {
                [0, 0, 0]
            } else {
                [255, 255, 255]
            };
            assert_eq!(frame.pixel(x as u32, y as u32), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn test_blank_replacement_leaves_faces_untouched() {
    let image = gradient(64, 64);
    let strategies: StrategySet = [EffectKind::Replace].into_iter().collect();

    let (with_replace, _) = predict(
        vec![det([16.0, 24.0, 48.0, 56.0], 0.9)],
        &image,
        &strategies,
        &EffectParameters::default(),
    );
    let (plain, _) = predict(
        vec![det([16.0, 24.0, 48.0, 56.0], 0.9)],
        &image,
        &StrategySet::new(),
        &EffectParameters::default(),
    );

    assert_eq!(with_replace.image, plain.image);
    for y in 26..54 {
        for x in 18..46 {
            assert_eq!(with_replace.image.pixel(x, y), image.pixel(x, y));
        }
    }
}

#[test]
fn test_gallery_accumulates_across_predictions() {
    let mut use_case = PredictUseCase::new(
        Box::new(StubModel::new(vec![det([0.0, 0.0, 16.0, 16.0], 0.9)])),
        &PipelineConfig::default(),
        Box::new(NullPipelineLogger),
    );
    let mut faces = FaceGallery::new();
    let image = gradient(64, 64);
    for expected in 1..=3 {
        let prediction = use_case
            .predict(Some(&image), &mut faces, &StrategySet::new(), &EffectParameters::default())
            .unwrap()
            .unwrap();
        assert_eq!(faces.len(), expected);
        assert_eq!(prediction.faces(&faces).len(), 1);
    }
    faces.clear();
    assert!(faces.is_empty());
}
