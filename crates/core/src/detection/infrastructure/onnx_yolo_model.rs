//! YOLO detector running on ONNX Runtime via `ort`.
//!
//! Expects an export with a dynamic spatial input (`[1, 3, H, W]`) so the
//! stride-aligned working frame can be fed as-is, and a single output of
//! per-candidate rows `[cx, cy, w, h, obj, cls...]`, plain or transposed.
use std::path::{Path, PathBuf};

use ndarray::{Array3, Array4};
use thiserror::Error;

use crate::detection::domain::detection_model::DetectionModel;
use crate::detection::domain::raw_predictions::RawPredictions;
use crate::shared::bounding_box::Detection;
use crate::shared::config::PipelineConfig;

use super::non_max_suppression::{non_max_suppression, NmsSettings};

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid model {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

pub struct OnnxYoloModel {
    session: ort::session::Session,
    class_names: Vec<String>,
    stride: u32,
    nms: NmsSettings,
}

impl OnnxYoloModel {
    /// Loads a YOLO ONNX model; stride, labels and suppression thresholds
    /// come from `config`.
    pub fn load(model_path: &Path, config: &PipelineConfig) -> Result<Self, ModelLoadError> {
        if !model_path.is_file() {
            return Err(ModelLoadError::NotFound(model_path.to_path_buf()));
        }
        let invalid = |reason: String| ModelLoadError::Invalid {
            path: model_path.to_path_buf(),
            reason,
        };

        let session = build_session(model_path).map_err(|e| invalid(e.to_string()))?;

        let input_dims = session.inputs().first().and_then(|input| {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                Some(shape.iter().copied().collect::<Vec<i64>>())
            } else {
                None
            }
        });
        match input_dims {
            None => return Err(invalid("model has no tensor input".into())),
            Some(dims) if dims.len() != 4 => {
                return Err(invalid(format!("expected an NCHW input, got {dims:?}")));
            }
            Some(dims) if dims[2] > 0 || dims[3] > 0 => {
                log::warn!(
                    "Model input is fixed at {}x{}; frames of other sizes will fail inference",
                    dims[3],
                    dims[2]
                );
            }
            Some(_) => {}
        }

        log::info!(
            "Loaded detector {} (stride={}, classes={:?})",
            model_path.display(),
            config.stride,
            config.class_names
        );

        Ok(Self {
            session,
            class_names: config.class_names.clone(),
            stride: config.stride,
            nms: NmsSettings {
                confidence: config.nms_confidence,
                iou: config.nms_iou,
                max_detections: config.max_detections,
            },
        })
    }
}

fn build_session(model_path: &Path) -> Result<ort::session::Session, Box<dyn std::error::Error>> {
    let intra_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let session = ort::session::Session::builder()?
        .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .with_execution_providers(preferred_execution_providers())?
        .commit_from_file(model_path)?;
    Ok(session)
}

/// Platform accelerators, CPU otherwise.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

impl DetectionModel for OnnxYoloModel {
    fn stride(&self) -> u32 {
        self.stride
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn infer(&mut self, tensor: Array4<f32>) -> Result<RawPredictions, Box<dyn std::error::Error>> {
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let output = outputs[0].try_extract_array::<f32>()?;
        let shape = output.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
        }
        let data = output.as_slice().ok_or("Cannot get tensor slice")?;
        rows_from_output(&shape, data)
    }

    fn suppress(&self, raw: &RawPredictions) -> Vec<Vec<Detection>> {
        non_max_suppression(raw, &self.nms)
    }
}

/// Normalizes `[B, N, F]` or transposed `[B, F, N]` output into
/// `[B, N, F]`.
///
/// Candidates always outnumber features, so the smaller middle axis is the
/// feature axis.
fn rows_from_output(
    shape: &[usize],
    data: &[f32],
) -> Result<RawPredictions, Box<dyn std::error::Error>> {
    let (batch, a, b) = (shape[0], shape[1], shape[2]);
    let transposed = a < b;
    let (candidates, features) = if transposed { (b, a) } else { (a, b) };
    if features < 5 {
        return Err(format!("YOLO rows need at least 5 values, got {features}").into());
    }

    let array = Array3::from_shape_vec((batch, a, b), data.to_vec())?;
    let array = if transposed {
        array.permuted_axes([0, 2, 1]).as_standard_layout().into_owned()
    } else {
        array
    };
    debug_assert_eq!(array.shape(), &[batch, candidates, features]);
    Ok(RawPredictions::new(array))
}
