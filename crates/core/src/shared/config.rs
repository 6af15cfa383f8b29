use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::color::Bgr;
use crate::shared::constants::{
    DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA, DEFAULT_CANNY_HIGH, DEFAULT_CANNY_LOW,
    DEFAULT_CLASS_NAME, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_LINE_THICKNESS,
    DEFAULT_MAX_DETECTIONS, DEFAULT_NMS_CONFIDENCE, DEFAULT_NMS_IOU, DEFAULT_PIXEL_TILE,
    DEFAULT_STRIDE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every tunable number the pipeline uses, with the demo's defaults.
///
/// Loaded from JSON; missing keys fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Detections are kept only when `confidence > confidence_threshold`.
    pub confidence_threshold: f32,
    /// Candidate score cut applied during suppression.
    pub nms_confidence: f32,
    pub nms_iou: f32,
    /// Upper bound on detections kept per image after suppression.
    pub max_detections: usize,
    /// Detector stride; input dimensions are truncated to multiples of it.
    pub stride: u32,
    /// Swap B and R when building the input tensor.
    pub input_rgb: bool,
    pub box_color: Bgr,
    pub line_thickness: u32,
    pub blur_kernel_size: usize,
    pub blur_sigma: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    pub pixel_tile: u32,
    /// Label names indexed by class id, used when drawing boxes.
    pub class_names: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_confidence: DEFAULT_NMS_CONFIDENCE,
            nms_iou: DEFAULT_NMS_IOU,
            max_detections: DEFAULT_MAX_DETECTIONS,
            stride: DEFAULT_STRIDE,
            input_rgb: true,
            box_color: Bgr::RED,
            line_thickness: DEFAULT_LINE_THICKNESS,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            pixel_tile: DEFAULT_PIXEL_TILE,
            class_names: vec![DEFAULT_CLASS_NAME.to_string()],
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.nms_confidence) {
            return Err(ConfigError::Invalid(format!(
                "nms_confidence must be between 0.0 and 1.0, got {}",
                self.nms_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.nms_iou) {
            return Err(ConfigError::Invalid(format!(
                "nms_iou must be between 0.0 and 1.0, got {}",
                self.nms_iou
            )));
        }
        if self.stride == 0 {
            return Err(ConfigError::Invalid("stride must be positive".into()));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "blur_kernel_size must be a positive odd integer, got {}",
                self.blur_kernel_size
            )));
        }
        if self.blur_sigma <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(ConfigError::Invalid(format!(
                "canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if self.pixel_tile == 0 {
            return Err(ConfigError::Invalid("pixel_tile must be positive".into()));
        }
        if self.class_names.is_empty() {
            return Err(ConfigError::Invalid("class_names must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let c = PipelineConfig::default();
        assert_relative_eq!(c.confidence_threshold, 0.4);
        assert_eq!(c.blur_kernel_size, 21);
        assert_relative_eq!(c.blur_sigma, 30.0);
        assert_relative_eq!(c.canny_low, 50.0);
        assert_relative_eq!(c.canny_high, 150.0);
        assert_eq!(c.pixel_tile, 10);
        assert_eq!(c.line_thickness, 3);
        assert_eq!(c.box_color, Bgr::RED);
        assert_eq!(c.class_names, vec!["face".to_string()]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r##"{"pixel_tile": 4, "box_color": "#00ff00"}"##).unwrap();

        let c = PipelineConfig::load(&path).unwrap();
        assert_eq!(c.pixel_tile, 4);
        assert_eq!(c.box_color, Bgr::GREEN);
        assert_eq!(c.blur_kernel_size, DEFAULT_BLUR_KERNEL_SIZE);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_rejects_even_kernel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"blur_kernel_size": 20}"#).unwrap();
        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_canny() {
        let c = PipelineConfig {
            canny_low: 200.0,
            canny_high: 100.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let c = PipelineConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_nms_confidence() {
        for nms_confidence in [-0.1, 1.01] {
            let c = PipelineConfig {
                nms_confidence,
                ..Default::default()
            };
            let err = c.validate().unwrap_err();
            assert!(err.to_string().contains("nms_confidence"), "{err}");
        }
    }

    #[test]
    fn test_validate_rejects_empty_class_names() {
        let c = PipelineConfig {
            class_names: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }
}
