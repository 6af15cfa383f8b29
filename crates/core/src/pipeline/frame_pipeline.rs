use std::time::Instant;

use image::imageops::FilterType;
use ndarray::Array4;

use crate::detection::domain::detection_model::DetectionModel;
use crate::geometry::scaling::stride_aligned_size;
use crate::shared::bounding_box::Detection;
use crate::shared::frame::Frame;

use super::pipeline_logger::{PipelineLogger, STAGE_INFERENCE, STAGE_PREPROCESS};

/// Everything the post-processor needs from one detector pass.
#[derive(Debug)]
pub struct PreparedFrame {
    /// Suppressed detections per batch entry, in tensor space.
    pub detections: Vec<Vec<Detection>>,
    /// The stride-aligned resize of the input the detector saw.
    pub working: Frame,
    /// NCHW shape of the tensor fed to the detector.
    pub tensor_shape: [usize; 4],
    /// `(height, width)` of the input before resizing.
    pub original_size: (u32, u32),
}

/// Resizes `image` to stride-aligned dimensions (bilinear, no padding).
pub fn resize_to_stride(image: &Frame, stride: u32) -> Frame {
    let (w, h) = stride_aligned_size(image.width(), image.height(), stride);
    image.resized(w, h, FilterType::Triangle)
}

/// Builds a `[1, 3, H, W]` tensor scaled to `[0, 1]`.
///
/// With `swap_rb` the BGR pixels are written in RGB channel order.
pub fn to_tensor(frame: &Frame, swap_rb: bool) -> Array4<f32> {
    let (h, w) = (frame.height() as usize, frame.width() as usize);
    let src = frame.as_ndarray();
    let mut tensor = Array4::<f32>::zeros((1, 3, h, w));
    for c in 0..3 {
        let src_c = if swap_rb { 2 - c } else { c };
        for y in 0..h {
            for x in 0..w {
                tensor[[0, c, y, x]] = src[[y, x, src_c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Resize, tensorize, infer, suppress.
pub fn process_image(
    image: &Frame,
    model: &mut dyn DetectionModel,
    input_rgb: bool,
    logger: &mut dyn PipelineLogger,
) -> Result<PreparedFrame, Box<dyn std::error::Error>> {
    let original_size = image.size();

    let t0 = Instant::now();
    let working = resize_to_stride(image, model.stride());
    let tensor = to_tensor(&working, input_rgb);
    let shape = tensor.shape();
    let tensor_shape = [shape[0], shape[1], shape[2], shape[3]];
    logger.timing(STAGE_PREPROCESS, t0.elapsed().as_secs_f64() * 1000.0);

    let t1 = Instant::now();
    let raw = model.infer(tensor)?;
    let detections = model.suppress(&raw);
    logger.timing(STAGE_INFERENCE, t1.elapsed().as_secs_f64() * 1000.0);

    log::debug!(
        "Image {}x{} -> working {}x{}, {} candidate(s)",
        original_size.1,
        original_size.0,
        working.width(),
        working.height(),
        detections.iter().map(Vec::len).sum::<usize>()
    );

    Ok(PreparedFrame {
        detections,
        working,
        tensor_shape,
        original_size,
    })
}
