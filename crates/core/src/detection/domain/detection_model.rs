use ndarray::Array4;

use crate::annotation::box_painter;
use crate::geometry::scaling;
use crate::shared::bounding_box::{BoundingBox, Detection};
use crate::shared::color::Bgr;
use crate::shared::frame::Frame;

use super::raw_predictions::RawPredictions;

/// Domain interface to an object detector and its helpers.
///
/// Built once per session and borrowed by every pipeline call. `infer`
/// takes `&mut self` because runtime sessions are stateful.
pub trait DetectionModel: Send {
    /// Input dimensions must be multiples of this.
    fn stride(&self) -> u32;

    /// Label names indexed by class id.
    fn class_names(&self) -> &[String];

    /// Runs the network on an NCHW tensor normalized to `[0, 1]`.
    fn infer(&mut self, tensor: Array4<f32>) -> Result<RawPredictions, Box<dyn std::error::Error>>;

    /// Non-maximum suppression; one list per batch entry, boxes as
    /// `[x1, y1, x2, y2]` in tensor pixels.
    fn suppress(&self, raw: &RawPredictions) -> Vec<Vec<Detection>>;

    /// Maps a tensor-space box onto an image of `to_shape` (`(h, w)`).
    fn scale_coords(&self, from_shape: (u32, u32), bbox: [f32; 4], to_shape: (u32, u32)) -> [f32; 4] {
        scaling::scale_coords(from_shape, bbox, to_shape)
    }

    fn draw_box(
        &self,
        frame: &mut Frame,
        bbox: &BoundingBox,
        label: Option<&str>,
        color: Bgr,
        thickness: u32,
    ) {
        box_painter::draw_box(frame, bbox, label, color, thickness);
    }
}
