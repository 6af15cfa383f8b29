//! Coordinate mapping between detector tensor space and image space.
//!
//! Shapes are `(height, width)` throughout.

/// Maps a box from the tensor the detector saw back onto an image of
/// `to_shape`.
///
/// Inverts a letterbox resize: the uniform gain and the centered padding are
/// recovered from the two shapes, removed, and the result is clipped to the
/// target image. With a plain proportional resize the padding is zero and
/// this reduces to a linear scale.
pub fn scale_coords(from_shape: (u32, u32), bbox: [f32; 4], to_shape: (u32, u32)) -> [f32; 4] {
    let (from_h, from_w) = (from_shape.0 as f32, from_shape.1 as f32);
    let (to_h, to_w) = (to_shape.0 as f32, to_shape.1 as f32);
    if to_h <= 0.0 || to_w <= 0.0 {
        return [0.0; 4];
    }

    let gain = (from_h / to_h).min(from_w / to_w);
    let pad_x = (from_w - to_w * gain) / 2.0;
    let pad_y = (from_h - to_h * gain) / 2.0;

    let x1 = (bbox[0] - pad_x) / gain;
    let y1 = (bbox[1] - pad_y) / gain;
    let x2 = (bbox[2] - pad_x) / gain;
    let y2 = (bbox[3] - pad_y) / gain;

    clip_coords([x1, y1, x2, y2], to_shape)
}

/// Clamps box corners to `[0, width] × [0, height]`.
pub fn clip_coords(bbox: [f32; 4], shape: (u32, u32)) -> [f32; 4] {
    let (h, w) = (shape.0 as f32, shape.1 as f32);
    [
        bbox[0].clamp(0.0, w),
        bbox[1].clamp(0.0, h),
        bbox[2].clamp(0.0, w),
        bbox[3].clamp(0.0, h),
    ]
}

/// Converts `[cx, cy, w, h]` to `[x1, y1, x2, y2]`.
pub fn xywh_to_xyxy(xywh: [f32; 4]) -> [f32; 4] {
    let [cx, cy, w, h] = xywh;
    [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0]
}

/// Largest dimensions not exceeding `(width, height)` that are multiples of
/// `stride`.
///
/// Truncates rather than pads. A dimension smaller than one stride is raised
/// to `stride` so the detector never receives an empty input.
pub fn stride_aligned_size(width: u32, height: u32, stride: u32) -> (u32, u32) {
    let stride = stride.max(1);
    let align = |v: u32| (v - v % stride).max(stride);
    (align(width), align(height))
}
