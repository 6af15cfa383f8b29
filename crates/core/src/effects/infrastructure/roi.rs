use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// ROI rectangle within a frame, used to pass region coordinates without many arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl RoiRect {
    /// Clamps `bbox` to the frame; `None` when nothing is left.
    pub fn from_box(bbox: &BoundingBox, frame_width: u32, frame_height: u32) -> Option<Self> {
        let b = bbox.clamped(frame_width, frame_height);
        if b.is_degenerate() {
            return None;
        }
        Some(Self {
            x: b.x1 as usize,
            y: b.y1 as usize,
            w: b.width() as usize,
            h: b.height() as usize,
        })
    }

    pub fn to_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.x as i32,
            self.y as i32,
            (self.x + self.w) as i32,
            (self.y + self.h) as i32,
        )
    }
}

/// Non-empty ROIs for `boxes`, in input order.
pub fn rois_for(frame: &Frame, boxes: &[BoundingBox]) -> Vec<RoiRect> {
    boxes
        .iter()
        .filter_map(|b| {
            let roi = RoiRect::from_box(b, frame.width(), frame.height());
            if roi.is_none() {
                log::debug!("Skipping empty region {b:?}");
            }
            roi
        })
        .collect()
}
