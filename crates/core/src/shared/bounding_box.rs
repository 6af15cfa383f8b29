/// Axis-aligned face box in integer pixel coordinates.
///
/// `(x1, y1)` is inclusive, `(x2, y2)` exclusive, so `width = x2 - x1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rounds float corners to the nearest pixel.
    pub fn from_corners(corners: [f32; 4]) -> Self {
        Self::new(
            corners[0].round() as i32,
            corners[1].round() as i32,
            corners[2].round() as i32,
            corners[3].round() as i32,
        )
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// True when the box covers no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Limits the box to `[0, width] × [0, height]`, the way slicing an
    /// image with out-of-range indices would.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let w = width as i32;
        let h = height as i32;
        Self::new(
            self.x1.clamp(0, w),
            self.y1.clamp(0, h),
            self.x2.clamp(0, w),
            self.y2.clamp(0, h),
        )
    }

    /// Scales coordinates independently along each axis, rounding to the
    /// nearest pixel.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(
            (self.x1 as f64 * sx).round() as i32,
            (self.y1 as f64 * sy).round() as i32,
            (self.x2 as f64 * sx).round() as i32,
            (self.y2 as f64 * sy).round() as i32,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }
}

/// One candidate from the detector after suppression, in tensor space.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// `[x1, y1, x2, y2]`.
    pub bbox: [f32; 4],
    pub confidence: f32,
    pub class_id: usize,
}
