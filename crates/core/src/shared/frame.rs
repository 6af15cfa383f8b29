use image::imageops::FilterType;
use image::{ImageBuffer, Rgb};
use ndarray::{ArrayView3, ArrayViewMut3};

use crate::shared::bounding_box::BoundingBox;

/// Number of interleaved channels in every frame.
pub const CHANNELS: usize = 3;

/// A single image or video frame: contiguous BGR bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the pipeline and the
/// effects always see BGR.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A frame filled with a single BGR color.
    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let data = bgr
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * CHANNELS)
            .collect();
        Self::new(data, width, height, 0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(height, width)`, matching the row-major layout.
    pub fn size(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, bgr: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&bgr);
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels under `bbox` into a new frame.
    ///
    /// The box is clamped to the frame first, so the result may be smaller
    /// than requested (or empty).
    pub fn crop(&self, bbox: &BoundingBox) -> Frame {
        let b = bbox.clamped(self.width, self.height);
        let w = b.width().max(0) as usize;
        let h = b.height().max(0) as usize;
        let mut out = Vec::with_capacity(w * h * CHANNELS);
        for row in 0..h {
            let start = self.offset(b.x1 as u32, b.y1 as u32 + row as u32);
            out.extend_from_slice(&self.data[start..start + w * CHANNELS]);
        }
        Frame::new(out, w as u32, h as u32, self.index)
    }

    /// Writes `patch` into this frame with its top-left corner at `(x, y)`.
    ///
    /// Parts of the patch falling outside the frame are dropped.
    pub fn paste(&mut self, patch: &Frame, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let w = patch.width.min(self.width - x) as usize;
        let h = patch.height.min(self.height - y) as usize;
        for row in 0..h {
            let dst = self.offset(x, y + row as u32);
            let src = row * patch.width as usize * CHANNELS;
            self.data[dst..dst + w * CHANNELS]
                .copy_from_slice(&patch.data[src..src + w * CHANNELS]);
        }
    }

    /// Resamples the frame to `width` × `height`.
    ///
    /// Channel order is irrelevant to resampling, so the BGR bytes go through
    /// the `image` crate's RGB buffer unchanged.
    pub fn resized(&self, width: u32, height: u32, filter: FilterType) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.is_empty() || width == 0 || height == 0 {
            return Frame::new(
                vec![0; (width as usize) * (height as usize) * CHANNELS],
                width,
                height,
                self.index,
            );
        }
        let view = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(self.width, self.height, &self.data)
            .expect("Frame data length must match dimensions");
        let out = image::imageops::resize(&view, width, height, filter);
        Frame::new(out.into_raw(), width, height, self.index)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * CHANNELS
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}
