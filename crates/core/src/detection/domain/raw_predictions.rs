use ndarray::{Array3, ArrayView1};

/// Detector output before suppression.
///
/// Shape is `[batch, candidates, features]` where each feature row is
/// `[cx, cy, w, h, objectness, class_0, class_1, ...]` in tensor pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPredictions {
    data: Array3<f32>,
}

impl RawPredictions {
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    pub fn batch_size(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn candidates(&self) -> usize {
        self.data.shape()[1]
    }

    /// Number of class scores per row; `0` for objectness-only models.
    pub fn num_classes(&self) -> usize {
        self.data.shape()[2].saturating_sub(5)
    }

    /// Candidate rows of one batch entry.
    pub fn rows(&self, batch: usize) -> impl Iterator<Item = ArrayView1<'_, f32>> {
        self.data.index_axis(ndarray::Axis(0), batch).into_outer_iter()
    }
}
