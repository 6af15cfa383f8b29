use crate::shared::frame::Frame;

/// Session-scoped collection of cropped faces.
///
/// Owned by the caller and passed by `&mut` into every pipeline call, which
/// only ever appends. Clearing is the caller's decision.
#[derive(Debug, Default, Clone)]
pub struct FaceGallery {
    faces: Vec<Frame>,
}

impl FaceGallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, face: Frame) {
        self.faces.push(face);
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn faces(&self) -> &[Frame] {
        &self.faces
    }

    /// Faces appended since the gallery held `start` entries.
    pub fn since(&self, start: usize) -> &[Frame] {
        &self.faces[start.min(self.faces.len())..]
    }

    pub fn clear(&mut self) {
        self.faces.clear();
    }

    pub fn into_faces(self) -> Vec<Frame> {
        self.faces
    }
}
