use crate::shared::color::Bgr;
use crate::shared::frame::Frame;

/// Recolor target used when the caller does not pick one (`#56ecd5`).
pub const DEFAULT_FACE_COLOR: Bgr = Bgr::from_rgb(0x56, 0xec, 0xd5);

/// Per-run settings consumed by individual effects.
///
/// Each effect reads only the fields it needs; unset optional fields turn
/// the effects that require them into no-ops.
#[derive(Clone, Debug)]
pub struct EffectParameters {
    /// Solid fill for the background change.
    pub background_color: Option<Bgr>,
    /// Takes precedence over `background_color` when both are set.
    pub background_image: Option<Frame>,
    pub face_color: Bgr,
    pub replacement: Option<Frame>,
    pub edge_color: Bgr,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            background_color: None,
            background_image: None,
            face_color: DEFAULT_FACE_COLOR,
            replacement: None,
            edge_color: Bgr::GREEN,
        }
    }
}

impl EffectParameters {
    pub fn with_background_color(mut self, color: Bgr) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_background_image(mut self, image: Frame) -> Self {
        self.background_image = Some(image);
        self
    }

    pub fn with_face_color(mut self, color: Bgr) -> Self {
        self.face_color = color;
        self
    }

    pub fn with_replacement(mut self, image: Frame) -> Self {
        self.replacement = Some(image);
        self
    }

    pub fn with_edge_color(mut self, color: Bgr) -> Self {
        self.edge_color = color;
        self
    }
}
