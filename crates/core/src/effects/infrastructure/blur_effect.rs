use std::cell::RefCell;

use crate::effects::domain::effect_kind::EffectKind;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::effects::domain::face_effect::FaceEffect;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA};
use crate::shared::frame::{Frame, CHANNELS};

use super::gaussian;
use super::roi::rois_for;

/// Gaussian blur over the rectangular area of each face box.
///
/// Each box is blurred independently; pixels outside the box never feed
/// into the result.
pub struct BlurEffect {
    kernel: Vec<f32>,
    blur_temp: RefCell<Vec<f32>>,
}

impl BlurEffect {
    pub fn new(kernel_size: usize, sigma: f64) -> Self {
        Self {
            kernel: gaussian::gaussian_kernel_1d(kernel_size, sigma),
            blur_temp: RefCell::new(Vec::new()),
        }
    }
}

impl Default for BlurEffect {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA)
    }
}

impl FaceEffect for BlurEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Blur
    }

    fn apply(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
        _params: &EffectParameters,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut temp = self.blur_temp.borrow_mut();
        for rect in rois_for(frame, boxes) {
            let mut region = frame.crop(&rect.to_box());
            gaussian::separable_gaussian_blur_with_kernel(
                region.data_mut(),
                rect.w,
                rect.h,
                CHANNELS,
                &self.kernel,
                &mut temp,
            );
            frame.paste(&region, rect.x as u32, rect.y as u32);
        }

        Ok(())
    }
}
