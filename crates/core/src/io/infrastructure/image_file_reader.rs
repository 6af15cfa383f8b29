use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

#[derive(Debug, Error)]
pub enum ImageReadError {
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decodes image files with the `image` crate.
///
/// Decoded RGB pixels are reordered to BGR here, so the rest of the
/// pipeline never sees RGB.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(path: &Path) -> Result<Frame, ImageReadError> {
        let rgb = image::open(path)
            .map_err(|source| ImageReadError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut data = rgb.into_raw();
        for px in data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        Ok(Frame::new(data, width, height, 0))
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        Ok(Self::load(path)?)
    }
}
