use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::domain::image_writer::ImageWriter;
use crate::shared::frame::{Frame, CHANNELS};

#[derive(Debug, Error)]
pub enum ImageWriteError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame data does not match {width}x{height}")]
    BadFrame { width: u32, height: u32 },
}

/// Writes frames with the `image` crate, converting BGR back to RGB.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn save(path: &Path, frame: &Frame) -> Result<(), ImageWriteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ImageWriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut rgb = frame.data().to_vec();
        for px in rgb.chunks_exact_mut(CHANNELS) {
            px.swap(0, 2);
        }
        let img = image::RgbImage::from_raw(frame.width(), frame.height(), rgb).ok_or(
            ImageWriteError::BadFrame {
                width: frame.width(),
                height: frame.height(),
            },
        )?;

        img.save(path).map_err(|source| ImageWriteError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Ok(Self::save(path, frame)?)
    }
}
