pub mod bounding_box;
pub mod color;
pub mod config;
pub mod constants;
pub mod face_gallery;
pub mod frame;
