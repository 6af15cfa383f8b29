//! Face detection to effect pipeline: detect faces, crop them, draw boxes
//! and apply cosmetic effects to the detected regions.

pub mod annotation;
pub mod detection;
pub mod effects;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod shared;
