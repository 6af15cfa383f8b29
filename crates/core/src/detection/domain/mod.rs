pub mod detection_model;
pub mod raw_predictions;
