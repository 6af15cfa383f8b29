pub mod non_max_suppression;
pub mod onnx_yolo_model;
