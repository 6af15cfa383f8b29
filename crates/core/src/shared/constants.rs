/// Detections at or below this confidence are dropped (strict `>`).
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Candidate score cut used by suppression, before the confidence filter.
pub const DEFAULT_NMS_CONFIDENCE: f32 = 0.25;
pub const DEFAULT_NMS_IOU: f32 = 0.45;

/// Largest downsampling factor of YOLO-family detectors.
pub const DEFAULT_STRIDE: u32 = 32;

/// Label for class 0 of single-class face models.
pub const DEFAULT_CLASS_NAME: &str = "face";

/// Cap on detections kept per image by suppression.
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

pub const DEFAULT_LINE_THICKNESS: u32 = 3;

pub const DEFAULT_BLUR_KERNEL_SIZE: usize = 21;
pub const DEFAULT_BLUR_SIGMA: f64 = 30.0;

pub const DEFAULT_CANNY_LOW: f32 = 50.0;
pub const DEFAULT_CANNY_HIGH: f32 = 150.0;

/// Side length of the downscaled tile used by pixelation.
pub const DEFAULT_PIXEL_TILE: u32 = 10;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
