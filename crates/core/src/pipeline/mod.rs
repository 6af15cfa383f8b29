pub mod frame_pipeline;
pub mod pipeline_logger;
pub mod post_processor;
pub mod predict_use_case;
pub mod stream_worker;
