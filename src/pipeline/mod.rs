// src/pipeline/mod.rs

pub mod frame_pipeline;
pub mod metrics;
pub mod session;

pub use frame_pipeline::{process_frame, FramePipeline};
pub use metrics::{MetricsSummary, SessionMetrics};
pub use session::LaneSession;
