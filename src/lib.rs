// src/lib.rs
//
// Straight lane-line detection for road-facing camera frames.
//
// Signal flow per frame:
//   Hough segments → detection (classify, filter, fit, smooth, project)
//                  → pipeline (cross-check, session state, metrics)
//                  → render overlay (video feature)

pub mod config;
pub mod detection;
pub mod pipeline;
pub mod types;

#[cfg(feature = "video")]
pub mod preprocessing;
#[cfg(feature = "video")]
pub mod render;
#[cfg(feature = "video")]
pub mod video_processor;

pub use pipeline::{process_frame, FramePipeline, LaneSession};
pub use types::{
    Config, EndpointPair, FrameIssue, FrameOutput, LaneState, Point, Segment, Side,
    SlopeIntercept,
};
