// src/pipeline/session.rs
//
// One continuous sequence of frames (a video, or a single still image) that
// shares a LaneState. Independent sessions never share state.

use super::frame_pipeline::FramePipeline;
use super::metrics::SessionMetrics;
use crate::types::{DetectionConfig, FrameOutput, LaneState, Segment};
use tracing::{debug, info};

pub struct LaneSession {
    pipeline: FramePipeline,
    state: LaneState,
    metrics: SessionMetrics,
    source_id: String,
}

impl LaneSession {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            pipeline: FramePipeline::new(config),
            state: LaneState::new(),
            metrics: SessionMetrics::new(),
            source_id: String::new(),
        }
    }

    pub fn set_source_id(&mut self, id: impl Into<String>) {
        self.source_id = id.into();
    }

    pub fn process(&mut self, segments: &[Segment], frame_height: u32) -> FrameOutput {
        let output = self
            .pipeline
            .process_frame(segments, frame_height, &mut self.state);
        self.metrics.record(&output);

        if !output.issues.is_empty() {
            debug!(
                "[{}] frame {}: {:?}",
                self.source_id, self.metrics.total_frames, output.issues
            );
        }

        output
    }

    /// Start a new session: all sides back to no estimate, counters cleared.
    pub fn reset(&mut self) {
        info!("[{}] session reset", self.source_id);
        self.state.reset();
        self.metrics = SessionMetrics::new();
    }

    pub fn state(&self) -> &LaneState {
        &self.state
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }
}
