// src/pipeline/metrics.rs
//
// Per-session counters. A session is processed by one thread frame after
// frame, so plain integers are enough.

use crate::types::{FrameIssue, FrameOutput};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub total_frames: u64,
    pub frames_with_both_lines: u64,
    pub frames_with_any_line: u64,
    pub degenerate_segments: u64,
    pub empty_side_inputs: u64,
    pub unstable_slopes: u64,
    pub crossed_lines: u64,
    pub no_estimate_sides: u64,
    pub started_at: Instant,
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            frames_with_both_lines: 0,
            frames_with_any_line: 0,
            degenerate_segments: 0,
            empty_side_inputs: 0,
            unstable_slopes: 0,
            crossed_lines: 0,
            no_estimate_sides: 0,
            started_at: Instant::now(),
        }
    }

    pub fn record(&mut self, output: &FrameOutput) {
        self.total_frames += 1;
        if output.has_both() {
            self.frames_with_both_lines += 1;
        }
        if output.left.is_some() || output.right.is_some() {
            self.frames_with_any_line += 1;
        }

        for issue in &output.issues {
            match issue {
                FrameIssue::DegenerateSegments { count } => {
                    self.degenerate_segments += *count as u64
                }
                FrameIssue::EmptySideInput(_) => self.empty_side_inputs += 1,
                FrameIssue::UnstableSlope { .. } => self.unstable_slopes += 1,
                FrameIssue::CrossedLines { .. } => self.crossed_lines += 1,
                FrameIssue::NoEstimate(_) => self.no_estimate_sides += 1,
            }
        }
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            fps: self.fps(),
            frames_with_both_lines: self.frames_with_both_lines,
            frames_with_any_line: self.frames_with_any_line,
            degenerate_segments: self.degenerate_segments,
            empty_side_inputs: self.empty_side_inputs,
            unstable_slopes: self.unstable_slopes,
            crossed_lines: self.crossed_lines,
            no_estimate_sides: self.no_estimate_sides,
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub frames_with_both_lines: u64,
    pub frames_with_any_line: u64,
    pub degenerate_segments: u64,
    pub empty_side_inputs: u64,
    pub unstable_slopes: u64,
    pub crossed_lines: u64,
    pub no_estimate_sides: u64,
    pub elapsed_secs: f64,
}

impl MetricsSummary {
    /// Share of frames in which both lane lines were drawn, in percent.
    pub fn coverage_pct(&self) -> f64 {
        100.0 * self.frames_with_both_lines as f64 / self.total_frames.max(1) as f64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
