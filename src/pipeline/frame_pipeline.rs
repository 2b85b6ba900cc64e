// src/pipeline/frame_pipeline.rs
//
// One frame, strictly in order:
//   classify → filter → fit → smooth (updates LaneState) → project → cross-check
//
// Frames must be fed in temporal order: frame N's accepted lines are frame
// N+1's smoothing input.

use crate::detection::{
    classify_segments, filter_outliers, fit_line, lines_uncrossed, GeometryProjector,
    TemporalSmoother,
};
use crate::types::{
    DetectionConfig, EndpointPair, FrameIssue, FrameOutput, LaneState, Segment, Side,
    SlopeIntercept,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FramePipeline {
    smoother: TemporalSmoother,
    projector: GeometryProjector,
    require_both_sides: bool,
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

impl FramePipeline {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            smoother: TemporalSmoother::from_config(config),
            projector: GeometryProjector::new(config.cutoff_ratio),
            require_both_sides: config.require_both_sides,
        }
    }

    /// Turn one frame's raw segments into at most two drawable lane lines.
    ///
    /// `state` is read as the previous frame's accepted lines and overwritten
    /// with this frame's, even when the lines end up suppressed from drawing.
    pub fn process_frame(
        &self,
        segments: &[Segment],
        frame_height: u32,
        state: &mut LaneState,
    ) -> FrameOutput {
        let mut issues = Vec::new();

        let classified = classify_segments(segments);
        if classified.degenerate > 0 {
            issues.push(FrameIssue::DegenerateSegments {
                count: classified.degenerate,
            });
        }

        debug!(
            "Segments: {} total, {} left, {} right, {} horizontal, {} vertical",
            segments.len(),
            classified.left.len(),
            classified.right.len(),
            classified.horizontal,
            classified.degenerate
        );

        let left = self.track_side(Side::Left, &classified.left, state, &mut issues);
        let right = self.track_side(Side::Right, &classified.right, state, &mut issues);

        let left = left.and_then(|l| self.projector.project(&l, frame_height));
        let right = right.and_then(|r| self.projector.project(&r, frame_height));

        let (left, right) = self.cross_check(left, right, &mut issues);

        FrameOutput {
            left,
            right,
            issues,
        }
    }

    /// Filter, fit and smooth one side, writing the result back into `state`.
    fn track_side(
        &self,
        side: Side,
        lines: &[SlopeIntercept],
        state: &mut LaneState,
        issues: &mut Vec<FrameIssue>,
    ) -> Option<SlopeIntercept> {
        let fit = match filter_outliers(lines) {
            Some(group) => {
                if group.used_fallback {
                    debug!(
                        "{} outlier filter kept nothing (mean {:.3}, std {:.3}), using all {} lines",
                        side.as_str(),
                        group.slope_mean,
                        group.slope_std,
                        group.lines.len()
                    );
                }
                fit_line(&group.lines)
            }
            None => {
                issues.push(FrameIssue::EmptySideInput(side));
                None
            }
        };

        if let Some(f) = fit.filter(|f| !self.smoother.is_stable(f)) {
            debug!("{} fit slope {:.1} is unstable, ignoring", side.as_str(), f.slope);
            issues.push(FrameIssue::UnstableSlope {
                side,
                slope: f.slope,
            });
        }

        let outcome = self.smoother.smooth(state.get(side), fit);
        debug!("{} smoothing: {:?}", side.as_str(), outcome);

        match outcome.line() {
            Some(line) => {
                state.set(side, line);
                Some(line)
            }
            None => {
                issues.push(FrameIssue::NoEstimate(side));
                None
            }
        }
    }

    fn cross_check(
        &self,
        left: Option<EndpointPair>,
        right: Option<EndpointPair>,
        issues: &mut Vec<FrameIssue>,
    ) -> (Option<EndpointPair>, Option<EndpointPair>) {
        match (left, right) {
            (Some(l), Some(r)) => {
                if lines_uncrossed(&l, &r) {
                    (Some(l), Some(r))
                } else {
                    debug!(
                        "Lines crossed at cutoff: left x={} >= right x={}, suppressing both",
                        l.cutoff.x, r.cutoff.x
                    );
                    issues.push(FrameIssue::CrossedLines {
                        left_cutoff_x: l.cutoff.x,
                        right_cutoff_x: r.cutoff.x,
                    });
                    (None, None)
                }
            }
            _ if self.require_both_sides => (None, None),
            other => other,
        }
    }
}

/// Process one frame with the default detection constants.
pub fn process_frame(segments: &[Segment], frame_height: u32, state: &mut LaneState) -> FrameOutput {
    FramePipeline::default().process_frame(segments, frame_height, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    /// Segment lying on y = m*x + b between the given x values.
    fn on_line(m: f64, b: f64, xa: i32, xb: i32) -> Segment {
        let y = |x: i32| (m * x as f64 + b).round() as i32;
        Segment::new(xa, y(xa), xb, y(xb))
    }

    #[test]
    fn test_end_to_end_first_frame() {
        let mut state = LaneState::new();
        // Exact segments: slope -0.7 through (0, 600), slope 0.6 through (0, 50)
        let segments = [Segment::new(0, 600, 100, 530), Segment::new(1000, 650, 1100, 710)];

        let out = process_frame(&segments, 720, &mut state);

        let left = out.left.expect("left line");
        let right = out.right.expect("right line");
        assert_eq!(left.bottom, Point::new(-171, 720));
        assert_eq!(right.bottom, Point::new(1116, 720));
        assert!(left.cutoff.x < right.cutoff.x);

        let l = state.left.unwrap();
        assert!((l.slope + 0.7).abs() < 1e-9);
        assert!((l.intercept - 600.0).abs() < 1e-9);
        let r = state.right.unwrap();
        assert!((r.slope - 0.6).abs() < 1e-9);
        assert!((r.intercept - 50.0).abs() < 1e-9);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_only_right_segments_gives_no_left_estimate() {
        let mut state = LaneState::new();
        let segments = [on_line(0.6, 50.0, 900, 1100), on_line(0.62, 40.0, 950, 1150)];

        let out = process_frame(&segments, 720, &mut state);

        assert!(out.left.is_none());
        assert!(state.left.is_none());
        assert!(out.right.is_some());
        assert!(out.has_issue(|i| *i == FrameIssue::EmptySideInput(Side::Left)));
        assert!(out.has_issue(|i| *i == FrameIssue::NoEstimate(Side::Left)));
    }

    #[test]
    fn test_single_segment_per_side_fits_finite_line() {
        let mut state = LaneState::new();
        let segments = [on_line(-0.7, 600.0, 100, 300), on_line(0.6, 50.0, 900, 1100)];

        process_frame(&segments, 720, &mut state);

        for side in [Side::Left, Side::Right] {
            let line = state.get(side).unwrap();
            assert!(line.slope.is_finite() && line.intercept.is_finite());
        }
    }

    #[test]
    fn test_vertical_segment_is_ignored() {
        let mut state = LaneState::new();
        let segments = [Segment::new(640, 720, 640, 440), on_line(-0.7, 600.0, 100, 300)];

        let out = process_frame(&segments, 720, &mut state);

        assert!(out.has_issue(|i| *i == FrameIssue::DegenerateSegments { count: 1 }));
        assert!(state.left.is_some());
        assert!(state.right.is_none());
    }

    #[test]
    fn test_empty_frame_holds_previous_state() {
        let mut state = LaneState {
            left: Some(SlopeIntercept::new(-0.7, 600.0)),
            right: Some(SlopeIntercept::new(0.6, 50.0)),
        };
        let before = state;

        let out = process_frame(&[], 720, &mut state);

        assert_eq!(state, before);
        assert!(out.has_both());
    }

    #[test]
    fn test_smoothing_across_frames() {
        let mut state = LaneState {
            left: Some(SlopeIntercept::new(-0.7, 500.0)),
            right: None,
        };
        // Single exact segment on y = -0.5x + 480
        let segments = [Segment::new(0, 480, 100, 430)];

        process_frame(&segments, 720, &mut state);

        let left = state.left.unwrap();
        assert!((left.slope + 0.66).abs() < 1e-9);
        assert!((left.intercept - 496.0).abs() < 1e-9);
    }

    #[test]
    fn test_crossed_lines_suppress_rendering_but_update_state() {
        let mut state = LaneState::new();
        // Left reaches the cutoff at x=500, right at x=480
        let left = SlopeIntercept::new(-1.0, 932.0);
        let right = SlopeIntercept::new(1.0, -48.0);
        let segments = [
            Segment::new(400, 532, 500, 432),
            Segment::new(480, 432, 580, 532),
        ];

        let out = process_frame(&segments, 720, &mut state);

        assert!(out.left.is_none() && out.right.is_none());
        assert!(out.has_issue(|i| matches!(
            i,
            FrameIssue::CrossedLines {
                left_cutoff_x: 500,
                right_cutoff_x: 480
            }
        )));
        assert_eq!(state.left, Some(left));
        assert_eq!(state.right, Some(right));
    }

    #[test]
    fn test_require_both_sides_suppresses_lone_line() {
        let config = DetectionConfig {
            require_both_sides: true,
            ..DetectionConfig::default()
        };
        let pipeline = FramePipeline::new(&config);
        let mut state = LaneState::new();

        let out = pipeline.process_frame(&[on_line(0.6, 50.0, 900, 1100)], 720, &mut state);

        assert!(out.left.is_none() && out.right.is_none());
        assert!(state.right.is_some());
    }

    #[test]
    fn test_outlier_segment_does_not_move_fit() {
        let mut state = LaneState::new();
        let segments = [
            Segment::new(0, 600, 100, 530),
            Segment::new(100, 530, 200, 460),
            Segment::new(200, 460, 300, 390),
            Segment::new(50, 565, 150, 495),
            Segment::new(300, 700, 310, 600), // slope -10
        ];

        process_frame(&segments, 720, &mut state);

        let left = state.left.unwrap();
        assert!((left.slope + 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_unstable_fit_without_prior_stays_unset() {
        let mut state = LaneState::new();
        // slope 1000 sits exactly on the instability threshold
        let out = process_frame(&[Segment::new(0, 0, 1, 1000)], 720, &mut state);

        assert!(out.right.is_none());
        assert!(state.right.is_none());
        assert!(out.has_issue(|i| matches!(
            i,
            FrameIssue::UnstableSlope {
                side: Side::Right,
                slope
            } if *slope == 1000.0
        )));
        assert!(out.has_issue(|i| *i == FrameIssue::NoEstimate(Side::Right)));
    }

    #[test]
    fn test_unstable_fit_holds_prior() {
        let prior = SlopeIntercept::new(0.6, 50.0);
        let mut state = LaneState {
            left: None,
            right: Some(prior),
        };

        let out = process_frame(&[Segment::new(0, 0, 1, 1000)], 720, &mut state);

        assert_eq!(state.right, Some(prior));
        assert!(out.has_issue(|i| matches!(i, FrameIssue::UnstableSlope { side: Side::Right, .. })));
        assert!(!out.has_issue(|i| *i == FrameIssue::NoEstimate(Side::Right)));

        let right = out.right.expect("held right line");
        assert_eq!(right.bottom, Point::new(1116, 720));
        assert_eq!(right.cutoff, Point::new(636, 432));
    }

    #[test]
    fn test_extreme_segment_does_not_abort_frame() {
        let mut state = LaneState::new();
        let out = process_frame(&[Segment::new(i32::MIN, 0, i32::MAX, 5)], 720, &mut state);

        // Nearly flat but positive: classified right, never left
        assert!(state.left.is_none());
        assert!(state.right.unwrap().slope > 0.0);
        assert!(out.has_issue(|i| *i == FrameIssue::EmptySideInput(Side::Left)));
    }

    #[test]
    fn test_estimate_never_reverts_to_unset() {
        let mut state = LaneState::new();
        process_frame(&[on_line(-0.7, 600.0, 100, 300)], 720, &mut state);
        assert!(state.left.is_some());

        for _ in 0..5 {
            process_frame(&[Segment::new(10, 0, 10, 100)], 720, &mut state);
            assert!(state.left.is_some());
        }
    }
}
