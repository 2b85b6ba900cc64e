// src/types.rs

use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub preprocessing: PreprocessingConfig,
    pub hough: HoughConfig,
    pub render: RenderConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

/// Line-extraction and smoothing constants.
///
/// Changing any of these changes which frames hold the previous estimate and
/// where the projected lines end, so they are kept at the values the pipeline
/// was tuned with unless a config file says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Weight given to the previous frame's accepted line when blending.
    pub smoothing_factor: f64,
    /// Fits with |slope| at or above this are treated as near-vertical noise.
    pub max_slope: f64,
    /// Upper extrapolation bound as a fraction of frame height.
    pub cutoff_ratio: f64,
    /// Suppress a lone line when the other side has no estimate.
    pub require_both_sides: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.8,
            max_slope: 1000.0,
            cutoff_ratio: 0.6,
            require_both_sides: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Per-channel lower bound for the white mask (upper bound is 255).
    pub white_lower: [u8; 3],
    /// HSV lower bound for the yellow mask (OpenCV hue scale, 0-179).
    pub yellow_hsv_lower: [u8; 3],
    pub yellow_hsv_upper: [u8; 3],
    pub blur_kernel: i32,
    pub canny_low: f64,
    pub canny_high: f64,
    /// Left/right x of the trapezoid's top edge as fractions of frame width.
    pub roi_top_left_x: f64,
    pub roi_top_right_x: f64,
    pub mask_value: u8,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            white_lower: [200, 200, 200],
            yellow_hsv_lower: [15, 60, 20],
            yellow_hsv_upper: [25, 255, 255],
            blur_kernel: 5,
            canny_low: 50.0,
            canny_high: 150.0,
            roi_top_left_x: 4.0 / 9.0,
            roi_top_right_x: 5.0 / 9.0,
            mask_value: 255,
        }
    }
}

/// Probabilistic Hough transform parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    pub rho: f64,
    pub theta: f64,
    pub threshold: i32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho: 2.0,
            theta: std::f64::consts::PI / 180.0,
            threshold: 15,
            min_line_length: 10.0,
            max_line_gap: 5.0,
        }
    }
}

/// Overlay drawing. Colors are BGR, matching OpenCV frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub thickness: i32,
    pub left_color: [u8; 3],
    pub right_color: [u8; 3],
    pub raw_segment_color: [u8; 3],
    pub draw_raw_segments: bool,
    /// Weight of the source frame in the final blend.
    pub source_weight: f64,
    /// Weight of the line overlay in the final blend.
    pub overlay_weight: f64,
    pub blend_offset: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            thickness: 10,
            left_color: [0, 255, 0],
            right_color: [255, 0, 0],
            raw_segment_color: [0, 0, 255],
            draw_raw_segments: false,
            source_weight: 0.8,
            overlay_weight: 0.6,
            blend_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub image_dir: String,
    pub video_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    pub save_annotated: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_dir: "test_videos".to_string(),
            output_dir: "test_videos_output".to_string(),
            image_dir: "test_images".to_string(),
            video_extensions: vec!["mp4".into(), "avi".into(), "mov".into(), "mkv".into()],
            image_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            save_annotated: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "lane_finder=info".to_string(),
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// A detected line piece in image pixel space, as produced by the Hough step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Segment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Slope and intercept of the line through both endpoints.
    ///
    /// Returns `None` for vertical segments (x1 == x2), whose slope is undefined.
    /// Differences are taken in f64 so extreme coordinates cannot overflow.
    pub fn slope_intercept(&self) -> Option<SlopeIntercept> {
        let dx = self.x2 as f64 - self.x1 as f64;
        if dx == 0.0 {
            return None;
        }
        let slope = (self.y2 as f64 - self.y1 as f64) / dx;
        let intercept = self.y1 as f64 - slope * self.x1 as f64;
        Some(SlopeIntercept { slope, intercept })
    }
}

/// A line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeIntercept {
    pub slope: f64,
    pub intercept: f64,
}

impl SlopeIntercept {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// x at which the line reaches `y`, or `None` for a horizontal line.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        if self.slope == 0.0 {
            return None;
        }
        let x = (self.intercept - y) / -self.slope;
        x.is_finite().then_some(x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Drawable representation of one lane line for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPair {
    /// Where the line meets the bottom edge of the frame.
    pub bottom: Point,
    /// Where the line meets the horizontal cutoff line.
    pub cutoff: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

// ============================================================================
// SESSION STATE
// ============================================================================

/// Smoothed lines accepted at the end of the previous frame.
///
/// A side stays `None` until it first receives a valid estimate; after that it
/// is only cleared by [`LaneState::reset`] at the start of a new session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneState {
    pub left: Option<SlopeIntercept>,
    pub right: Option<SlopeIntercept>,
}

impl LaneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, side: Side) -> Option<SlopeIntercept> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set(&mut self, side: Side, line: SlopeIntercept) {
        match side {
            Side::Left => self.left = Some(line),
            Side::Right => self.right = Some(line),
        }
    }

    pub fn is_estimated(&self, side: Side) -> bool {
        self.get(side).is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// FRAME OUTPUT
// ============================================================================

/// A recovered anomaly encountered while processing one frame.
///
/// None of these abort a session; they are reported so the driver can log and
/// count them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FrameIssue {
    /// Vertical segments skipped during classification.
    DegenerateSegments { count: usize },
    /// No segment was classified to this side.
    EmptySideInput(Side),
    /// The fitted slope was at or beyond the instability threshold.
    UnstableSlope { side: Side, slope: f64 },
    /// Left cutoff x was not strictly left of the right cutoff x.
    CrossedLines { left_cutoff_x: i32, right_cutoff_x: i32 },
    /// Neither a prior nor a usable current estimate exists for this side.
    NoEstimate(Side),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameOutput {
    pub left: Option<EndpointPair>,
    pub right: Option<EndpointPair>,
    pub issues: Vec<FrameIssue>,
}

impl FrameOutput {
    pub fn lines(&self) -> impl Iterator<Item = (Side, EndpointPair)> + '_ {
        self.left
            .map(|l| (Side::Left, l))
            .into_iter()
            .chain(self.right.map(|r| (Side::Right, r)))
    }

    pub fn has_both(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn has_issue(&self, pred: impl Fn(&FrameIssue) -> bool) -> bool {
        self.issues.iter().any(pred)
    }
}
