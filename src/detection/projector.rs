// src/detection/projector.rs

use crate::types::{DetectionConfig, EndpointPair, Point, PreprocessingConfig, SlopeIntercept};

/// Extrapolates smoothed lines between the bottom edge and the cutoff line.
#[derive(Debug, Clone, Copy)]
pub struct GeometryProjector {
    cutoff_ratio: f64,
}

impl Default for GeometryProjector {
    fn default() -> Self {
        Self::new(DetectionConfig::default().cutoff_ratio)
    }
}

impl GeometryProjector {
    pub fn new(cutoff_ratio: f64) -> Self {
        Self { cutoff_ratio }
    }

    pub fn cutoff_y(&self, frame_height: u32) -> f64 {
        frame_height as f64 * self.cutoff_ratio
    }

    /// Endpoints of `line` at y = H and y = cutoff. X is truncated toward zero.
    ///
    /// `None` for a horizontal line or when either x is not finite.
    pub fn project(&self, line: &SlopeIntercept, frame_height: u32) -> Option<EndpointPair> {
        let bottom_y = frame_height as f64;
        let cutoff_y = self.cutoff_y(frame_height);

        let bottom_x = line.x_at(bottom_y)?;
        let cutoff_x = line.x_at(cutoff_y)?;

        Some(EndpointPair {
            bottom: Point::new(bottom_x as i32, bottom_y as i32),
            cutoff: Point::new(cutoff_x as i32, cutoff_y as i32),
        })
    }
}

/// The pair is drawable only if the left line stays strictly left of the
/// right line at the cutoff.
pub fn lines_uncrossed(left: &EndpointPair, right: &EndpointPair) -> bool {
    left.cutoff.x < right.cutoff.x
}

/// Region-of-interest trapezoid: bottom corners of the frame and a narrow top
/// edge on the cutoff line. Vertices are ordered bottom-left, top-left,
/// top-right, bottom-right.
pub fn roi_vertices(
    width: u32,
    height: u32,
    cutoff_ratio: f64,
    config: &PreprocessingConfig,
) -> [Point; 4] {
    let w = width as f64;
    let h = height as f64;
    let top_y = (h * cutoff_ratio) as i32;
    [
        Point::new(0, height as i32),
        Point::new((w * config.roi_top_left_x) as i32, top_y),
        Point::new((w * config.roi_top_right_x) as i32, top_y),
        Point::new(width as i32, height as i32),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_projection() {
        let projector = GeometryProjector::default();
        let pair = projector
            .project(&SlopeIntercept::new(-0.7, 600.0), 720)
            .unwrap();

        // (600 - 720) / 0.7 = -171.43: the line leaves the frame on the left
        assert_eq!(pair.bottom, Point::new(-171, 720));
        // (600 - 432) / 0.7 = 240
        assert_eq!(pair.cutoff.y, 432);
        assert!((pair.cutoff.x - 240).abs() <= 1);
    }

    #[test]
    fn test_right_projection() {
        let projector = GeometryProjector::default();
        let pair = projector.project(&SlopeIntercept::new(0.6, 50.0), 720).unwrap();

        // (50 - 720) / -0.6 = 1116.67, truncated
        assert_eq!(pair.bottom, Point::new(1116, 720));
        // (50 - 432) / -0.6 = 636.67
        assert_eq!(pair.cutoff, Point::new(636, 432));
    }

    #[test]
    fn test_truncates_toward_zero() {
        let projector = GeometryProjector::default();
        // bottom x = (0 - 100) / 0.3 = -333.3 -> -333
        let pair = projector.project(&SlopeIntercept::new(-0.3, 0.0), 100).unwrap();
        assert_eq!(pair.bottom.x, -333);
    }

    #[test]
    fn test_horizontal_line_not_projectable() {
        let projector = GeometryProjector::default();
        assert!(projector.project(&SlopeIntercept::new(0.0, 400.0), 720).is_none());
    }

    #[test]
    fn test_crossed_lines() {
        let pair = |cutoff_x| EndpointPair {
            bottom: Point::new(0, 720),
            cutoff: Point::new(cutoff_x, 432),
        };
        assert!(!lines_uncrossed(&pair(500), &pair(480)));
        assert!(!lines_uncrossed(&pair(500), &pair(500)));
        assert!(lines_uncrossed(&pair(480), &pair(500)));
    }

    #[test]
    fn test_roi_vertices() {
        let v = roi_vertices(960, 540, 0.6, &PreprocessingConfig::default());
        assert_eq!(v[0], Point::new(0, 540));
        assert_eq!(v[1], Point::new(426, 324));
        assert_eq!(v[2], Point::new(533, 324));
        assert_eq!(v[3], Point::new(960, 540));
    }
}
