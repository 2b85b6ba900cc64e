// src/detection/classifier.rs

use crate::types::{Segment, SlopeIntercept};

/// Segments split by slope sign, each reduced to its (slope, intercept).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedSegments {
    /// Negative slope: rises to the right in image space, i.e. the left lane line.
    pub left: Vec<SlopeIntercept>,
    pub right: Vec<SlopeIntercept>,
    /// Vertical segments that could not be classified.
    pub degenerate: usize,
    /// Horizontal segments dropped from both sides.
    pub horizontal: usize,
}

pub fn classify_segments(segments: &[Segment]) -> ClassifiedSegments {
    let mut out = ClassifiedSegments::default();

    for segment in segments {
        let Some(line) = segment.slope_intercept() else {
            out.degenerate += 1;
            continue;
        };

        if line.slope < 0.0 {
            out.left.push(line);
        } else if line.slope > 0.0 {
            out.right.push(line);
        } else {
            out.horizontal += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_slope_sign() {
        let segments = [
            Segment::new(100, 700, 300, 560), // left
            Segment::new(900, 560, 1100, 700), // right
            Segment::new(0, 400, 200, 400),   // horizontal
        ];
        let classified = classify_segments(&segments);

        assert_eq!(classified.left.len(), 1);
        assert_eq!(classified.right.len(), 1);
        assert_eq!(classified.horizontal, 1);
        assert_eq!(classified.degenerate, 0);
        assert!(classified.left[0].slope < 0.0);
        assert!(classified.right[0].slope > 0.0);
    }

    #[test]
    fn test_vertical_segment_is_skipped() {
        let segments = [Segment::new(640, 720, 640, 500), Segment::new(100, 700, 300, 560)];
        let classified = classify_segments(&segments);

        assert_eq!(classified.degenerate, 1);
        assert_eq!(classified.left.len(), 1);
        assert!(classified.right.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let classified = classify_segments(&[]);
        assert_eq!(classified, ClassifiedSegments::default());
    }
}
