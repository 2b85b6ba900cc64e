// src/preprocessing.rs
//
// Raw BGR frame → Hough line segments.
//
//   white (BGR) ∪ yellow (HSV) color mask → grayscale → Gaussian blur
//   → Canny → region-of-interest trapezoid → probabilistic Hough

use crate::detection::roi_vertices;
use crate::types::{HoughConfig, PreprocessingConfig, Segment};
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vector},
    imgproc,
    prelude::*,
};
use tracing::debug;

pub struct SegmentExtractor {
    preprocessing: PreprocessingConfig,
    hough: HoughConfig,
    cutoff_ratio: f64,
}

impl SegmentExtractor {
    pub fn new(preprocessing: PreprocessingConfig, hough: HoughConfig, cutoff_ratio: f64) -> Self {
        Self {
            preprocessing,
            hough,
            cutoff_ratio,
        }
    }

    pub fn extract(&self, frame: &Mat) -> Result<Vec<Segment>> {
        let color_masked = self.color_mask(frame)?;

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&color_masked, &mut gray, imgproc::COLOR_BGR2GRAY)?;

        let k = self.preprocessing.blur_kernel;
        let mut blurred = Mat::default();
        imgproc::gaussian_blur_def(&gray, &mut blurred, Size::new(k, k), 0.0)?;

        let mut edges = Mat::default();
        imgproc::canny_def(
            &blurred,
            &mut edges,
            self.preprocessing.canny_low,
            self.preprocessing.canny_high,
        )?;

        let masked_edges = self.region_of_interest(&edges)?;

        let mut lines = Vector::<core::Vec4i>::new();
        imgproc::hough_lines_p(
            &masked_edges,
            &mut lines,
            self.hough.rho,
            self.hough.theta,
            self.hough.threshold,
            self.hough.min_line_length,
            self.hough.max_line_gap,
        )?;

        let segments: Vec<Segment> = lines
            .iter()
            .map(|l| Segment::new(l[0], l[1], l[2], l[3]))
            .collect();

        debug!("Hough produced {} segments", segments.len());
        Ok(segments)
    }

    /// Keep only white or yellow pixels; everything else goes black.
    fn color_mask(&self, frame: &Mat) -> Result<Mat> {
        let p = &self.preprocessing;

        let mut white = Mat::default();
        core::in_range(
            frame,
            &scalar3(p.white_lower),
            &Scalar::all(255.0),
            &mut white,
        )?;

        let mut hsv = Mat::default();
        imgproc::cvt_color_def(frame, &mut hsv, imgproc::COLOR_BGR2HSV)?;
        let mut yellow = Mat::default();
        core::in_range(
            &hsv,
            &scalar3(p.yellow_hsv_lower),
            &scalar3(p.yellow_hsv_upper),
            &mut yellow,
        )?;

        let mut mask = Mat::default();
        core::bitwise_or_def(&white, &yellow, &mut mask)?;

        let mut masked = Mat::new_rows_cols_with_default(
            frame.rows(),
            frame.cols(),
            frame.typ(),
            Scalar::all(0.0),
        )?;
        frame.copy_to_masked(&mut masked, &mask)?;
        Ok(masked)
    }

    fn region_of_interest(&self, edges: &Mat) -> Result<Mat> {
        let vertices = roi_vertices(
            edges.cols() as u32,
            edges.rows() as u32,
            self.cutoff_ratio,
            &self.preprocessing,
        );
        let polygon: Vector<Point> = vertices.iter().map(|v| Point::new(v.x, v.y)).collect();
        let polygons: Vector<Vector<Point>> = std::iter::once(polygon).collect();

        let mut mask = Mat::new_rows_cols_with_default(
            edges.rows(),
            edges.cols(),
            edges.typ(),
            Scalar::all(0.0),
        )?;
        imgproc::fill_poly_def(
            &mut mask,
            &polygons,
            Scalar::all(self.preprocessing.mask_value as f64),
        )?;

        let mut masked = Mat::default();
        core::bitwise_and_def(edges, &mask, &mut masked)?;
        Ok(masked)
    }
}

fn scalar3(c: [u8; 3]) -> Scalar {
    Scalar::new(c[0] as f64, c[1] as f64, c[2] as f64, 0.0)
}
