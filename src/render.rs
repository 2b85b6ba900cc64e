// src/render.rs

use crate::types::{EndpointPair, FrameOutput, RenderConfig, Segment, Side};
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Scalar},
    imgproc,
    prelude::*,
};

pub struct LaneRenderer {
    config: RenderConfig,
}

impl LaneRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Draw the lane lines on a black overlay and blend it onto `frame`:
    /// `frame * source_weight + overlay * overlay_weight + blend_offset`.
    pub fn render(&self, frame: &Mat, output: &FrameOutput, raw: &[Segment]) -> Result<Mat> {
        let mut overlay = Mat::new_rows_cols_with_default(
            frame.rows(),
            frame.cols(),
            frame.typ(),
            Scalar::all(0.0),
        )?;

        if self.config.draw_raw_segments {
            let color = bgr(self.config.raw_segment_color);
            for s in raw {
                imgproc::line(
                    &mut overlay,
                    Point::new(s.x1, s.y1),
                    Point::new(s.x2, s.y2),
                    color,
                    2,
                    imgproc::LINE_8,
                    0,
                )?;
            }
        }

        for (side, pair) in output.lines() {
            self.draw_line(&mut overlay, side, &pair)?;
        }

        let mut blended = Mat::default();
        core::add_weighted(
            frame,
            self.config.source_weight,
            &overlay,
            self.config.overlay_weight,
            self.config.blend_offset,
            &mut blended,
            -1,
        )?;
        Ok(blended)
    }

    fn draw_line(&self, overlay: &mut Mat, side: Side, pair: &EndpointPair) -> Result<()> {
        let color = match side {
            Side::Left => bgr(self.config.left_color),
            Side::Right => bgr(self.config.right_color),
        };
        imgproc::line(
            overlay,
            Point::new(pair.bottom.x, pair.bottom.y),
            Point::new(pair.cutoff.x, pair.cutoff.y),
            color,
            self.config.thickness,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }
}

fn bgr(c: [u8; 3]) -> Scalar {
    Scalar::new(c[0] as f64, c[1] as f64, c[2] as f64, 0.0)
}
