use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists. A missing file is `Ok(None)`; the caller
    /// picks the fallback and reports it once logging is up.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if !(0.0..=1.0).contains(&d.smoothing_factor) {
            bail!("detection.smoothing_factor must be in [0, 1], got {}", d.smoothing_factor);
        }
        if d.max_slope.is_nan() || d.max_slope <= 0.0 {
            bail!("detection.max_slope must be positive, got {}", d.max_slope);
        }
        if d.cutoff_ratio.is_nan() || d.cutoff_ratio <= 0.0 || d.cutoff_ratio >= 1.0 {
            bail!("detection.cutoff_ratio must be in (0, 1), got {}", d.cutoff_ratio);
        }

        let p = &self.preprocessing;
        if p.blur_kernel <= 0 || p.blur_kernel % 2 == 0 {
            bail!("preprocessing.blur_kernel must be odd and positive, got {}", p.blur_kernel);
        }
        if p.canny_low > p.canny_high {
            bail!(
                "preprocessing.canny_low ({}) exceeds canny_high ({})",
                p.canny_low,
                p.canny_high
            );
        }
        let roi_ok = 0.0 <= p.roi_top_left_x
            && p.roi_top_left_x <= p.roi_top_right_x
            && p.roi_top_right_x <= 1.0;
        if !roi_ok {
            bail!(
                "preprocessing ROI top edge must satisfy 0 <= left ({}) <= right ({}) <= 1",
                p.roi_top_left_x,
                p.roi_top_right_x
            );
        }

        let h = &self.hough;
        if h.rho <= 0.0 || h.theta <= 0.0 {
            bail!("hough.rho and hough.theta must be positive");
        }

        if self.render.thickness <= 0 {
            bail!("render.thickness must be positive, got {}", self.render.thickness);
        }

        Ok(())
    }
}
