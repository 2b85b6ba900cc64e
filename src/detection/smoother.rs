// src/detection/smoother.rs
//
// Recursive exponential smoothing of the per-side line fit across frames.
// Unlike a sliding window, every past frame keeps a geometrically decaying
// share of the estimate for the whole session.

use crate::types::{DetectionConfig, SlopeIntercept};

/// What happened to one side's estimate this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothOutcome {
    /// First valid fit for this side, accepted as-is.
    Bootstrapped(SlopeIntercept),
    /// Previous estimate blended with this frame's fit.
    Blended(SlopeIntercept),
    /// This frame gave no usable fit; previous estimate carried forward.
    Held(SlopeIntercept),
    /// No previous estimate and no usable fit.
    NoEstimate,
}

impl SmoothOutcome {
    pub fn line(&self) -> Option<SlopeIntercept> {
        match *self {
            SmoothOutcome::Bootstrapped(l) | SmoothOutcome::Blended(l) | SmoothOutcome::Held(l) => {
                Some(l)
            }
            SmoothOutcome::NoEstimate => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TemporalSmoother {
    /// Retention factor for the previous estimate.
    smoothing_factor: f64,
    max_slope: f64,
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl TemporalSmoother {
    pub fn new(smoothing_factor: f64, max_slope: f64) -> Self {
        Self {
            smoothing_factor,
            max_slope,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.smoothing_factor, config.max_slope)
    }

    /// A fit is usable when its slope is finite and below the instability threshold.
    pub fn is_stable(&self, line: &SlopeIntercept) -> bool {
        line.slope.is_finite() && line.intercept.is_finite() && line.slope.abs() < self.max_slope
    }

    /// Combine the previous accepted line with this frame's fit.
    ///
    /// `current` is `None` when the side had no segments this frame.
    pub fn smooth(
        &self,
        previous: Option<SlopeIntercept>,
        current: Option<SlopeIntercept>,
    ) -> SmoothOutcome {
        let current = current.filter(|c| self.is_stable(c));

        match (previous, current) {
            (Some(prev), Some(cur)) => SmoothOutcome::Blended(self.blend(prev, cur)),
            (None, Some(cur)) => SmoothOutcome::Bootstrapped(cur),
            (Some(prev), None) => SmoothOutcome::Held(prev),
            (None, None) => SmoothOutcome::NoEstimate,
        }
    }

    fn blend(&self, prev: SlopeIntercept, cur: SlopeIntercept) -> SlopeIntercept {
        let keep = self.smoothing_factor;
        let take = 1.0 - keep;
        SlopeIntercept {
            slope: prev.slope * keep + cur.slope * take,
            intercept: prev.intercept * keep + cur.intercept * take,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_weights() {
        let smoother = TemporalSmoother::default();
        let out = smoother.smooth(
            Some(SlopeIntercept::new(-0.7, 500.0)),
            Some(SlopeIntercept::new(-0.5, 480.0)),
        );
        let SmoothOutcome::Blended(line) = out else {
            panic!("expected blend, got {out:?}");
        };
        assert!((line.slope - (-0.66)).abs() < 1e-9);
        assert!((line.intercept - 496.0).abs() < 1e-9);
    }

    #[test]
    fn test_bootstrap_without_prior() {
        let smoother = TemporalSmoother::default();
        let fit = SlopeIntercept::new(0.6, 50.0);
        assert_eq!(smoother.smooth(None, Some(fit)), SmoothOutcome::Bootstrapped(fit));
    }

    #[test]
    fn test_unstable_slope_holds_prior() {
        let smoother = TemporalSmoother::default();
        let prev = SlopeIntercept::new(-0.7, 600.0);
        let steep = SlopeIntercept::new(-1500.0, 90000.0);
        assert_eq!(smoother.smooth(Some(prev), Some(steep)), SmoothOutcome::Held(prev));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let smoother = TemporalSmoother::default();
        let at_threshold = SlopeIntercept::new(1000.0, 0.0);
        assert!(!smoother.is_stable(&at_threshold));
        assert_eq!(smoother.smooth(None, Some(at_threshold)), SmoothOutcome::NoEstimate);
        assert!(smoother.is_stable(&SlopeIntercept::new(999.999, 0.0)));
    }

    #[test]
    fn test_missing_fit_holds_prior() {
        let smoother = TemporalSmoother::default();
        let prev = SlopeIntercept::new(0.6, 50.0);
        assert_eq!(smoother.smooth(Some(prev), None), SmoothOutcome::Held(prev));
        assert_eq!(smoother.smooth(None, None), SmoothOutcome::NoEstimate);
    }

    #[test]
    fn test_nan_fit_is_unstable() {
        let smoother = TemporalSmoother::default();
        assert!(!smoother.is_stable(&SlopeIntercept::new(f64::NAN, 0.0)));
    }

    #[test]
    fn test_converges_to_repeated_fit() {
        let smoother = TemporalSmoother::default();
        let target = SlopeIntercept::new(-0.5, 480.0);
        let mut state = Some(SlopeIntercept::new(-0.9, 700.0));

        for _ in 0..200 {
            state = smoother.smooth(state, Some(target)).line();
        }

        let line = state.unwrap();
        assert!((line.slope - target.slope).abs() < 1e-9);
        assert!((line.intercept - target.intercept).abs() < 1e-9);
    }
}
