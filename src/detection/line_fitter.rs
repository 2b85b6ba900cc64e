// src/detection/line_fitter.rs
//
// Fits in slope/intercept space: every segment counts once regardless of its
// pixel length. No least-squares over raw endpoints.

use crate::types::SlopeIntercept;

/// Arithmetic mean of slopes and of intercepts. `None` for an empty group.
pub fn fit_line(lines: &[SlopeIntercept]) -> Option<SlopeIntercept> {
    if lines.is_empty() {
        return None;
    }
    let n = lines.len() as f64;
    let slope = lines.iter().map(|l| l.slope).sum::<f64>() / n;
    let intercept = lines.iter().map(|l| l.intercept).sum::<f64>() / n;
    Some(SlopeIntercept { slope, intercept })
}
