// src/detection/outlier_filter.rs

use crate::types::SlopeIntercept;

/// Lines that survived slope-outlier rejection for one side.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredGroup {
    pub lines: Vec<SlopeIntercept>,
    /// Set when rejection removed everything and the unfiltered group was kept.
    pub used_fallback: bool,
    pub slope_mean: f64,
    pub slope_std: f64,
}

/// Mean and population standard deviation.
pub(crate) fn mean_std(values: impl Iterator<Item = f64> + Clone) -> Option<(f64, f64)> {
    let n = values.clone().count();
    if n == 0 {
        return None;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    Some((mean, var.sqrt()))
}

/// Keep lines whose slope is strictly within one standard deviation of the
/// group's mean slope.
///
/// A line exactly one deviation away is rejected, so a group whose slopes are
/// all equal (std = 0) filters to nothing; in that case the whole group is
/// returned with `used_fallback` set, which averages to the unfiltered means.
/// Returns `None` for an empty group.
pub fn filter_outliers(lines: &[SlopeIntercept]) -> Option<FilteredGroup> {
    let (slope_mean, slope_std) = mean_std(lines.iter().map(|l| l.slope))?;

    let kept: Vec<SlopeIntercept> = lines
        .iter()
        .filter(|l| (l.slope - slope_mean).abs() < slope_std)
        .copied()
        .collect();

    let used_fallback = kept.is_empty();
    Some(FilteredGroup {
        lines: if used_fallback { lines.to_vec() } else { kept },
        used_fallback,
        slope_mean,
        slope_std,
    })
}
