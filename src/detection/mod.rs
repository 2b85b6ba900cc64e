// src/detection/mod.rs
//
// Per-frame line extraction, leaves first:
//   segments → classifier → outlier_filter → line_fitter → smoother → projector

mod classifier;
mod line_fitter;
mod outlier_filter;
mod projector;
mod smoother;

pub use classifier::{classify_segments, ClassifiedSegments};
pub use line_fitter::fit_line;
pub use outlier_filter::{filter_outliers, FilteredGroup};
pub use projector::{lines_uncrossed, roi_vertices, GeometryProjector};
pub use smoother::{SmoothOutcome, TemporalSmoother};
