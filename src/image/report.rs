//! Image comparison result types.

use std::fmt;

use serde::Serialize;

use crate::matching::{InstanceRef, MatchMethod, StructuralError};
use crate::model::format_shape;

/// Which side of a pair a problem was found on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Baseline,
    Comparison,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Baseline => f.write_str("baseline"),
            Side::Comparison => f.write_str("comparison"),
        }
    }
}

/// Pixel statistics for two arrays of equal shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PixelStats {
    pub exact_match: bool,
    pub differing_pixels: usize,
    pub total_pixels: usize,
    pub similarity_percent: f64,
    pub rmse: f64,
    pub max_abs_diff: f64,
    pub mean_abs_diff: f64,
}

impl PixelStats {
    /// Stats for two identical arrays of `total` samples.
    pub fn identical(total: usize) -> Self {
        Self {
            exact_match: true,
            differing_pixels: 0,
            total_pixels: total,
            similarity_percent: 100.0,
            rmse: 0.0,
            max_abs_diff: 0.0,
            mean_abs_diff: 0.0,
        }
    }
}

/// Outcome of comparing the pixel payloads of one matched pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImageOutcome {
    Compared(PixelStats),
    /// At least one side has no pixel payload.
    MissingPixelData {
        baseline_missing: bool,
        comparison_missing: bool,
    },
    DimensionMismatch {
        baseline: Vec<usize>,
        comparison: Vec<usize>,
    },
    DecodeFailure {
        side: Side,
        reason: String,
    },
}

impl ImageOutcome {
    /// Report label for this outcome.
    pub fn difference_type(&self) -> &'static str {
        match self {
            ImageOutcome::Compared(stats) if stats.exact_match => "EXACT_MATCH",
            ImageOutcome::Compared(_) => "PIXEL_VALUE_DIFF",
            ImageOutcome::MissingPixelData { .. } => "MISSING_PIXEL_DATA",
            ImageOutcome::DimensionMismatch { .. } => "DIMENSION_DIFF",
            ImageOutcome::DecodeFailure { .. } => "DECODE_FAILURE",
        }
    }

    pub fn stats(&self) -> Option<&PixelStats> {
        match self {
            ImageOutcome::Compared(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn is_exact_match(&self) -> bool {
        self.stats().is_some_and(|s| s.exact_match)
    }

    /// True for outcomes where no pixel statistics could be computed.
    pub fn is_failure(&self) -> bool {
        self.stats().is_none()
    }
}

/// Image comparison of one matched pair.
#[derive(Clone, Debug, Serialize)]
pub struct ImageComparison {
    pub baseline_index: usize,
    pub comparison_index: usize,
    pub instance_id: String,
    pub method: MatchMethod,
    /// Shape labels, `None` when the side has no usable payload.
    pub baseline_shape: Option<Vec<usize>>,
    pub comparison_shape: Option<Vec<usize>>,
    pub outcome: ImageOutcome,
}

impl ImageComparison {
    pub fn baseline_shape_label(&self) -> String {
        shape_label(self.baseline_shape.as_deref())
    }

    pub fn comparison_shape_label(&self) -> String {
        shape_label(self.comparison_shape.as_deref())
    }
}

fn shape_label(shape: Option<&[usize]>) -> String {
    shape.map(format_shape).unwrap_or_default()
}

/// Result of comparing the pixel payloads of one comparison export.
#[derive(Clone, Debug)]
pub struct ImageFileResult {
    pub baseline_label: String,
    pub comparison_label: String,
    pub comparisons: Vec<ImageComparison>,
    pub missing: Vec<InstanceRef>,
    pub extra: Vec<InstanceRef>,
    pub total_baseline: usize,
    pub total_comparison: usize,
    pub tolerance: f64,
    pub normalize: bool,
    pub error: Option<StructuralError>,
}

impl ImageFileResult {
    pub fn exact_matches(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.outcome.is_exact_match())
            .count()
    }

    /// Pairs that are not an exact match, failures included.
    pub fn pixel_differences(&self) -> usize {
        self.comparisons.len() - self.exact_matches()
    }

    pub fn pixel_failures(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.outcome.is_failure())
            .count()
    }

    pub fn heuristic_matches(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.method.is_heuristic())
            .count()
    }
}
