//! Tag comparison result types.

use std::fmt;

use serde::Serialize;

use crate::matching::{InstanceRef, MatchMethod, StructuralError};
use crate::model::{TagId, TagValue};

/// Rendered in place of a value that does not exist on one side.
pub const NULL_VALUE: &str = "NULL";

/// Kind of a per-tag difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceKind {
    /// Present in both, values differ (or one side is undecodable).
    ValueDiff,
    /// Present in the baseline only.
    MissingTag,
    /// Present in the comparison only.
    ExtraTag,
    /// Present in both with different value types.
    TypeDiff,
}

impl DifferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifferenceKind::ValueDiff => "VALUE_DIFF",
            DifferenceKind::MissingTag => "MISSING_TAG",
            DifferenceKind::ExtraTag => "EXTRA_TAG",
            DifferenceKind::TypeDiff => "TYPE_DIFF",
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One differing tag within a matched instance pair.
#[derive(Clone, Debug, PartialEq)]
pub struct TagDifference {
    pub tag: TagId,
    /// Dictionary keyword, or `(gggg,eeee)` for unknown and private tags.
    pub keyword: String,
    /// VR code, taken from the baseline when present.
    pub vr: String,
    pub baseline: Option<TagValue>,
    pub comparison: Option<TagValue>,
    pub kind: DifferenceKind,
}

impl TagDifference {
    pub fn baseline_text(&self) -> String {
        value_text(self.baseline.as_ref())
    }

    pub fn comparison_text(&self) -> String {
        value_text(self.comparison.as_ref())
    }
}

fn value_text(value: Option<&TagValue>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NULL_VALUE.to_string())
}

/// Tag comparison of one matched instance pair.
#[derive(Clone, Debug)]
pub struct InstanceComparison {
    /// Index into the baseline export.
    pub baseline_index: usize,
    /// Index into the comparison export.
    pub comparison_index: usize,
    /// SOP Instance UID (or a path-based stand-in when it is missing).
    pub instance_id: String,
    pub method: MatchMethod,
    pub differences: Vec<TagDifference>,
}

impl InstanceComparison {
    pub fn is_perfect_match(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Result of comparing the tags of one comparison export to the baseline.
#[derive(Clone, Debug)]
pub struct TagFileResult {
    pub baseline_label: String,
    pub comparison_label: String,
    pub comparisons: Vec<InstanceComparison>,
    pub missing: Vec<InstanceRef>,
    pub extra: Vec<InstanceRef>,
    pub total_baseline: usize,
    pub total_comparison: usize,
    /// Set when either export could not be compared; the lists are then
    /// empty.
    pub error: Option<StructuralError>,
}

impl TagFileResult {
    pub fn perfect_matches(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.is_perfect_match())
            .count()
    }

    /// Matched instances with at least one tag difference.
    pub fn instances_with_differences(&self) -> usize {
        self.comparisons.len() - self.perfect_matches()
    }

    pub fn heuristic_matches(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.method.is_heuristic())
            .count()
    }

    pub fn total_differences(&self) -> usize {
        self.comparisons.iter().map(|c| c.differences.len()).sum()
    }
}
