//! Summary and scoring types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade derived from the data integrity percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Grade {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Lower bounds (inclusive, in percent) for each grade above D.
///
/// Thresholds must be finite, within `0..=100` and strictly descending;
/// anything below `c` is a D, so every percentage maps to exactly one grade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradeScale {
    pub a_plus: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            a_plus: 97.0,
            a: 93.0,
            b: 85.0,
            c: 70.0,
        }
    }
}

/// Per-comparison-file scores.
#[derive(Clone, Debug, Serialize)]
pub struct FileSummary {
    pub baseline_label: String,
    pub comparison_label: String,
    pub total_baseline: usize,
    pub total_comparison: usize,
    pub matched: usize,
    pub perfect_matches: usize,
    pub perfect_match_percent: f64,
    /// Tag mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_differences: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_difference_percent: Option<f64>,
    /// Image mode only; includes pixel failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_differences: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_difference_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_failures: Option<usize>,
    pub missing: usize,
    pub missing_percent: f64,
    pub extra: usize,
    pub extra_percent: f64,
    pub heuristic_matches: usize,
    pub data_integrity: f64,
    pub grade: Grade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How often one tag differed across all comparison files.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagFrequency {
    /// `(gggg,eeee)`.
    pub tag: String,
    pub keyword: String,
    /// Matched instances in which the tag differed.
    pub instances: usize,
    pub missing: usize,
    pub extra: usize,
    pub value: usize,
    #[serde(rename = "type")]
    pub type_: usize,
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} vs {}", self.comparison_label, self.baseline_label)?;
        if let Some(error) = &self.error {
            writeln!(f, "  Error:             {error}")?;
        }
        writeln!(
            f,
            "  Instances:         {} baseline, {} comparison, {} matched",
            self.total_baseline, self.total_comparison, self.matched
        )?;
        writeln!(
            f,
            "  Perfect matches:   {} ({:.1}%)",
            self.perfect_matches, self.perfect_match_percent
        )?;
        if let (Some(count), Some(pct)) = (self.tag_differences, self.tag_difference_percent) {
            writeln!(f, "  Tag differences:   {count} ({pct:.1}%)")?;
        }
        if let (Some(count), Some(pct)) = (self.pixel_differences, self.pixel_difference_percent)
        {
            writeln!(f, "  Pixel differences: {count} ({pct:.1}%)")?;
        }
        if let Some(failures) = self.pixel_failures.filter(|&n| n > 0) {
            writeln!(f, "  Pixel failures:    {failures}")?;
        }
        writeln!(
            f,
            "  Missing:           {} ({:.1}%)",
            self.missing, self.missing_percent
        )?;
        writeln!(
            f,
            "  Extra:             {} ({:.1}%)",
            self.extra, self.extra_percent
        )?;
        if self.heuristic_matches > 0 {
            writeln!(
                f,
                "  Heuristic matches: {} (series position)",
                self.heuristic_matches
            )?;
        }
        writeln!(
            f,
            "  Data integrity:    {:.1}%  Grade: {}",
            self.data_integrity, self.grade
        )
    }
}
