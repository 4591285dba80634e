//! Aggregation and scoring of comparison results.

mod report;

pub use report::{FileSummary, Grade, GradeScale, TagFrequency};

use std::collections::BTreeMap;

use crate::image::ImageFileResult;
use crate::model::TagId;
use crate::tags::{DifferenceKind, TagFileResult};

/// Number of tags shown in the cross-file ranking by default.
pub const DEFAULT_TOP_TAGS: usize = 15;

impl GradeScale {
    pub fn validate(&self) -> Result<(), String> {
        let thresholds = [
            ("a_plus", self.a_plus),
            ("a", self.a),
            ("b", self.b),
            ("c", self.c),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(format!(
                    "grade threshold '{name}' must be between 0 and 100, got {value}"
                ));
            }
        }
        for pair in thresholds.windows(2) {
            let ((hi_name, hi), (lo_name, lo)) = (pair[0], pair[1]);
            if hi <= lo {
                return Err(format!(
                    "grade thresholds must be strictly descending: '{hi_name}' ({hi}) <= '{lo_name}' ({lo})"
                ));
            }
        }
        Ok(())
    }

    pub fn grade(&self, integrity: f64) -> Grade {
        if integrity >= self.a_plus {
            Grade::APlus
        } else if integrity >= self.a {
            Grade::A
        } else if integrity >= self.b {
            Grade::B
        } else if integrity >= self.c {
            Grade::C
        } else {
            Grade::D
        }
    }
}

/// `part / whole * 100`, or 0 for an empty whole.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Scores one tag-mode file result.
pub fn summarize_tags(result: &TagFileResult, scale: &GradeScale) -> FileSummary {
    let base = result.total_baseline;
    let perfect = result.perfect_matches();
    let differing = result.instances_with_differences();
    let integrity = percent(perfect, base);

    FileSummary {
        baseline_label: result.baseline_label.clone(),
        comparison_label: result.comparison_label.clone(),
        total_baseline: base,
        total_comparison: result.total_comparison,
        matched: result.comparisons.len(),
        perfect_matches: perfect,
        perfect_match_percent: percent(perfect, base),
        tag_differences: Some(differing),
        tag_difference_percent: Some(percent(differing, base)),
        pixel_differences: None,
        pixel_difference_percent: None,
        pixel_failures: None,
        missing: result.missing.len(),
        missing_percent: percent(result.missing.len(), base),
        extra: result.extra.len(),
        extra_percent: percent(result.extra.len(), result.total_comparison),
        heuristic_matches: result.heuristic_matches(),
        data_integrity: integrity,
        grade: scale.grade(integrity),
        error: result.error.as_ref().map(|e| e.to_string()),
    }
}

/// Scores one image-mode file result. A perfect match is an exact pixel
/// match.
pub fn summarize_images(result: &ImageFileResult, scale: &GradeScale) -> FileSummary {
    let base = result.total_baseline;
    let perfect = result.exact_matches();
    let differing = result.pixel_differences();
    let integrity = percent(perfect, base);

    FileSummary {
        baseline_label: result.baseline_label.clone(),
        comparison_label: result.comparison_label.clone(),
        total_baseline: base,
        total_comparison: result.total_comparison,
        matched: result.comparisons.len(),
        perfect_matches: perfect,
        perfect_match_percent: percent(perfect, base),
        tag_differences: None,
        tag_difference_percent: None,
        pixel_differences: Some(differing),
        pixel_difference_percent: Some(percent(differing, base)),
        pixel_failures: Some(result.pixel_failures()),
        missing: result.missing.len(),
        missing_percent: percent(result.missing.len(), base),
        extra: result.extra.len(),
        extra_percent: percent(result.extra.len(), result.total_comparison),
        heuristic_matches: result.heuristic_matches(),
        data_integrity: integrity,
        grade: scale.grade(integrity),
        error: result.error.as_ref().map(|e| e.to_string()),
    }
}

/// Ranks tags by the number of matched instances they differed in, across
/// all files. Ties are broken by keyword.
pub fn rank_tags(results: &[TagFileResult], top_n: usize) -> Vec<TagFrequency> {
    let mut counts: BTreeMap<TagId, TagFrequency> = BTreeMap::new();

    for diff in results
        .iter()
        .flat_map(|r| &r.comparisons)
        .flat_map(|c| &c.differences)
    {
        let entry = counts.entry(diff.tag).or_insert_with(|| TagFrequency {
            tag: diff.tag.to_string(),
            keyword: diff.keyword.clone(),
            instances: 0,
            missing: 0,
            extra: 0,
            value: 0,
            type_: 0,
        });
        entry.instances += 1;
        match diff.kind {
            DifferenceKind::MissingTag => entry.missing += 1,
            DifferenceKind::ExtraTag => entry.extra += 1,
            DifferenceKind::ValueDiff => entry.value += 1,
            DifferenceKind::TypeDiff => entry.type_ += 1,
        }
    }

    let mut ranked: Vec<TagFrequency> = counts.into_values().collect();
    ranked.sort_by(|a, b| {
        b.instances
            .cmp(&a.instances)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    ranked.truncate(top_n);
    ranked
}
