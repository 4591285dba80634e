//! Metadata tag comparison.
//!
//! For each matched instance pair every tag in the union of both tag maps is
//! classified as missing, extra, type-changed or value-changed. Excluded tags
//! are skipped entirely; a tag that failed to decode is reported as a value
//! difference and never stops the rest of the comparison.

mod report;

pub use report::{
    DifferenceKind, InstanceComparison, TagDifference, TagFileResult, NULL_VALUE,
};

use std::collections::{BTreeMap, BTreeSet};

use crate::matching::{check_export, match_instances, pair_id};
use crate::model::{Export, Instance, TagElement, TagId, TagMap, TagValue, ValueKind};

/// Tags that routinely differ between export pipelines.
pub const DEFAULT_EXCLUDED_TAGS: [TagId; 8] = [
    TagId::new(0x0002, 0x0013), // ImplementationVersionName
    TagId::new(0x0002, 0x0016), // SourceApplicationEntityTitle
    TagId::new(0x0008, 0x0012), // InstanceCreationDate
    TagId::new(0x0008, 0x0013), // InstanceCreationTime
    TagId::new(0x0008, 0x0080), // InstitutionName
    TagId::new(0x0008, 0x1010), // StationName
    TagId::new(0x0008, 0x1040), // InstitutionalDepartmentName
    TagId::new(0x0018, 0x1020), // SoftwareVersions
];

/// Tag comparison options.
#[derive(Clone, Debug)]
pub struct TagCompareOptions {
    /// Tags never compared.
    pub excluded: BTreeSet<TagId>,
    /// Numeric tags compared with an absolute tolerance instead of exactly.
    pub tolerances: BTreeMap<TagId, f64>,
}

impl Default for TagCompareOptions {
    fn default() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED_TAGS.into_iter().collect(),
            tolerances: BTreeMap::new(),
        }
    }
}

impl TagCompareOptions {
    /// Options with an empty exclusion list.
    pub fn without_exclusions() -> Self {
        Self {
            excluded: BTreeSet::new(),
            tolerances: BTreeMap::new(),
        }
    }

    pub fn is_excluded(&self, tag: TagId) -> bool {
        self.excluded.contains(&tag)
    }

    fn tolerance_for(&self, tag: TagId) -> Option<f64> {
        self.tolerances.get(&tag).copied()
    }
}

/// Compares the tags of one export against the baseline.
///
/// Structural problems with either export are recorded on the result rather
/// than returned as an error.
pub fn compare_export_tags(
    baseline: &Export,
    comparison: &Export,
    opts: &TagCompareOptions,
) -> TagFileResult {
    let mut result = TagFileResult {
        baseline_label: baseline.label.clone(),
        comparison_label: comparison.label.clone(),
        comparisons: Vec::new(),
        missing: Vec::new(),
        extra: Vec::new(),
        total_baseline: baseline.len(),
        total_comparison: comparison.len(),
        error: None,
    };

    if let Err(err) = check_export(baseline).and_then(|_| check_export(comparison)) {
        result.error = Some(err);
        return result;
    }

    let matching = match_instances(&baseline.instances, &comparison.instances);

    for pair in &matching.pairs {
        let b = &baseline.instances[pair.baseline];
        let c = &comparison.instances[pair.comparison];
        result.comparisons.push(InstanceComparison {
            baseline_index: pair.baseline,
            comparison_index: pair.comparison,
            instance_id: pair_id(b, c),
            method: pair.method,
            differences: compare_instance_tags(b, c, opts),
        });
    }

    result.missing = matching.missing_refs(&baseline.instances);
    result.extra = matching.extra_refs(&comparison.instances);

    result
}

/// Compares the tag maps of a matched pair.
pub fn compare_instance_tags(
    baseline: &Instance,
    comparison: &Instance,
    opts: &TagCompareOptions,
) -> Vec<TagDifference> {
    compare_tag_maps(&baseline.tags, &comparison.tags, opts)
}

/// Produces one difference record per differing tag, in tag order.
pub fn compare_tag_maps(
    baseline: &TagMap,
    comparison: &TagMap,
    opts: &TagCompareOptions,
) -> Vec<TagDifference> {
    let all_tags: BTreeSet<TagId> = baseline.keys().chain(comparison.keys()).copied().collect();

    let mut differences = Vec::new();
    for tag in all_tags {
        if opts.is_excluded(tag) {
            continue;
        }

        let b = baseline.get(&tag);
        let c = comparison.get(&tag);
        let kind = match (b, c) {
            (Some(_), None) => Some(DifferenceKind::MissingTag),
            (None, Some(_)) => Some(DifferenceKind::ExtraTag),
            (Some(b), Some(c)) => classify(&b.value, &c.value, opts.tolerance_for(tag), opts),
            (None, None) => None,
        };

        if let Some(kind) = kind {
            differences.push(difference(tag, b, c, kind));
        }
    }
    differences
}

fn difference(
    tag: TagId,
    baseline: Option<&TagElement>,
    comparison: Option<&TagElement>,
    kind: DifferenceKind,
) -> TagDifference {
    let vr = baseline
        .or(comparison)
        .map(TagElement::vr_code)
        .unwrap_or_default();

    TagDifference {
        tag,
        keyword: tag.display_name(),
        vr,
        baseline: baseline.map(|e| e.value.clone()),
        comparison: comparison.map(|e| e.value.clone()),
        kind,
    }
}

/// Classifies two present values; `None` means equal.
fn classify(
    baseline: &TagValue,
    comparison: &TagValue,
    tolerance: Option<f64>,
    opts: &TagCompareOptions,
) -> Option<DifferenceKind> {
    if baseline.is_undecodable() || comparison.is_undecodable() {
        return Some(DifferenceKind::ValueDiff);
    }

    let (kind_b, kind_c) = (baseline.kind(), comparison.kind());
    if kind_b != kind_c && kind_b != ValueKind::Empty && kind_c != ValueKind::Empty {
        return Some(DifferenceKind::TypeDiff);
    }

    if values_equal(baseline, comparison, tolerance, opts) {
        None
    } else {
        Some(DifferenceKind::ValueDiff)
    }
}

/// Value equality. Sequences recurse positionally; undecodable values are
/// never equal to anything.
fn values_equal(
    a: &TagValue,
    b: &TagValue,
    tolerance: Option<f64>,
    opts: &TagCompareOptions,
) -> bool {
    match (a, b) {
        (TagValue::Text(x), TagValue::Text(y)) => x == y,
        (TagValue::Int(x), TagValue::Int(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|(&p, &q)| p == q || numbers_close(p as f64, q as f64, tolerance))
        }
        (TagValue::Float(x), TagValue::Float(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|(&p, &q)| numbers_close(p, q, tolerance))
        }
        (TagValue::Sequence(x), TagValue::Sequence(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| maps_equal(p, q, opts))
        }
        (TagValue::Binary(x), TagValue::Binary(y)) => x == y,
        (TagValue::Empty, TagValue::Empty) => true,
        _ => false,
    }
}

fn maps_equal(a: &TagMap, b: &TagMap, opts: &TagCompareOptions) -> bool {
    a.len() == b.len()
        && a.iter().all(|(tag, element)| {
            b.get(tag).is_some_and(|other| {
                values_equal(&element.value, &other.value, opts.tolerance_for(*tag), opts)
            })
        })
}

fn numbers_close(a: f64, b: f64, tolerance: Option<f64>) -> bool {
    if a == b || (a.is_nan() && b.is_nan()) {
        return true;
    }
    tolerance.is_some_and(|t| (a - b).abs() <= t)
}
