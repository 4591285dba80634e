//! Matching result types.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::model::Instance;

/// How a pair was matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMethod {
    /// Same SOP Instance UID on both sides.
    Uid,
    /// Same series UID and position within the series. Heuristic: a
    /// reordered series silently pairs the wrong instances.
    SeriesPosition,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Uid => "UID",
            MatchMethod::SeriesPosition => "SERIES_POSITION",
        }
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self, MatchMethod::SeriesPosition)
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One baseline/comparison pair, by index into each export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchedPair {
    pub baseline: usize,
    pub comparison: usize,
    pub method: MatchMethod,
}

/// The three partitions produced for one (baseline, comparison) pair of
/// exports.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InstanceMatching {
    pub pairs: Vec<MatchedPair>,
    /// Baseline indices with no counterpart ("missing in comparison").
    pub missing: Vec<usize>,
    /// Comparison indices with no counterpart ("extra in comparison").
    pub extra: Vec<usize>,
}

impl InstanceMatching {
    pub fn heuristic_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.method.is_heuristic()).count()
    }

    pub fn missing_refs(&self, baseline: &[Instance]) -> Vec<InstanceRef> {
        refs(&self.missing, baseline)
    }

    pub fn extra_refs(&self, comparison: &[Instance]) -> Vec<InstanceRef> {
        refs(&self.extra, comparison)
    }
}

fn refs(indices: &[usize], instances: &[Instance]) -> Vec<InstanceRef> {
    indices
        .iter()
        .map(|&idx| InstanceRef::from_instance(idx, &instances[idx]))
        .collect()
}

/// Identifying fields of an instance present on one side only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstanceRef {
    pub index: usize,
    pub instance_id: String,
    pub series_uid: Option<String>,
    pub file_path: PathBuf,
}

impl InstanceRef {
    pub fn from_instance(index: usize, instance: &Instance) -> Self {
        Self {
            index,
            instance_id: instance.display_id(),
            series_uid: instance.series_uid.clone(),
            file_path: instance.file_path.clone(),
        }
    }
}

/// A problem with one export that prevents comparing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralError {
    /// The export yielded no instances.
    NoInstances { label: String },
    /// The same SOP Instance UID appears more than once.
    DuplicateUids {
        label: String,
        uids: Vec<String>,
    },
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralError::NoInstances { label } => {
                write!(f, "No instances loaded from {label}")
            }
            StructuralError::DuplicateUids { label, uids } => {
                write!(
                    f,
                    "{} duplicate SOPInstanceUID(s) in {}: {}",
                    uids.len(),
                    label,
                    uids.join(", ")
                )
            }
        }
    }
}
