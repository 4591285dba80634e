//! Exports and their study/series hierarchy.

use std::collections::BTreeMap;

use super::instance::Instance;

/// Grouping key used when a study or series UID is missing.
pub const UNKNOWN_UID: &str = "<unknown>";

/// All instances loaded from one archive, in input order.
#[derive(Clone, Debug, Default)]
pub struct Export {
    /// Originating file name of the archive.
    pub label: String,
    pub instances: Vec<Instance>,
}

impl Export {
    pub fn new(label: impl Into<String>, instances: Vec<Instance>) -> Self {
        Self {
            label: label.into(),
            instances,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Builds the study → series → instance hierarchy.
    ///
    /// Instances are referenced by their index in [`Export::instances`].
    pub fn studies(&self) -> BTreeMap<String, Study> {
        let mut studies: BTreeMap<String, Study> = BTreeMap::new();
        for (idx, instance) in self.instances.iter().enumerate() {
            let study_uid = instance.study_uid.as_deref().unwrap_or(UNKNOWN_UID);
            let series_uid = instance.series_uid.as_deref().unwrap_or(UNKNOWN_UID);

            studies
                .entry(study_uid.to_string())
                .or_insert_with(|| Study {
                    study_uid: study_uid.to_string(),
                    series: BTreeMap::new(),
                })
                .series
                .entry(series_uid.to_string())
                .or_insert_with(|| Series {
                    series_uid: series_uid.to_string(),
                    instances: Vec::new(),
                })
                .instances
                .push(idx);
        }
        studies
    }

    pub fn study_count(&self) -> usize {
        self.studies().len()
    }

    pub fn series_count(&self) -> usize {
        self.studies().values().map(|s| s.series.len()).sum()
    }
}

/// One study and its series.
#[derive(Clone, Debug)]
pub struct Study {
    pub study_uid: String,
    pub series: BTreeMap<String, Series>,
}

impl Study {
    pub fn instance_count(&self) -> usize {
        self.series.values().map(|s| s.instances.len()).sum()
    }
}

/// One series; `instances` holds indices into the owning export, in input
/// order.
#[derive(Clone, Debug)]
pub struct Series {
    pub series_uid: String,
    pub instances: Vec<usize>,
}
