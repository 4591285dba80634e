//! Export inspection.
//!
//! Summarizes what the loader found in an export without comparing it to
//! anything: file counts, hierarchy, unreadable files and a sample of
//! instance identifiers.

mod report;

pub use report::{InspectReport, InstanceSample};

use crate::loader::LoadedExport;
use crate::matching::{check_export, StructuralError};

/// Options for export inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Number of instances listed in the sample.
    pub sample_size: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self { sample_size: 5 }
    }
}

/// Inspect a loaded export.
pub fn inspect_export(loaded: &LoadedExport, opts: &InspectOptions) -> InspectReport {
    let export = &loaded.export;

    let duplicate_uids = match check_export(export) {
        Err(StructuralError::DuplicateUids { uids, .. }) => uids,
        _ => Vec::new(),
    };

    let sample = export
        .instances
        .iter()
        .take(opts.sample_size)
        .map(|instance| InstanceSample {
            sop_instance_uid: instance.uid.as_ref().map(|uid| uid.to_string()),
            series_instance_uid: instance.series_uid.clone(),
            study_instance_uid: instance.study_uid.clone(),
            tag_count: instance.tags.len(),
            file_path: instance.file_path.clone(),
        })
        .collect();

    InspectReport {
        label: export.label.clone(),
        extraction: loaded.stats.extraction,
        candidates: loaded.stats.candidates,
        instances: export.len(),
        studies: export.study_count(),
        series: export.series_count(),
        instances_without_uid: export.instances.iter().filter(|i| i.uid.is_none()).count(),
        duplicate_uids,
        failures: loaded.stats.failures.clone(),
        sample,
    }
}
