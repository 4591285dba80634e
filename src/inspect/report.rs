//! Inspect report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::loader::{ExtractionStats, LoadFailure};

/// What was found in one export.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionStats>,
    /// Files that passed the DICOM header check.
    pub candidates: usize,
    pub instances: usize,
    pub studies: usize,
    pub series: usize,
    pub instances_without_uid: usize,
    pub duplicate_uids: Vec<String>,
    pub failures: Vec<LoadFailure>,
    /// The first few instances, in load order.
    pub sample: Vec<InstanceSample>,
}

/// Identifying fields of one instance.
#[derive(Clone, Debug, Serialize)]
pub struct InstanceSample {
    pub sop_instance_uid: Option<String>,
    pub series_instance_uid: Option<String>,
    pub study_instance_uid: Option<String>,
    pub tag_count: usize,
    pub file_path: PathBuf,
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Export: {}", self.label)?;
        if let Some(stats) = &self.extraction {
            writeln!(
                f,
                "  Files:       {} ({} DICOM, {} other) in {} folders",
                stats.total_files, stats.dicom_files, stats.non_dicom_files, stats.total_folders
            )?;
        }
        writeln!(
            f,
            "  Instances:   {} loaded of {} candidates",
            self.instances, self.candidates
        )?;
        writeln!(
            f,
            "  Hierarchy:   {} studies, {} series",
            self.studies, self.series
        )?;
        if self.instances_without_uid > 0 {
            writeln!(
                f,
                "  Without SOPInstanceUID: {}",
                self.instances_without_uid
            )?;
        }
        if !self.duplicate_uids.is_empty() {
            writeln!(f, "  Duplicate SOPInstanceUIDs:")?;
            for uid in &self.duplicate_uids {
                writeln!(f, "    - {uid}")?;
            }
        }
        if !self.failures.is_empty() {
            writeln!(f, "  Unreadable files ({}):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "    - {}: {}", failure.path.display(), failure.reason)?;
            }
        }

        writeln!(f, "  First {} instance(s):", self.sample.len())?;
        if self.sample.is_empty() {
            writeln!(f, "    - (none)")?;
        }
        for sample in &self.sample {
            writeln!(
                f,
                "    - {} (series {}, study {}, {} tags)",
                or_dash(&sample.sop_instance_uid),
                or_dash(&sample.series_instance_uid),
                or_dash(&sample.study_instance_uid),
                sample.tag_count
            )?;
        }
        Ok(())
    }
}
