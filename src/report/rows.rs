//! Flat report row types.

use serde::Serialize;

pub const SUMMARY: &str = "SUMMARY";
pub const TAG_DIFFERENCE: &str = "TAG_DIFFERENCE";
pub const IMAGE_COMPARISON: &str = "IMAGE_COMPARISON";
pub const MISSING_INSTANCE: &str = "MISSING_INSTANCE";
pub const EXTRA_INSTANCE: &str = "EXTRA_INSTANCE";
pub const INFO: &str = "INFO";

pub const NO_DIFFERENCES_FOUND: &str = "NO_DIFFERENCES_FOUND";
pub const EXISTS: &str = "EXISTS";
pub const MISSING: &str = "MISSING";

/// One row of a tag-mode report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagReportRow {
    pub report_type: String,
    pub baseline_file: String,
    pub comparison_file: String,
    #[serde(rename = "SOPInstanceUID")]
    pub sop_instance_uid: String,
    pub match_method: String,
    pub tag_name: String,
    pub tag_keyword: String,
    pub baseline_value: String,
    pub comparison_value: String,
    pub difference_type: String,
    #[serde(rename = "VR")]
    pub vr: String,
}

/// One row of an image-mode report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageReportRow {
    pub report_type: String,
    pub baseline_file: String,
    pub comparison_file: String,
    #[serde(rename = "SOPInstanceUID")]
    pub sop_instance_uid: String,
    pub match_method: String,
    pub difference_type: String,
    pub exact_match: Option<bool>,
    pub pixel_differences: Option<usize>,
    pub total_pixels: Option<usize>,
    pub similarity_percent: Option<f64>,
    #[serde(rename = "RMSE")]
    pub rmse: Option<f64>,
    pub max_difference: Option<f64>,
    pub mean_difference: Option<f64>,
    pub baseline_shape: String,
    pub comparison_shape: String,
    pub missing_in_baseline: bool,
    pub missing_in_comparison: bool,
    pub dimension_mismatch: bool,
    pub tolerance_used: f64,
    pub normalized: bool,
    pub detail: String,
}
