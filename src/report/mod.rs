//! Tabular reports.
//!
//! Results are flattened into one row per finding and written as CSV or
//! JSON depending on the output file extension.

pub mod rows;

pub use rows::{ImageReportRow, TagReportRow};

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::DicomCompareError;
use crate::image::{ImageFileResult, ImageOutcome};
use crate::matching::InstanceRef;
use crate::tags::TagFileResult;

/// Output format of a report file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, DicomCompareError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(ReportFormat::Csv),
            Some("json") => Ok(ReportFormat::Json),
            _ => Err(DicomCompareError::UnsupportedReportFormat(format!(
                "'{}' (supported: .csv, .json)",
                path.display()
            ))),
        }
    }
}

/// Flattens tag comparison results into report rows.
///
/// When nothing differs anywhere a single `INFO` row is appended so the
/// report is never silently empty.
pub fn tag_rows(results: &[TagFileResult]) -> Vec<TagReportRow> {
    let mut out = Vec::new();
    let mut findings = 0usize;

    for result in results {
        let row = |report_type: &str| TagReportRow {
            report_type: report_type.to_string(),
            baseline_file: result.baseline_label.clone(),
            comparison_file: result.comparison_label.clone(),
            ..TagReportRow::default()
        };

        if let Some(error) = &result.error {
            findings += 1;
            out.push(TagReportRow {
                tag_name: "ComparisonError".into(),
                comparison_value: error.to_string(),
                ..row(rows::SUMMARY)
            });
            continue;
        }

        out.push(TagReportRow {
            tag_name: "TotalInstances".into(),
            baseline_value: result.total_baseline.to_string(),
            comparison_value: result.total_comparison.to_string(),
            ..row(rows::SUMMARY)
        });
        out.push(TagReportRow {
            tag_name: "PerfectMatches".into(),
            comparison_value: result.perfect_matches().to_string(),
            ..row(rows::SUMMARY)
        });
        out.push(TagReportRow {
            tag_name: "TagDifferences".into(),
            comparison_value: result.instances_with_differences().to_string(),
            ..row(rows::SUMMARY)
        });

        for comparison in &result.comparisons {
            for diff in &comparison.differences {
                findings += 1;
                out.push(TagReportRow {
                    sop_instance_uid: comparison.instance_id.clone(),
                    match_method: comparison.method.to_string(),
                    tag_name: diff.tag.to_string(),
                    tag_keyword: diff.keyword.clone(),
                    baseline_value: diff.baseline_text(),
                    comparison_value: diff.comparison_text(),
                    difference_type: diff.kind.to_string(),
                    vr: diff.vr.clone(),
                    ..row(rows::TAG_DIFFERENCE)
                });
            }
        }

        for missing in &result.missing {
            findings += 1;
            out.push(TagReportRow {
                sop_instance_uid: missing.instance_id.clone(),
                baseline_value: rows::EXISTS.into(),
                comparison_value: rows::MISSING.into(),
                difference_type: rows::MISSING_INSTANCE.into(),
                ..row(rows::MISSING_INSTANCE)
            });
        }
        for extra in &result.extra {
            findings += 1;
            out.push(TagReportRow {
                sop_instance_uid: extra.instance_id.clone(),
                baseline_value: rows::MISSING.into(),
                comparison_value: rows::EXISTS.into(),
                difference_type: rows::EXTRA_INSTANCE.into(),
                ..row(rows::EXTRA_INSTANCE)
            });
        }
    }

    if findings == 0 {
        out.push(TagReportRow {
            report_type: rows::INFO.into(),
            tag_name: rows::NO_DIFFERENCES_FOUND.into(),
            baseline_value: "All instances match perfectly".into(),
            ..TagReportRow::default()
        });
    }
    out
}

/// Flattens image comparison results into report rows.
pub fn image_rows(results: &[ImageFileResult]) -> Vec<ImageReportRow> {
    let mut out = Vec::new();
    let mut findings = 0usize;

    for result in results {
        let row = |report_type: &str| ImageReportRow {
            report_type: report_type.to_string(),
            baseline_file: result.baseline_label.clone(),
            comparison_file: result.comparison_label.clone(),
            tolerance_used: result.tolerance,
            normalized: result.normalize,
            ..ImageReportRow::default()
        };

        if let Some(error) = &result.error {
            findings += 1;
            out.push(ImageReportRow {
                difference_type: "ComparisonError".into(),
                detail: error.to_string(),
                ..row(rows::SUMMARY)
            });
            continue;
        }

        out.push(ImageReportRow {
            detail: format!(
                "{} matched, {} exact, {} differing, {} failed",
                result.comparisons.len(),
                result.exact_matches(),
                result.pixel_differences(),
                result.pixel_failures()
            ),
            ..row(rows::SUMMARY)
        });

        for comparison in &result.comparisons {
            let outcome = &comparison.outcome;
            if !outcome.is_exact_match() {
                findings += 1;
            }
            let mut pair = ImageReportRow {
                sop_instance_uid: comparison.instance_id.clone(),
                match_method: comparison.method.to_string(),
                difference_type: outcome.difference_type().into(),
                baseline_shape: comparison.baseline_shape_label(),
                comparison_shape: comparison.comparison_shape_label(),
                ..row(rows::IMAGE_COMPARISON)
            };
            match outcome {
                ImageOutcome::Compared(stats) => {
                    pair.exact_match = Some(stats.exact_match);
                    pair.pixel_differences = Some(stats.differing_pixels);
                    pair.total_pixels = Some(stats.total_pixels);
                    pair.similarity_percent = Some(stats.similarity_percent);
                    pair.rmse = Some(stats.rmse);
                    pair.max_difference = Some(stats.max_abs_diff);
                    pair.mean_difference = Some(stats.mean_abs_diff);
                }
                ImageOutcome::MissingPixelData {
                    baseline_missing,
                    comparison_missing,
                } => {
                    pair.exact_match = Some(false);
                    pair.missing_in_baseline = *baseline_missing;
                    pair.missing_in_comparison = *comparison_missing;
                }
                ImageOutcome::DimensionMismatch { .. } => {
                    pair.exact_match = Some(false);
                    pair.dimension_mismatch = true;
                }
                ImageOutcome::DecodeFailure { side, reason } => {
                    pair.exact_match = Some(false);
                    pair.detail = format!("{side}: {reason}");
                }
            }
            out.push(pair);
        }

        for missing in &result.missing {
            findings += 1;
            out.push(ImageReportRow {
                missing_in_comparison: true,
                ..instance_row(row(rows::MISSING_INSTANCE), missing)
            });
        }
        for extra in &result.extra {
            findings += 1;
            out.push(ImageReportRow {
                missing_in_baseline: true,
                ..instance_row(row(rows::EXTRA_INSTANCE), extra)
            });
        }
    }

    if findings == 0 {
        out.push(ImageReportRow {
            report_type: rows::INFO.into(),
            difference_type: rows::NO_DIFFERENCES_FOUND.into(),
            detail: "All instances match perfectly".into(),
            ..ImageReportRow::default()
        });
    }
    out
}

fn instance_row(row: ImageReportRow, instance: &InstanceRef) -> ImageReportRow {
    ImageReportRow {
        sop_instance_uid: instance.instance_id.clone(),
        difference_type: row.report_type.clone(),
        detail: instance.file_path.display().to_string(),
        ..row
    }
}

/// Writes rows to `path` as CSV or JSON, chosen by extension.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DicomCompareError> {
    let format = ReportFormat::from_path(path)?;
    match format {
        ReportFormat::Csv => write_csv(path, rows),
        ReportFormat::Json => write_json(path, rows),
    }?;
    tracing::info!(report = %path.display(), rows = rows.len(), "wrote report");
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DicomCompareError> {
    let csv_error = |source| DicomCompareError::ReportCsv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DicomCompareError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), rows).map_err(|source| {
        DicomCompareError::ReportJson {
            path: path.to_path_buf(),
            source,
        }
    })
}
