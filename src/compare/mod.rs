//! Run orchestration: one baseline export against every other export.
//!
//! The first export is the baseline. Each comparison file is independent and
//! only reads the baseline. A shared [`Cancellation`] flag is checked between
//! files; a cancelled run keeps the files already finished.

mod report;

pub use report::{ImageRunReport, TagRunReport};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::DicomCompareError;
use crate::image::{compare_export_images, ImageOptions};
use crate::model::Export;
use crate::summary::{rank_tags, summarize_images, summarize_tags, GradeScale};
use crate::tags::{compare_export_tags, TagCompareOptions};

/// Cooperative cancellation flag shared between a run and its caller.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scoring options shared by both modes.
#[derive(Clone, Debug)]
pub struct ScoringOptions {
    pub grades: GradeScale,
    pub top_tags: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            grades: GradeScale::default(),
            top_tags: crate::summary::DEFAULT_TOP_TAGS,
        }
    }
}

fn split_baseline(exports: &[Export]) -> Result<(&Export, &[Export]), DicomCompareError> {
    match exports {
        [baseline, rest @ ..] if !rest.is_empty() => Ok((baseline, rest)),
        _ => Err(DicomCompareError::NotEnoughFiles(exports.len())),
    }
}

/// Compares the tags of every export against the first one.
pub fn run_tag_comparison(
    exports: &[Export],
    opts: &TagCompareOptions,
    scoring: &ScoringOptions,
    cancel: &Cancellation,
) -> Result<TagRunReport, DicomCompareError> {
    let (baseline, comparisons) = split_baseline(exports)?;
    let mut report = TagRunReport::new(&baseline.label);

    for comparison in comparisons {
        if cancel.is_cancelled() {
            tracing::warn!("comparison cancelled before {}", comparison.label);
            report.cancelled = true;
            break;
        }

        tracing::info!(baseline = %baseline.label, comparison = %comparison.label, "comparing tags");
        let result = compare_export_tags(baseline, comparison, opts);
        if let Some(error) = &result.error {
            tracing::warn!("{error}");
        }
        report.summaries.push(summarize_tags(&result, &scoring.grades));
        report.results.push(result);
    }

    report.top_tags = rank_tags(&report.results, scoring.top_tags);
    Ok(report)
}

/// Compares the pixel data of every export against the first one.
pub fn run_image_comparison(
    exports: &[Export],
    opts: &ImageOptions,
    scoring: &ScoringOptions,
    cancel: &Cancellation,
) -> Result<ImageRunReport, DicomCompareError> {
    let (baseline, comparisons) = split_baseline(exports)?;
    let mut report = ImageRunReport::new(&baseline.label, *opts);

    for comparison in comparisons {
        if cancel.is_cancelled() {
            tracing::warn!("comparison cancelled before {}", comparison.label);
            report.cancelled = true;
            break;
        }

        tracing::info!(
            baseline = %baseline.label,
            comparison = %comparison.label,
            tolerance = opts.tolerance,
            normalize = opts.normalize,
            "comparing pixel data"
        );
        let result = compare_export_images(baseline, comparison, opts);
        if let Some(error) = &result.error {
            tracing::warn!("{error}");
        }
        report.summaries.push(summarize_images(&result, &scoring.grades));
        report.results.push(result);
    }

    Ok(report)
}
