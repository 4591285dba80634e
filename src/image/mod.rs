//! Pixel-level comparison of matched instances.
//!
//! Pixel payloads are pulled from each instance's lazy source only here.
//! Baseline payloads are cached because every comparison file reads them;
//! comparison payloads are loaded per pair and dropped afterwards. Every pair ends in exactly one [`ImageOutcome`]; a missing or broken
//! payload is its own outcome and never counts as a zero difference.

mod report;

pub use report::{ImageComparison, ImageFileResult, ImageOutcome, PixelStats, Side};

use std::borrow::Cow;

use crate::matching::{check_export, match_instances, pair_id};
use crate::model::{Export, Instance, PixelArray, PixelLoad};

/// Image comparison options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageOptions {
    /// Absolute per-sample tolerance, `>= 0`.
    pub tolerance: f64,
    /// Apply rescale slope/intercept and window clipping before comparing.
    pub normalize: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            normalize: true,
        }
    }
}

/// Compares the pixel payloads of one export against the baseline.
pub fn compare_export_images(
    baseline: &Export,
    comparison: &Export,
    opts: &ImageOptions,
) -> ImageFileResult {
    let mut result = ImageFileResult {
        baseline_label: baseline.label.clone(),
        comparison_label: comparison.label.clone(),
        comparisons: Vec::new(),
        missing: Vec::new(),
        extra: Vec::new(),
        total_baseline: baseline.len(),
        total_comparison: comparison.len(),
        tolerance: opts.tolerance,
        normalize: opts.normalize,
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
        let c_pixels = c.load_pixels();
        result.comparisons.push(ImageComparison {
            baseline_index: pair.baseline,
            comparison_index: pair.comparison,
            instance_id: pair_id(b, c),
            method: pair.method,
            baseline_shape: loaded_shape(b.pixels()),
            comparison_shape: loaded_shape(&c_pixels),
            outcome: compare_loads(b.pixels(), &c_pixels, opts),
        });
    }
    result.missing = matching.missing_refs(&baseline.instances);
    result.extra = matching.extra_refs(&comparison.instances);

    result
}

fn loaded_shape(load: &PixelLoad) -> Option<Vec<usize>> {
    match load {
        Ok(Some(array)) => Some(array.shape.clone()),
        _ => None,
    }
}

/// Compares the pixel payloads of a matched pair. The baseline payload is
/// cached on its instance; the comparison payload is not.
pub fn compare_instance_pixels(
    baseline: &Instance,
    comparison: &Instance,
    opts: &ImageOptions,
) -> ImageOutcome {
    compare_loads(baseline.pixels(), &comparison.load_pixels(), opts)
}

fn compare_loads(baseline: &PixelLoad, comparison: &PixelLoad, opts: &ImageOptions) -> ImageOutcome {
    let b = match usable(baseline, Side::Baseline) {
        Ok(array) => array,
        Err(outcome) => return outcome,
    };
    let c = match usable(comparison, Side::Comparison) {
        Ok(array) => array,
        Err(outcome) => return outcome,
    };

    match (b, c) {
        (Some(b), Some(c)) => compare_arrays(b, c, opts),
        (b, c) => ImageOutcome::MissingPixelData {
            baseline_missing: b.is_none(),
            comparison_missing: c.is_none(),
        },
    }
}

fn usable(load: &PixelLoad, side: Side) -> Result<Option<&PixelArray>, ImageOutcome> {
    match load {
        Err(err) => Err(ImageOutcome::DecodeFailure {
            side,
            reason: err.reason.clone(),
        }),
        Ok(Some(array)) if array.len() != array.expected_len() => {
            Err(ImageOutcome::DecodeFailure {
                side,
                reason: format!(
                    "buffer holds {} samples but shape {} needs {}",
                    array.len(),
                    array.shape_label(),
                    array.expected_len()
                ),
            })
        }
        Ok(array) => Ok(array.as_ref()),
    }
}

/// Compares two decoded arrays.
pub fn compare_arrays(
    baseline: &PixelArray,
    comparison: &PixelArray,
    opts: &ImageOptions,
) -> ImageOutcome {
    if baseline.shape != comparison.shape {
        return ImageOutcome::DimensionMismatch {
            baseline: baseline.shape.clone(),
            comparison: comparison.shape.clone(),
        };
    }

    let b = prepared(baseline, opts.normalize);
    let c = prepared(comparison, opts.normalize);
    ImageOutcome::Compared(pixel_stats(&b, &c, opts.tolerance))
}

fn prepared(array: &PixelArray, normalize_values: bool) -> Cow<'_, [f64]> {
    if normalize_values && (array.rescale.is_some() || array.window.is_some()) {
        Cow::Owned(normalize(array))
    } else {
        Cow::Borrowed(&array.samples)
    }
}

/// Applies the rescale transform, then clips to the window bounds.
pub fn normalize(array: &PixelArray) -> Vec<f64> {
    let bounds = array.window.and_then(|w| w.bounds());
    array
        .samples
        .iter()
        .map(|&v| {
            let v = array.rescale.map_or(v, |r| r.apply(v));
            match bounds {
                Some((lo, hi)) => v.clamp(lo, hi),
                None => v,
            }
        })
        .collect()
}

/// Per-sample statistics of two equally sized buffers.
pub fn pixel_stats(baseline: &[f64], comparison: &[f64], tolerance: f64) -> PixelStats {
    let total = baseline.len().min(comparison.len());
    if total == 0 {
        return PixelStats::identical(0);
    }

    let mut matching = 0usize;
    let mut sum_abs = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut max_abs = 0.0f64;

    for (&x, &y) in baseline.iter().zip(comparison) {
        let diff = match (x.is_nan(), y.is_nan()) {
            (true, true) => 0.0,
            (false, false) => (x - y).abs(),
            _ => f64::INFINITY,
        };
        if diff <= tolerance {
            matching += 1;
        }
        sum_abs += diff;
        sum_sq += diff * diff;
        max_abs = max_abs.max(diff);
    }

    let n = total as f64;
    PixelStats {
        exact_match: matching == total,
        differing_pixels: total - matching,
        total_pixels: total,
        similarity_percent: matching as f64 / n * 100.0,
        rmse: (sum_sq / n).sqrt(),
        max_abs_diff: max_abs,
        mean_abs_diff: sum_abs / n,
    }
}
