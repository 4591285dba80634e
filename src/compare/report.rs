//! Run-level reports and their terminal rendering.

use serde::Serialize;
use std::fmt;

use crate::image::{ImageFileResult, ImageOptions};
use crate::summary::{FileSummary, TagFrequency};
use crate::tags::TagFileResult;

/// Outcome of a tag-mode run.
#[derive(Clone, Debug, Serialize)]
pub struct TagRunReport {
    pub baseline: String,
    pub summaries: Vec<FileSummary>,
    /// Most frequently differing tags across all files.
    pub top_tags: Vec<TagFrequency>,
    pub cancelled: bool,
    #[serde(skip)]
    pub results: Vec<TagFileResult>,
}

impl TagRunReport {
    pub fn new(baseline: &str) -> Self {
        Self {
            baseline: baseline.to_string(),
            summaries: Vec::new(),
            top_tags: Vec::new(),
            cancelled: false,
            results: Vec::new(),
        }
    }
}

/// Outcome of an image-mode run.
#[derive(Clone, Debug, Serialize)]
pub struct ImageRunReport {
    pub baseline: String,
    pub tolerance: f64,
    pub normalize: bool,
    pub summaries: Vec<FileSummary>,
    pub cancelled: bool,
    #[serde(skip)]
    pub results: Vec<ImageFileResult>,
}

impl ImageRunReport {
    pub fn new(baseline: &str, opts: ImageOptions) -> Self {
        Self {
            baseline: baseline.to_string(),
            tolerance: opts.tolerance,
            normalize: opts.normalize,
            summaries: Vec::new(),
            cancelled: false,
            results: Vec::new(),
        }
    }
}

fn fmt_summaries(f: &mut fmt::Formatter<'_>, summaries: &[FileSummary]) -> fmt::Result {
    if summaries.is_empty() {
        return writeln!(f, "No comparison files processed.");
    }
    for summary in summaries {
        writeln!(f)?;
        write!(f, "{summary}")?;
    }
    Ok(())
}

fn fmt_cancelled(f: &mut fmt::Formatter<'_>, cancelled: bool) -> fmt::Result {
    if cancelled {
        writeln!(f)?;
        writeln!(f, "Run cancelled; results above are partial.")?;
    }
    Ok(())
}

impl fmt::Display for TagRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tag comparison against baseline {}", self.baseline)?;
        fmt_summaries(f, &self.summaries)?;

        writeln!(f)?;
        writeln!(f, "Most frequently differing tags:")?;
        if self.top_tags.is_empty() {
            writeln!(f, "  - (none)")?;
        } else {
            writeln!(
                f,
                "  {:<12} {:<32} {:>9} {:>8} {:>6} {:>6} {:>5}",
                "Tag", "Keyword", "Instances", "Missing", "Extra", "Value", "Type"
            )?;
            for entry in &self.top_tags {
                writeln!(
                    f,
                    "  {:<12} {:<32} {:>9} {:>8} {:>6} {:>6} {:>5}",
                    entry.tag,
                    entry.keyword,
                    entry.instances,
                    entry.missing,
                    entry.extra,
                    entry.value,
                    entry.type_
                )?;
            }
        }

        fmt_cancelled(f, self.cancelled)
    }
}

impl fmt::Display for ImageRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Image comparison against baseline {} (tolerance {}, normalization {})",
            self.baseline,
            self.tolerance,
            if self.normalize { "on" } else { "off" }
        )?;
        fmt_summaries(f, &self.summaries)?;
        fmt_cancelled(f, self.cancelled)
    }
}
