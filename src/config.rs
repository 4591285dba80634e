//! Run configuration.
//!
//! A [`CompareConfig`] can be read from a YAML file and is then overridden
//! by command line flags. Everything is validated before any export is
//! loaded.
//!
//! ```yaml
//! tolerance: 1.0
//! normalize: true
//! exclude: [PatientName, "(0008,0090)"]
//! use_default_exclusions: true
//! tolerant_tags:
//!   SliceThickness: 0.001
//! grades: { a_plus: 99, a: 95, b: 90, c: 80 }
//! top_tags: 15
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DicomCompareError;
use crate::image::ImageOptions;
use crate::model::TagId;
use crate::summary::{GradeScale, DEFAULT_TOP_TAGS};
use crate::tags::{TagCompareOptions, DEFAULT_EXCLUDED_TAGS};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Absolute per-sample pixel tolerance.
    pub tolerance: f64,
    /// Rescale and window pixel data before comparing.
    pub normalize: bool,
    /// Extra tags to exclude, by keyword or `(gggg,eeee)`.
    pub exclude: Vec<String>,
    pub use_default_exclusions: bool,
    /// Numeric tags compared with an absolute tolerance.
    pub tolerant_tags: BTreeMap<String, f64>,
    pub grades: GradeScale,
    /// Size of the cross-file tag ranking.
    pub top_tags: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            normalize: true,
            exclude: Vec::new(),
            use_default_exclusions: true,
            tolerant_tags: BTreeMap::new(),
            grades: GradeScale::default(),
            top_tags: DEFAULT_TOP_TAGS,
        }
    }
}

impl CompareConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self, DicomCompareError> {
        let data = fs::read_to_string(path).map_err(|source| DicomCompareError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&data).map_err(|source| DicomCompareError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rejects values no comparison can run with.
    pub fn validate(&self) -> Result<(), DicomCompareError> {
        check_tolerance("tolerance", self.tolerance)?;
        for (name, tolerance) in &self.tolerant_tags {
            check_tolerance(&format!("tolerant_tags.{name}"), *tolerance)?;
        }
        self.grades
            .validate()
            .map_err(DicomCompareError::InvalidConfig)?;
        self.excluded_tags()?;
        self.tag_tolerances()?;
        Ok(())
    }

    pub fn excluded_tags(&self) -> Result<BTreeSet<TagId>, DicomCompareError> {
        let mut excluded: BTreeSet<TagId> = if self.use_default_exclusions {
            DEFAULT_EXCLUDED_TAGS.into_iter().collect()
        } else {
            BTreeSet::new()
        };
        for name in &self.exclude {
            excluded.insert(parse_tag(name)?);
        }
        Ok(excluded)
    }

    fn tag_tolerances(&self) -> Result<BTreeMap<TagId, f64>, DicomCompareError> {
        self.tolerant_tags
            .iter()
            .map(|(name, tolerance)| Ok((parse_tag(name)?, *tolerance)))
            .collect()
    }

    pub fn tag_options(&self) -> Result<TagCompareOptions, DicomCompareError> {
        Ok(TagCompareOptions {
            excluded: self.excluded_tags()?,
            tolerances: self.tag_tolerances()?,
        })
    }

    pub fn image_options(&self) -> ImageOptions {
        ImageOptions {
            tolerance: self.tolerance,
            normalize: self.normalize,
        }
    }
}

fn parse_tag(name: &str) -> Result<TagId, DicomCompareError> {
    name.parse::<TagId>()
        .map_err(|err| DicomCompareError::InvalidConfig(err.to_string()))
}

fn check_tolerance(name: &str, value: f64) -> Result<(), DicomCompareError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DicomCompareError::InvalidConfig(format!(
            "{name} must be a finite number >= 0, got {value}"
        )))
    }
}
