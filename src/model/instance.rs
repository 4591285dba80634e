//! Instance records.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::pixels::{LazyPixels, PixelLoad, PixelSource};
use super::tag::TagId;
use super::value::{TagElement, TagMap};

/// A SOP Instance UID.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceUid(String);

impl InstanceUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InstanceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceUid({})", self.0)
    }
}

impl fmt::Display for InstanceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceUid {
    fn from(uid: &str) -> Self {
        InstanceUid::new(uid)
    }
}

impl From<String> for InstanceUid {
    fn from(uid: String) -> Self {
        InstanceUid::new(uid)
    }
}

/// One imaging object from an export.
#[derive(Clone, Debug)]
pub struct Instance {
    /// SOP Instance UID; `None` for malformed input.
    pub uid: Option<InstanceUid>,
    pub series_uid: Option<String>,
    pub study_uid: Option<String>,
    pub tags: TagMap,
    /// Originating file path.
    pub file_path: PathBuf,
    /// Label of the export this instance came from.
    pub source_label: String,
    pixels: LazyPixels,
}

impl Instance {
    /// Creates an instance with the given UID and no tags or pixels.
    pub fn new(uid: impl Into<InstanceUid>) -> Self {
        Self {
            uid: Some(uid.into()),
            ..Self::anonymous()
        }
    }

    /// Creates an instance that has no SOP Instance UID.
    pub fn anonymous() -> Self {
        Self {
            uid: None,
            series_uid: None,
            study_uid: None,
            tags: TagMap::new(),
            file_path: PathBuf::new(),
            source_label: String::new(),
            pixels: LazyPixels::none(),
        }
    }

    pub fn with_series(mut self, series_uid: impl Into<String>) -> Self {
        self.series_uid = Some(series_uid.into());
        self
    }

    pub fn with_study(mut self, study_uid: impl Into<String>) -> Self {
        self.study_uid = Some(study_uid.into());
        self
    }

    pub fn with_tag(mut self, tag: TagId, element: TagElement) -> Self {
        self.tags.insert(tag, element);
        self
    }

    pub fn with_tags(mut self, tags: TagMap) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }

    pub fn with_pixel_source(mut self, source: Arc<dyn PixelSource>) -> Self {
        self.pixels = LazyPixels::new(source);
        self
    }

    /// Pixel payload, loaded on first access and cached afterwards.
    pub fn pixels(&self) -> &PixelLoad {
        self.pixels.get()
    }

    /// Pixel payload without filling the cache; used for instances that are
    /// compared only once.
    pub fn load_pixels(&self) -> Cow<'_, PixelLoad> {
        self.pixels.get_uncached()
    }

    pub fn pixels_loaded(&self) -> bool {
        self.pixels.is_loaded()
    }

    /// Identifier for display: the UID, or the file path when the UID is
    /// missing.
    pub fn display_id(&self) -> String {
        match &self.uid {
            Some(uid) => uid.to_string(),
            None => format!("<no uid: {}>", self.file_path.display()),
        }
    }
}
