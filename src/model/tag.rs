//! Tag identifiers and dictionary lookup.
//!
//! Tag maps are keyed by [`TagId`], a `(group, element)` pair, rather than by
//! free-form keyword strings. Human-readable keywords come from the standard
//! DICOM data dictionary and are only used for display and ranking.

use std::fmt;
use std::str::FromStr;

use dicom_core::dictionary::DataDictionary;
use dicom_core::Tag;
use dicom_dictionary_std::StandardDataDictionary;
use serde::Serialize;

/// A DICOM attribute tag, `(group, element)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TagId {
    pub group: u16,
    pub element: u16,
}

impl TagId {
    pub const SOP_INSTANCE_UID: TagId = TagId::new(0x0008, 0x0018);
    pub const STUDY_INSTANCE_UID: TagId = TagId::new(0x0020, 0x000D);
    pub const SERIES_INSTANCE_UID: TagId = TagId::new(0x0020, 0x000E);
    pub const RESCALE_INTERCEPT: TagId = TagId::new(0x0028, 0x1052);
    pub const RESCALE_SLOPE: TagId = TagId::new(0x0028, 0x1053);
    pub const WINDOW_CENTER: TagId = TagId::new(0x0028, 0x1050);
    pub const WINDOW_WIDTH: TagId = TagId::new(0x0028, 0x1051);

    /// Creates a new TagId.
    #[inline]
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Returns the dictionary keyword (e.g. `PatientName`), if the tag is
    /// a standard attribute.
    pub fn keyword(&self) -> Option<&'static str> {
        StandardDataDictionary
            .by_tag(Tag(self.group, self.element))
            .map(|entry| entry.alias)
    }

    /// Keyword when known, otherwise the `(gggg,eeee)` form.
    pub fn display_name(&self) -> String {
        self.keyword()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }
}

impl From<Tag> for TagId {
    fn from(tag: Tag) -> Self {
        TagId::new(tag.group(), tag.element())
    }
}

impl From<TagId> for Tag {
    fn from(id: TagId) -> Self {
        Tag(id.group, id.element)
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagId({:04X},{:04X})", self.group, self.element)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

/// Error returned when a tag name cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tag '{}'", self.0)
    }
}

impl std::error::Error for UnknownTag {}

/// Parses a keyword (`StationName`), `(0008,1010)`, `0008,1010` or
/// `00081010`.
impl FromStr for TagId {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(tag) = StandardDataDictionary.parse_tag(trimmed) {
            return Ok(tag.into());
        }

        let hex: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | ','))
            .collect();
        if hex.len() == 8 && hex.is_ascii() {
            if let (Ok(group), Ok(element)) = (
                u16::from_str_radix(&hex[0..4], 16),
                u16::from_str_radix(&hex[4..8], 16),
            ) {
                return Ok(TagId::new(group, element));
            }
        }

        Err(UnknownTag(trimmed.to_string()))
    }
}
