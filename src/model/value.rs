//! Typed tag values.
//!
//! A tag value is a tagged variant rather than a dynamically typed blob so
//! that comparison can dispatch explicitly on the kind of data held. The
//! variant (not the VR) decides whether two values are of the same type.

use std::collections::BTreeMap;
use std::fmt;

use dicom_core::VR;

use super::tag::TagId;

/// An ordered mapping from tag to element, used both for instances and for
/// the items of a sequence.
pub type TagMap = BTreeMap<TagId, TagElement>;

/// Binary values of this size or more are rendered as a byte count.
const MAX_HEX_BYTES: usize = 1000;

/// One data element: a VR code plus its value.
#[derive(Clone, Debug, PartialEq)]
pub struct TagElement {
    pub vr: VR,
    pub value: TagValue,
}

impl TagElement {
    pub fn new(vr: VR, value: TagValue) -> Self {
        Self { vr, value }
    }

    /// Convenience constructor for a single string value.
    pub fn text(vr: VR, value: impl Into<String>) -> Self {
        Self::new(vr, TagValue::Text(vec![value.into()]))
    }

    /// Convenience constructor for a single integer value.
    pub fn int(vr: VR, value: i64) -> Self {
        Self::new(vr, TagValue::Int(vec![value]))
    }

    /// Convenience constructor for a single floating point value.
    pub fn float(vr: VR, value: f64) -> Self {
        Self::new(vr, TagValue::Float(vec![value]))
    }

    /// The VR code as text (`PN`, `US`, ...).
    pub fn vr_code(&self) -> String {
        self.vr.to_string().to_owned()
    }

    /// First value interpreted as a number, if possible.
    ///
    /// Decimal strings (`DS`) are stored as text, so text values are parsed.
    pub fn first_f64(&self) -> Option<f64> {
        match &self.value {
            TagValue::Float(values) => values.first().copied(),
            TagValue::Int(values) => values.first().map(|&v| v as f64),
            TagValue::Text(values) => values.first().and_then(|v| v.trim().parse().ok()),
            _ => None,
        }
    }

    /// First value as trimmed text, with DICOM padding (`\0`, spaces)
    /// removed. Empty strings are treated as absent.
    pub fn first_str(&self) -> Option<String> {
        match &self.value {
            TagValue::Text(values) => values
                .first()
                .map(|v| v.trim_end_matches('\0').trim().to_string())
                .filter(|v| !v.is_empty()),
            _ => None,
        }
    }
}

/// The kind of a [`TagValue`], used to detect type differences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Int,
    Float,
    Sequence,
    Binary,
    Empty,
    Undecodable,
}

/// A decoded tag value.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    /// String-like values (`PN`, `LO`, `DS`, `DA`, ...). Multi-valued.
    Text(Vec<String>),
    /// Integer values (`US`, `SL`, ...). Multi-valued.
    Int(Vec<i64>),
    /// Floating point values (`FL`, `FD`). Multi-valued.
    Float(Vec<f64>),
    /// Ordered sequence items, each a nested tag map.
    Sequence(Vec<TagMap>),
    /// Raw bytes (`OB`, `OW`, `UN`, ...).
    Binary(Vec<u8>),
    /// Present but zero-length.
    Empty,
    /// The value could not be decoded; the reason is kept for reporting.
    Undecodable(String),
}

impl TagValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TagValue::Text(_) => ValueKind::Text,
            TagValue::Int(_) => ValueKind::Int,
            TagValue::Float(_) => ValueKind::Float,
            TagValue::Sequence(_) => ValueKind::Sequence,
            TagValue::Binary(_) => ValueKind::Binary,
            TagValue::Empty => ValueKind::Empty,
            TagValue::Undecodable(_) => ValueKind::Undecodable,
        }
    }

    pub fn is_undecodable(&self) -> bool {
        matches!(self, TagValue::Undecodable(_))
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(values) => write!(f, "{}", values.join("\\")),
            TagValue::Int(values) => write_joined(f, values),
            TagValue::Float(values) => write_joined(f, values),
            TagValue::Sequence(items) => {
                let suffix = if items.len() == 1 { "" } else { "s" };
                write!(f, "Sequence ({} item{})", items.len(), suffix)
            }
            TagValue::Binary(bytes) if bytes.len() >= MAX_HEX_BYTES => {
                write!(f, "<binary: {} bytes>", bytes.len())
            }
            TagValue::Binary(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            TagValue::Empty => Ok(()),
            TagValue::Undecodable(reason) => write!(f, "<undecodable: {reason}>"),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str("\\")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}
