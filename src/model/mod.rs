//! Record model for loaded DICOM exports.
//!
//! This module defines the canonical in-memory representation that every
//! comparison works on: exports made of instances, each instance a tag map
//! plus a lazily loaded pixel payload.
//!
//! # Design Principles
//!
//! 1. **Typed keys**: tag maps are keyed by [`TagId`], never by keyword
//!    strings. Keywords are looked up from the standard dictionary for
//!    display only.
//!
//! 2. **Tagged values**: [`TagValue`] is an enum with one variant per kind of
//!    data, so comparison dispatches on the variant instead of guessing.
//!
//! 3. **Lazy pixels**: pixel data is behind a [`PixelSource`] and is only
//!    decoded when an image comparison asks for it.
//!
//! # Example
//!
//! ```
//! use dicom_core::VR;
//! use dicomcompare::model::{Export, Instance, TagElement, TagId};
//!
//! let export = Export::new(
//!     "baseline.zip",
//!     vec![Instance::new("1.2.3")
//!         .with_series("1.2")
//!         .with_tag(TagId::new(0x0010, 0x0010), TagElement::text(VR::PN, "Doe^John"))],
//! );
//! assert_eq!(export.len(), 1);
//! ```

mod export;
mod instance;
mod pixels;
mod tag;
mod value;

pub use export::{Export, Series, Study, UNKNOWN_UID};
pub use instance::{Instance, InstanceUid};
pub use pixels::{
    format_shape, InMemoryPixels, LazyPixels, PixelArray, PixelError, PixelLoad, PixelSource,
    Rescale, Window,
};
pub use tag::{TagId, UnknownTag};
pub use value::{TagElement, TagMap, TagValue, ValueKind};
