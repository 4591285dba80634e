//! Fuzz target for dataset conversion and tag comparison.
//!
//! Arbitrary bytes are read as a DICOM file (starting at the `DICM` magic),
//! converted into a tag map and compared against itself.

#![no_main]

use dicomcompare::loader::convert_object;
use dicomcompare::tags::{compare_tag_maps, TagCompareOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(object) = dicom_object::from_reader(data) else {
        return;
    };
    let tags = convert_object(&object);
    let _ = compare_tag_maps(&tags, &tags, &TagCompareOptions::without_exclusions());
});
