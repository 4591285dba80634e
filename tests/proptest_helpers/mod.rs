#![allow(dead_code)]

use dicom_core::VR;
use dicomcompare::model::{Instance, PixelArray, TagElement, TagId, TagMap, TagValue};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A small pool of standard tags so generated maps overlap often.
const TAG_POOL: [(u16, u16, VR); 10] = [
    (0x0008, 0x0060, VR::CS), // Modality
    (0x0008, 0x103E, VR::LO), // SeriesDescription
    (0x0010, 0x0010, VR::PN), // PatientName
    (0x0010, 0x0020, VR::LO), // PatientID
    (0x0018, 0x0050, VR::DS), // SliceThickness
    (0x0020, 0x0013, VR::IS), // InstanceNumber
    (0x0028, 0x0010, VR::US), // Rows
    (0x0028, 0x0011, VR::US), // Columns
    (0x0028, 0x0030, VR::DS), // PixelSpacing
    (0x0018, 0x1150, VR::FD), // ExposureTime (as float)
];

fn leaf_value() -> BoxedStrategy<TagValue> {
    prop_oneof![
        proptest::collection::vec("[A-Z0-9^ ]{0,8}", 1..3).prop_map(TagValue::Text),
        proptest::collection::vec(-1000i64..1000, 1..3).prop_map(TagValue::Int),
        proptest::collection::vec(-1000.0f64..1000.0, 1..3).prop_map(TagValue::Float),
        proptest::collection::vec(any::<u8>(), 0..8).prop_map(TagValue::Binary),
        Just(TagValue::Empty),
    ]
    .boxed()
}

pub fn arb_tag_value() -> BoxedStrategy<TagValue> {
    leaf_value()
        .prop_recursive(2, 8, 3, |inner| {
            proptest::collection::vec(
                proptest::collection::btree_map(
                    (0usize..TAG_POOL.len()).prop_map(|i| TagId::new(TAG_POOL[i].0, TAG_POOL[i].1)),
                    inner.prop_map(|value| TagElement::new(VR::UN, value)),
                    0..3,
                ),
                0..3,
            )
            .prop_map(TagValue::Sequence)
        })
        .boxed()
}

pub fn arb_tag_map() -> BoxedStrategy<TagMap> {
    proptest::collection::btree_map(0usize..TAG_POOL.len(), arb_tag_value(), 0..TAG_POOL.len())
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(i, value)| {
                    let (group, element, vr) = TAG_POOL[i];
                    (TagId::new(group, element), TagElement::new(vr, value))
                })
                .collect()
        })
        .boxed()
}

/// Instances drawn from a small UID and series pool, some without a UID.
pub fn arb_instances(max: usize) -> BoxedStrategy<Vec<Instance>> {
    proptest::collection::vec((proptest::option::of(0u8..6), 0u8..3), 0..=max)
        .prop_map(|seeds| {
            seeds
                .into_iter()
                .enumerate()
                .map(|(idx, (uid, series))| {
                    let instance = match uid {
                        Some(uid) => Instance::new(format!("1.2.{uid}")),
                        None => Instance::anonymous(),
                    };
                    instance
                        .with_series(format!("1.3.{series}"))
                        .with_file_path(format!("IM{idx:04}"))
                })
                .collect()
        })
        .boxed()
}

/// Two arrays of the same shape.
pub fn arb_pixel_pair() -> BoxedStrategy<(PixelArray, PixelArray)> {
    (1usize..6, 1usize..6)
        .prop_flat_map(|(rows, cols)| {
            let n = rows * cols;
            (
                Just((rows, cols)),
                proptest::collection::vec(0.0f64..4096.0, n..=n),
                proptest::collection::vec(0.0f64..4096.0, n..=n),
            )
        })
        .prop_map(|((rows, cols), a, b)| {
            (
                PixelArray::new(vec![rows, cols], a),
                PixelArray::new(vec![rows, cols], b),
            )
        })
        .boxed()
}
