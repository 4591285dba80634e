//! End-to-end comparisons over DICOM files written to disk.

mod common;

use std::path::Path;

use common::{write_export, zip_dir, Fixture, Pixels};
use dicom_core::value::PrimitiveValue;
use dicom_core::VR;
use dicom_dictionary_std::tags;
use dicomcompare::compare::{run_image_comparison, run_tag_comparison, Cancellation, ScoringOptions};
use dicomcompare::image::{compare_export_images, ImageOptions, ImageOutcome};
use dicomcompare::loader::{load_export, WorkDir};
use dicomcompare::model::{Export, Rescale, TagId, Window};
use dicomcompare::summary::Grade;
use dicomcompare::tags::{compare_export_tags, DifferenceKind, TagCompareOptions};

fn load(path: &Path) -> (Export, WorkDir) {
    let (export, stats, workdir) = load_export(path).expect("load export").into_parts();
    assert!(stats.failures.is_empty(), "unexpected failures: {:?}", stats.failures);
    (export, workdir)
}

fn load_pair(baseline: &Path, comparison: &Path) -> (Vec<Export>, Vec<WorkDir>) {
    let (a, wa) = load(baseline);
    let (b, wb) = load(comparison);
    (vec![a, b], vec![wa, wb])
}

#[test]
fn uid_matching_splits_matched_missing_and_extra() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("baseline"),
        &[Fixture::new("1.2.840.1"), Fixture::new("1.2.840.2")],
    );
    let comparison = write_export(
        &tmp.path().join("comparison"),
        &[Fixture::new("1.2.840.1"), Fixture::new("1.2.840.3")],
    );

    let (exports, _workdirs) = load_pair(&baseline, &comparison);
    let report = run_tag_comparison(
        &exports,
        &TagCompareOptions::default(),
        &ScoringOptions::default(),
        &Cancellation::new(),
    )
    .unwrap();

    let result = &report.results[0];
    assert_eq!(result.comparisons.len(), 1);
    assert_eq!(result.comparisons[0].instance_id, "1.2.840.1");
    assert!(result.comparisons[0].is_perfect_match());
    assert_eq!(result.missing.len(), 1);
    assert_eq!(result.missing[0].instance_id, "1.2.840.2");
    assert_eq!(result.extra.len(), 1);
    assert_eq!(result.extra[0].instance_id, "1.2.840.3");

    let summary = &report.summaries[0];
    assert_eq!(summary.baseline_label, "baseline");
    assert_eq!(summary.comparison_label, "comparison");
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.missing_percent, 50.0);
    assert_eq!(summary.extra_percent, 50.0);
}

#[test]
fn changed_patient_name_is_a_single_value_difference() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("a"),
        &[Fixture::new("1.2.840.1").patient_name("John Doe")],
    );
    let comparison = write_export(
        &tmp.path().join("b"),
        &[Fixture::new("1.2.840.1").patient_name("J. Doe")],
    );

    let (exports, _workdirs) = load_pair(&baseline, &comparison);
    let report = run_tag_comparison(
        &exports,
        &TagCompareOptions::default(),
        &ScoringOptions::default(),
        &Cancellation::new(),
    )
    .unwrap();

    let differences = &report.results[0].comparisons[0].differences;
    assert_eq!(differences.len(), 1, "{differences:?}");
    assert_eq!(differences[0].tag, TagId::from(tags::PATIENT_NAME));
    assert_eq!(differences[0].kind, DifferenceKind::ValueDiff);
    assert_eq!(differences[0].baseline_text(), "John Doe");
    assert_eq!(differences[0].comparison_text(), "J. Doe");

    assert_eq!(report.top_tags.len(), 1);
    assert_eq!(report.top_tags[0].keyword, "PatientName");
    assert_eq!(report.summaries[0].grade, Grade::D);
}

#[test]
fn text_versus_integer_is_a_type_difference() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("a"),
        &[Fixture::new("1.2.840.1").text(tags::INSTANCE_NUMBER, VR::IS, "123")],
    );
    let comparison = write_export(
        &tmp.path().join("b"),
        &[Fixture::new("1.2.840.1").element(
            tags::INSTANCE_NUMBER,
            VR::UL,
            PrimitiveValue::from(123_u32),
        )],
    );

    let (exports, _workdirs) = load_pair(&baseline, &comparison);
    let report = run_tag_comparison(
        &exports,
        &TagCompareOptions::default(),
        &ScoringOptions::default(),
        &Cancellation::new(),
    )
    .unwrap();

    let differences = &report.results[0].comparisons[0].differences;
    assert_eq!(differences.len(), 1, "{differences:?}");
    assert_eq!(differences[0].kind, DifferenceKind::TypeDiff);
}

#[test]
fn excluded_tags_are_not_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("a"),
        &[Fixture::new("1.2.840.1").text(tags::STATION_NAME, VR::SH, "CT01")],
    );
    let comparison = write_export(
        &tmp.path().join("b"),
        &[Fixture::new("1.2.840.1").text(tags::STATION_NAME, VR::SH, "CT02")],
    );

    let (exports, _workdirs) = load_pair(&baseline, &comparison);
    let scoring = ScoringOptions::default();
    let cancel = Cancellation::new();

    let default = run_tag_comparison(&exports, &TagCompareOptions::default(), &scoring, &cancel)
        .unwrap();
    assert!(default.results[0].comparisons[0].is_perfect_match());
    assert_eq!(default.summaries[0].grade, Grade::APlus);

    let strict = run_tag_comparison(
        &exports,
        &TagCompareOptions::without_exclusions(),
        &scoring,
        &cancel,
    )
    .unwrap();
    assert_eq!(strict.results[0].total_differences(), 1);
}

#[test]
fn single_differing_pixel_gives_partial_similarity() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("a"),
        &[Fixture::new("1.2.840.1").pixels(Pixels::filled(2, 2, 0))],
    );
    let comparison = write_export(
        &tmp.path().join("b"),
        &[Fixture::new("1.2.840.1").pixels(Pixels::new(2, 2, vec![0, 0, 0, 1]))],
    );

    let (exports, _workdirs) = load_pair(&baseline, &comparison);
    let report = run_image_comparison(
        &exports,
        &ImageOptions::default(),
        &ScoringOptions::default(),
        &Cancellation::new(),
    )
    .unwrap();

    let comparison = &report.results[0].comparisons[0];
    assert_eq!(comparison.baseline_shape, Some(vec![2, 2]));
    let stats = comparison.outcome.stats().expect("pixel stats");
    assert!(!stats.exact_match);
    assert_eq!(stats.differing_pixels, 1);
    assert_eq!(stats.total_pixels, 4);
    assert_eq!(stats.similarity_percent, 75.0);
    assert_eq!(stats.max_abs_diff, 1.0);
    assert_eq!(report.summaries[0].pixel_differences, Some(1));
}

#[test]
fn missing_pixel_data_is_its_own_outcome() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("a"),
        &[Fixture::new("1.2.840.1").pixels(Pixels::filled(4, 4, 100))],
    );
    let comparison = write_export(&tmp.path().join("b"), &[Fixture::new("1.2.840.1")]);

    let (exports, _workdirs) = load_pair(&baseline, &comparison);
    let report = run_image_comparison(
        &exports,
        &ImageOptions::default(),
        &ScoringOptions::default(),
        &Cancellation::new(),
    )
    .unwrap();

    let outcome = &report.results[0].comparisons[0].outcome;
    assert_eq!(
        outcome,
        &ImageOutcome::MissingPixelData {
            baseline_missing: false,
            comparison_missing: true,
        }
    );
    assert_eq!(outcome.difference_type(), "MISSING_PIXEL_DATA");
    assert!(outcome.stats().is_none());
}

#[test]
fn zipped_export_loads_like_the_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_export(
        &tmp.path().join("study"),
        &[
            Fixture::new("1.2.840.1").pixels(Pixels::filled(2, 3, 7)),
            Fixture::new("1.2.840.2"),
        ],
    );
    let zip_path = tmp.path().join("study.zip");
    zip_dir(&dir, &zip_path);

    let (from_dir, _wd) = load(&dir);
    let (from_zip, _wz) = load(&zip_path);
    assert_eq!(from_zip.label, "study.zip");
    assert_eq!(from_zip.len(), from_dir.len());

    let exports = vec![from_dir, from_zip];
    let report = run_image_comparison(
        &exports,
        &ImageOptions::default(),
        &ScoringOptions::default(),
        &Cancellation::new(),
    )
    .unwrap();
    let result = &report.results[0];
    assert_eq!(result.comparisons.len(), 2);
    assert_eq!(result.exact_matches(), 2);
}

#[test]
fn instances_without_uid_match_by_series_position() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("a"),
        &[Fixture::new("1.2.840.1").patient_name("Doe")],
    );
    let comparison = write_export(
        &tmp.path().join("b"),
        &[Fixture::anonymous().patient_name("Doe")],
    );

    let (exports, _workdirs) = load_pair(&baseline, &comparison);
    let report = run_tag_comparison(
        &exports,
        &TagCompareOptions::default(),
        &ScoringOptions::default(),
        &Cancellation::new(),
    )
    .unwrap();

    let result = &report.results[0];
    assert_eq!(result.comparisons.len(), 1);
    assert_eq!(result.heuristic_matches(), 1);
    let differences = &result.comparisons[0].differences;
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].tag, TagId::SOP_INSTANCE_UID);
    assert_eq!(differences[0].kind, DifferenceKind::MissingTag);
}

#[test]
fn loaded_pixels_hold_stored_values() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_export(
        &tmp.path().join("ct"),
        &[Fixture::new("1.2.840.1")
            .rescale("2", "-100")
            .window("-70", "40")
            .pixels(Pixels::new(1, 2, vec![10, 20]))],
    );

    let (export, _workdir) = load(&dir);
    let array = export.instances[0]
        .pixels()
        .clone()
        .expect("decodable")
        .expect("pixel data present");
    assert_eq!(array.samples, vec![10.0, 20.0]);
    assert_eq!(array.rescale, Some(Rescale::new(2.0, -100.0)));
    assert_eq!(array.window, Some(Window::new(-70.0, 40.0)));
    assert_eq!(dicomcompare::image::normalize(&array), vec![-80.0, -60.0]);
}

#[test]
fn equivalent_rescale_encodings_match_only_when_normalized() {
    let tmp = tempfile::tempdir().unwrap();
    let baseline = write_export(
        &tmp.path().join("a"),
        &[Fixture::new("1.2.840.1")
            .rescale("2", "0")
            .pixels(Pixels::new(1, 2, vec![10, 20]))],
    );
    let comparison = write_export(
        &tmp.path().join("b"),
        &[Fixture::new("1.2.840.1")
            .rescale("1", "0")
            .pixels(Pixels::new(1, 2, vec![20, 40]))],
    );
    let (exports, _workdirs) = load_pair(&baseline, &comparison);

    let normalized = compare_export_images(&exports[0], &exports[1], &ImageOptions::default());
    let stats = *normalized.comparisons[0].outcome.stats().expect("pixel stats");
    assert!(stats.exact_match, "{stats:?}");
    assert_eq!(stats.max_abs_diff, 0.0);

    let raw = ImageOptions {
        tolerance: 0.0,
        normalize: false,
    };
    let stored = compare_export_images(&exports[0], &exports[1], &raw);
    let stats = *stored.comparisons[0].outcome.stats().expect("pixel stats");
    assert!(!stats.exact_match);
    assert_eq!(stats.differing_pixels, 2);
    assert_eq!(stats.max_abs_diff, 20.0);
}

#[test]
fn tag_comparison_never_decodes_pixels() {
    let tmp = tempfile::tempdir().unwrap();
    let fixtures = [
        Fixture::new("1.2.840.1").pixels(Pixels::filled(2, 2, 5)),
        Fixture::new("1.2.840.2").pixels(Pixels::filled(2, 2, 6)),
    ];
    let baseline = write_export(&tmp.path().join("a"), &fixtures);
    let comparison = write_export(&tmp.path().join("b"), &fixtures);
    let (exports, _workdirs) = load_pair(&baseline, &comparison);

    let result = compare_export_tags(&exports[0], &exports[1], &TagCompareOptions::default());
    assert_eq!(result.perfect_matches(), 2);
    for instance in exports.iter().flat_map(|e| &e.instances) {
        assert!(!instance.pixels_loaded(), "{}", instance.display_id());
    }
}
