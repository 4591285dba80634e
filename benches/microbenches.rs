//! Criterion microbenches for the comparison hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - Tag map comparison (compare_tag_maps)
//! - Pixel statistics over raw and normalized buffers (pixel_stats, compare_arrays)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use dicom_core::VR;
use dicomcompare::image::{compare_arrays, pixel_stats, ImageOptions};
use dicomcompare::model::{PixelArray, Rescale, TagElement, TagId, TagMap, TagValue, Window};
use dicomcompare::tags::{compare_tag_maps, TagCompareOptions};

const TAGS_PER_MAP: u16 = 400;
const IMAGE_SIDE: usize = 512;

/// A tag map with a mix of text, integer, float and sequence values.
fn tag_map(seed: i64) -> TagMap {
    let mut map = TagMap::new();
    for element in 0..TAGS_PER_MAP {
        let tag = TagId::new(0x0009, element);
        let value = match element % 4 {
            0 => TagElement::text(VR::LO, format!("value {}", i64::from(element) + seed % 7)),
            1 => TagElement::int(VR::US, i64::from(element)),
            2 => TagElement::float(VR::FD, f64::from(element) * 0.5),
            _ => {
                let mut item = TagMap::new();
                item.insert(TagId::new(0x0008, 0x1155), TagElement::text(VR::UI, "1.2.3"));
                TagElement::new(VR::SQ, TagValue::Sequence(vec![item]))
            }
        };
        map.insert(tag, value);
    }
    map
}

fn image(offset: f64) -> PixelArray {
    let samples = (0..IMAGE_SIDE * IMAGE_SIDE)
        .map(|i| (i % 4096) as f64 + if i % 97 == 0 { offset } else { 0.0 })
        .collect();
    PixelArray::new(vec![IMAGE_SIDE, IMAGE_SIDE], samples)
}

/// Benchmark tag comparison of two maps that differ in a fraction of values.
fn bench_tag_compare(c: &mut Criterion) {
    let baseline = tag_map(0);
    let comparison = tag_map(3);
    let opts = TagCompareOptions::default();

    let mut group = c.benchmark_group("tags");
    group.throughput(Throughput::Elements(u64::from(TAGS_PER_MAP)));

    group.bench_function("compare_tag_maps", |b| {
        b.iter(|| {
            let diffs = compare_tag_maps(black_box(&baseline), black_box(&comparison), &opts);
            black_box(diffs)
        })
    });

    group.finish();
}

/// Benchmark per-sample statistics on raw buffers.
fn bench_pixel_stats(c: &mut Criterion) {
    let baseline = image(0.0);
    let comparison = image(3.0);

    let mut group = c.benchmark_group("pixels");
    group.throughput(Throughput::Elements(baseline.len() as u64));

    group.bench_function("pixel_stats", |b| {
        b.iter(|| {
            let stats = pixel_stats(
                black_box(&baseline.samples),
                black_box(&comparison.samples),
                1.0,
            );
            black_box(stats)
        })
    });

    group.finish();
}

/// Benchmark the full array comparison including normalization.
fn bench_compare_normalized(c: &mut Criterion) {
    let prepare = |array: PixelArray| {
        array
            .with_rescale(Rescale::new(1.0, -1024.0))
            .with_window(Window::new(40.0, 400.0))
    };
    let baseline = prepare(image(0.0));
    let comparison = prepare(image(3.0));
    let opts = ImageOptions::default();

    let mut group = c.benchmark_group("pixels");
    group.throughput(Throughput::Elements(baseline.len() as u64));

    group.bench_function("compare_arrays_normalized", |b| {
        b.iter(|| {
            let outcome = compare_arrays(black_box(&baseline), black_box(&comparison), &opts);
            black_box(outcome)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tag_compare,
    bench_pixel_stats,
    bench_compare_normalized,
);
criterion_main!(benches);
