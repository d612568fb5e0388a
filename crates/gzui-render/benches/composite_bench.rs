//! Benchmarks for compositing and PNG encoding.
//!
//! Run with: cargo bench -p gzui-render

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gzui_core::BlitMode;
use gzui_render::{DecodedImage, FixedBands, ImageBlob, SliceRule, composite};
use image::{Rgba, RgbaImage};
use std::hint::black_box;

fn dialog_frame() -> DecodedImage {
    let pixels = RgbaImage::from_fn(90, 186, |x, y| Rgba([x as u8, y as u8, 128, 255]));
    let table = FixedBands::DIALOG.table(90, 186, None);
    DecodedImage::from_rgba(pixels).with_slices(table)
}

fn bench_modes(c: &mut Criterion) {
    let image = dialog_frame();
    let mut group = c.benchmark_group("composite");
    for (w, h) in [(120, 200), (640, 480), (1024, 768)] {
        for mode in [BlitMode::Normal, BlitMode::Tile, BlitMode::Edge] {
            group.bench_with_input(
                BenchmarkId::new(mode.as_str(), format!("{w}x{h}")),
                &(w, h),
                |b, &(w, h)| b.iter(|| composite(black_box(&image), w, h, mode)),
            );
        }
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let pixels = composite(&dialog_frame(), 640, 480, BlitMode::Edge);
    c.bench_function("encode_png_640x480", |b| {
        b.iter(|| ImageBlob::encode(black_box(&pixels)))
    });
}

criterion_group!(benches, bench_modes, bench_encode);
criterion_main!(benches);
