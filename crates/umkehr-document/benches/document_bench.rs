// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-page hot path: inverting and encoding a
// rendered raster, plus resolving a long selection expression.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use umkehr_core::ImageEncoding;
use umkehr_document::PageSelection;
use umkehr_document::image::{ChannelLayout, ImageCodec, PixelInverter, Raster, RasterCodec};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A Letter page at 150 dpi is 1275x1650 pixels.
fn letter_page() -> Raster {
    let (width, height) = (1275u32, 1650u32);
    let samples = (0..width as usize * height as usize * 3)
        .map(|i| (i % 251) as u8)
        .collect();
    Raster::new(width, height, ChannelLayout::Rgb, samples).expect("sample buffer sized to page")
}

fn bench_invert(c: &mut Criterion) {
    let page = letter_page();
    let inverter = PixelInverter::default();

    c.bench_function("invert (1275x1650 rgb)", |b| {
        b.iter(|| black_box(inverter.invert(black_box(&page))));
    });
}

fn bench_encode(c: &mut Criterion) {
    let page = PixelInverter::default().invert(&letter_page());

    c.bench_function("encode lossless (1275x1650 rgb)", |b| {
        b.iter(|| black_box(ImageCodec.encode(black_box(&page), ImageEncoding::Lossless)));
    });
    c.bench_function("encode jpeg q85 (1275x1650 rgb)", |b| {
        b.iter(|| {
            black_box(ImageCodec.encode(black_box(&page), ImageEncoding::Jpeg { quality: 85 }))
        });
    });
}

fn bench_selection(c: &mut Criterion) {
    let expression = "1-12,14-20,22-32,56,66-78,82-97";

    c.bench_function("resolve selection", |b| {
        b.iter(|| black_box(PageSelection::resolve(black_box(expression), Some(100))));
    });
}

criterion_group!(benches, bench_invert, bench_encode, bench_selection);
criterion_main!(benches);
