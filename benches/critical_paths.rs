//! Criterion benchmarks for aseprite-mcp critical paths
//!
//! Benchmarks the operations that run on every tool call or every pixel:
//! - Color: CSS color parsing (hex and named)
//! - Palette: nearest-color search
//! - Dither: threshold lookup over a region
//! - Script: Lua generation for large draw operations
//! - Downsample: box averaging with palette snapping

use aseprite_mcp::color::{parse_color, Color};
use aseprite_mcp::dither::DitherPattern;
use aseprite_mcp::downsample::downsample;
use aseprite_mcp::palette::nearest_palette_index;
use aseprite_mcp::pager;
use aseprite_mcp::script::{self, Operation, PixelWrite, Rect};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};

// =============================================================================
// Test Data Generators
// =============================================================================

/// A palette of `n` colors spread over the RGB cube
fn make_palette(n: usize) -> Vec<Color> {
    (0..n)
        .map(|i| Color::rgb((i * 37 % 256) as u8, (i * 91 % 256) as u8, (i * 151 % 256) as u8))
        .collect()
}

/// A square block of pixel writes cycling through `palette`
fn make_pixels(side: i32, palette: &[Color]) -> Vec<PixelWrite> {
    (0..side * side)
        .map(|i| PixelWrite { x: i % side, y: i / side, color: palette[i as usize % palette.len()] })
        .collect()
}

/// A horizontal gradient image
fn make_gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
    })
}

// =============================================================================
// Color Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    for input in ["#F00", "#FF000080", "rebeccapurple", "rgb(12, 34, 56)"] {
        group.bench_with_input(BenchmarkId::new("parse_color", input), &input, |b, s| {
            b.iter(|| parse_color(black_box(s)))
        });
    }

    group.finish();
}

// =============================================================================
// Palette Benchmarks
// =============================================================================

fn bench_palette(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette");
    let query = Color::rgb(200, 100, 50);

    for size in [4, 16, 64, 256].iter() {
        let palette = make_palette(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("nearest_index", size), &palette, |b, p| {
            b.iter(|| nearest_palette_index(black_box(query), black_box(p)))
        });
    }

    group.finish();
}

// =============================================================================
// Dither Benchmarks
// =============================================================================

fn bench_dither(c: &mut Criterion) {
    let mut group = c.benchmark_group("dither");

    for pattern in [DitherPattern::Checkerboard, DitherPattern::Bayer4x4, DitherPattern::Bayer8x8] {
        group.throughput(Throughput::Elements(64 * 64));
        group.bench_function(BenchmarkId::new("region_64x64", pattern.name()), |b| {
            b.iter(|| {
                let mut first = 0u32;
                for y in 0..64 {
                    for x in 0..64 {
                        if pattern.picks_first(x, y, black_box(0.4)) {
                            first += 1;
                        }
                    }
                }
                first
            })
        });
    }

    group.bench_function("matrix_8x8", |b| b.iter(|| DitherPattern::Bayer8x8.matrix()));

    group.finish();
}

// =============================================================================
// Script Generation Benchmarks
// =============================================================================

fn bench_script(c: &mut Criterion) {
    let mut group = c.benchmark_group("script");
    let palette = make_palette(16);

    for side in [8, 32, 64].iter() {
        let op = Operation::DrawPixels {
            layer: "Layer 1".into(),
            frame: 1,
            pixels: make_pixels(*side, &palette),
            use_palette: true,
        };
        group.throughput(Throughput::Elements((*side * *side) as u64));
        group.bench_with_input(BenchmarkId::new("draw_pixels", side), &op, |b, op| {
            b.iter(|| script::generate(black_box(op)))
        });
    }

    let dither = Operation::DrawWithDither {
        layer: "Layer 1".into(),
        frame: 1,
        rect: Rect::new(0, 0, 256, 256),
        color1: Color::rgb(255, 0, 0),
        color2: Color::rgb(0, 0, 255),
        pattern: "bayer_8x8".into(),
        ratio: 0.5,
        use_palette: false,
    };
    group.bench_function("draw_with_dither", |b| b.iter(|| script::generate(black_box(&dither))));

    let rect = Rect::new(0, 0, 512, 512);
    group.bench_function("pager_plan_chain", |b| {
        b.iter(|| {
            let mut cursor = String::new();
            loop {
                let page =
                    pager::plan(&rect, Some(cursor.as_str()), Some(10_000)).expect("valid cursor");
                cursor = page.next_cursor();
                if cursor.is_empty() {
                    break;
                }
            }
        })
    });

    group.finish();
}

// =============================================================================
// Downsample Benchmarks
// =============================================================================

fn bench_downsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsample");
    let src = make_gradient(512, 512);
    let palette = make_palette(32);

    group.bench_function("512_to_64", |b| b.iter(|| downsample(black_box(&src), 64, 64, None)));
    group.bench_function("512_to_64_snapped", |b| {
        b.iter(|| downsample(black_box(&src), 64, 64, Some(palette.as_slice())))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_color,
    bench_palette,
    bench_dither,
    bench_script,
    bench_downsample
);
criterion_main!(benches);
