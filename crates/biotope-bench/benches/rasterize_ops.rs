//! Rasterization benchmarks: burning a range map at typical resolutions.

use biotope_test_utils::range_feature;
use biotope_vector::{rasterize, RasterizeOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_rasterize(c: &mut Criterion) {
    let features = vec![
        range_feature(-10.0, -10.0, 40.0, "Salmo trutta", 1.0),
        range_feature(50.0, 10.0, 25.0, "Salmo trutta", 1.0),
    ];

    let mut group = c.benchmark_group("rasterize");
    for pixel_size in [1.0, 0.5] {
        group.bench_function(format!("global_{pixel_size}deg"), |b| {
            let opts = RasterizeOptions {
                pixel_size: Some(pixel_size),
                ..Default::default()
            };
            b.iter(|| rasterize(black_box(&features), black_box(&opts)).unwrap());
        });
    }
    group.bench_function("cropped_all_touched", |b| {
        let opts = RasterizeOptions {
            pixel_size: Some(0.5),
            cropped: true,
            all_touched: true,
            ..Default::default()
        };
        b.iter(|| rasterize(black_box(&features), black_box(&opts)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_rasterize);
criterion_main!(benches);
