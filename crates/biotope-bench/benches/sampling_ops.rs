//! Pseudo-absence sampling benchmarks.

use biotope_raster::{sample_pseudo_absences, PseudoAbsenceOptions};
use biotope_test_utils::{presence_grid, two_region_raster};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_sampling(c: &mut Criterion) {
    let env = two_region_raster(720, 360);
    let presences: Vec<(usize, usize)> = (0..50).map(|i| (i + 10, i * 3 + 20)).collect();
    let species = presence_grid(720, 360, &presences);

    let mut group = c.benchmark_group("pseudo_absences");
    for count in [100usize, 1000] {
        group.bench_function(format!("draw_{count}"), |b| {
            let opts = PseudoAbsenceOptions {
                count,
                seed: 7,
                ..Default::default()
            };
            b.iter(|| {
                sample_pseudo_absences(
                    black_box(env.band(1).unwrap()),
                    env.nodata(),
                    black_box(&species),
                    &opts,
                )
                .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sampling);
criterion_main!(benches);
