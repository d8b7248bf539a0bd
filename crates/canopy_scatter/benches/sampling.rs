mod common;

use std::hint::black_box;

use canopy_scatter::sampling::poisson_disk::PoissonDiskSampling;
use canopy_scatter::sampling::PositionSampling;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DISTANCES: [f32; 5] = [16.0, 8.0, 4.0, 2.0, 1.0];

fn sampling_poisson_benches(c: &mut Criterion) {
    let extent = Vec2::new(256.0, 256.0);

    let mut group = c.benchmark_group("sampling/poisson_disk");

    for &distance in &DISTANCES {
        let strategy = PoissonDiskSampling::new(distance);
        let mut rng_est = StdRng::seed_from_u64(0xBEEFu64 ^ (distance as u64));
        let expected = strategy.generate(extent.into(), &mut rng_est).len();
        group.throughput(common::elements_throughput(expected));

        let mut rng = StdRng::seed_from_u64(0xC0FFEEu64 ^ (distance as u64));

        group.bench_with_input(BenchmarkId::from_parameter(distance), &distance, |b, _| {
            b.iter(|| {
                let pts = strategy.generate(extent.into(), &mut rng);
                black_box(pts.len());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = sampling_poisson_benches
}
criterion_main!(benches);
