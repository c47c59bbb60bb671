use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spectrum_core::schema::{Category, PositionEntity};
use spectrum_core::{layout, GeometryConfig, ShuffledOrder};

fn synthetic_chamber(count: usize) -> Vec<PositionEntity> {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    (0..count)
        .map(|i| {
            let category = if i % 2 == 0 {
                Category::Democrat
            } else {
                Category::Republican
            };
            let center = if i % 2 == 0 { -0.45 } else { 0.5 };
            let score = (center + rng.gen_range(-0.3..0.3)).clamp(-1.0, 1.0);
            PositionEntity::new(format!("M{i:05}"), format!("Member {i}"), category, "XX", score)
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let geometry = GeometryConfig::default();

    for size in [100usize, 435, 535, 1000] {
        let entities = synthetic_chamber(size);
        group.bench_with_input(BenchmarkId::new("entities", size), &entities, |b, entities| {
            b.iter_batched(
                || ShuffledOrder::seeded(42),
                |mut order| layout(entities, 1200.0, &geometry, &mut order),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(layout_benches, bench_layout);
criterion_main!(layout_benches);
