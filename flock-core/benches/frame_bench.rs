use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use flock_core::{FlockConfig, Simulation};
use std::time::Duration;

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("flock_frame");
    group.sample_size(env_usize("FLOCK_BENCH_SAMPLES", 20));
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(8));

    let steps = env_usize("FLOCK_BENCH_STEPS", 16);
    let prey_counts: Vec<usize> = std::env::var("FLOCK_BENCH_PREY")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|t| t.trim().parse::<usize>().ok())
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![500, 2000, 8000]);

    for &prey in &prey_counts {
        group.bench_with_input(BenchmarkId::new("steps", prey), &prey, |b, &prey| {
            b.iter_batched(
                || {
                    let mut config = FlockConfig::default();
                    config.world.prey_count = prey;
                    config.world.predator_count = 4;
                    // Keep density roughly constant as the count grows.
                    let half = (prey as f32).sqrt() * 2.5;
                    config.world.bounds.min = glam::Vec2::splat(-half);
                    config.world.bounds.max = glam::Vec2::splat(half);
                    Simulation::new(config).expect("valid bench config")
                },
                |mut sim| {
                    for _ in 0..steps {
                        sim.step(1.0 / 60.0);
                    }
                    sim
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frames);
criterion_main!(benches);
