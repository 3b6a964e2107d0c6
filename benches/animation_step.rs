//! Benchmarks for the CPU side of a frame: field generation, the per-frame
//! blend, vertex interleaving and picking.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stardust::prelude::*;
use stardust::spawn::SpawnContext;
use stardust::ParticleField;

fn config(particles: u32) -> CardConfig {
    CardConfig {
        particle_count: particles,
        seed: Some(7),
        ..CardConfig::default()
    }
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for count in [10_000u32, 40_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let cfg = config(count);
            b.iter(|| {
                let mut ctx = SpawnContext::seeded(1);
                black_box(ParticleField::generate(&cfg, &mut ctx))
            })
        });
    }
    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for count in [10_000u32, 40_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut scene = Scene::new(config(count)).unwrap();
            let photos: Vec<UserPhoto> = (0..15)
                .map(|i| UserPhoto::new(format!("p{i}"), "/missing.png"))
                .collect();
            scene.set_photos(&photos);
            let mut scattered = false;
            let mut frame = 0u32;
            b.iter(|| {
                // Flip layouts every second of frames so particles keep moving.
                frame += 1;
                if frame % 60 == 0 {
                    scattered = !scattered;
                    scene.set_scattered(scattered);
                }
                scene.step(black_box(1.0 / 60.0));
            })
        });
    }
    group.finish();
}

fn bench_vertices(c: &mut Criterion) {
    let scene = Scene::new(config(40_000)).unwrap();
    let mut out = Vec::new();
    c.bench_function("write_vertices_40k", |b| {
        b.iter(|| {
            scene.field().write_vertices(&mut out);
            black_box(out.len())
        })
    });
}

fn bench_hit_test(c: &mut Criterion) {
    let mut scene = Scene::new(config(1_000)).unwrap();
    let photos: Vec<UserPhoto> = (0..15)
        .map(|i| UserPhoto::new(format!("p{i}"), "/missing.png"))
        .collect();
    scene.set_photos(&photos);
    let camera = Camera::for_viewport(1280, 720);

    c.bench_function("hit_test_15_mounts", |b| {
        b.iter(|| black_box(scene.hit_test(black_box(Vec2::new(0.1, 0.2)), &camera)))
    });
}

criterion_group!(benches, bench_generate, bench_step, bench_vertices, bench_hit_test);
criterion_main!(benches);
