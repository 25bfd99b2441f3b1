// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used)]
//! Full `Scene::step` throughput on a settling pile.
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use ricochet_core::{BodyType, RigidBody, Scene};
use ricochet_geom::math::Vec3;
use std::hint::black_box;

const DT: f32 = 1.0 / 60.0;

/// A static floor with `n` cubes in loose layers above it.
fn build_pile(n: usize) -> Scene {
    let mut scene = Scene::default();
    let mut floor = RigidBody::new(0, 0);
    floor.set_body_type(BodyType::Static);
    floor
        .set_aabb_shape(Vec3::new(-50.0, -1.0, -50.0), Vec3::ZERO)
        .expect("fresh body");
    scene.create_rigid_body(floor).expect("floor has a shape");

    let side = 8;
    for i in 0..n {
        let (x, z, layer) = (i % side, (i / side) % side, i / (side * side));
        let at = Vec3::new(x as f32 * 1.2, 1.0 + layer as f32 * 1.5, z as f32 * 1.2);
        let mut body = RigidBody::new(i as u64 + 1, 1);
        body.set_position(at);
        body.set_aabb_shape(at - Vec3::splat(0.5), at + Vec3::splat(0.5))
            .expect("fresh body");
        scene.create_rigid_body(body).expect("cube has a shape");
    }
    scene
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_step");
    group.sample_size(20);
    for &n in &[16usize, 128, 512] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || build_pile(n),
                |mut scene| {
                    for _ in 0..10 {
                        scene.step(DT).expect("valid dt");
                    }
                    black_box(scene.events().len())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
