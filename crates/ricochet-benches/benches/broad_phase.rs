// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
// criterion_group!/criterion_main! expand to undocumented functions that cannot
// carry #[allow] (attributes on macro invocations are ignored). Crate-level
// suppress is required for benchmark binaries using Criterion.
#![allow(missing_docs)]
#![allow(clippy::expect_used)]
//! Dynamic AABB tree maintenance and queries.
//!
//! # Running
//!
//! ```sh
//! cargo bench --package ricochet-benches --bench broad_phase
//! ```
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use ricochet_geom::math::Vec3;
use ricochet_geom::{Aabb, DynamicAabbTree};
use std::{hint::black_box, time::Duration};

/// Unit boxes on a cubic grid with 1.5 spacing, so neighbours never touch.
fn grid_boxes(n: usize) -> Vec<(usize, Aabb)> {
    let mut side = 1;
    while side * side * side < n {
        side += 1;
    }
    (0..n)
        .map(|i| {
            let (x, y, z) = (i % side, (i / side) % side, i / (side * side));
            let c = Vec3::new(x as f32, y as f32, z as f32).scale(1.5);
            (i, Aabb::from_center_half_extents(c, Vec3::splat(0.5)))
        })
        .collect()
}

fn build_tree(boxes: &[(usize, Aabb)]) -> DynamicAabbTree<usize> {
    let mut tree = DynamicAabbTree::new();
    for &(key, aabb) in boxes {
        tree.insert_object(key, aabb).expect("unique keys");
    }
    tree
}

fn bench_tree(c: &mut Criterion) {
    let mut insert = c.benchmark_group("tree_insert");
    insert.sample_size(30);
    insert.measurement_time(Duration::from_secs(5));
    for &n in &[100usize, 1_000, 10_000] {
        let boxes = grid_boxes(n);
        insert.throughput(Throughput::Elements(n as u64));
        insert.bench_with_input(BenchmarkId::from_parameter(n), &boxes, |b, boxes| {
            b.iter(|| black_box(build_tree(boxes)));
        });
    }
    insert.finish();

    let mut query = c.benchmark_group("tree_query_all");
    query.sample_size(30);
    for &n in &[100usize, 1_000, 10_000] {
        let boxes = grid_boxes(n);
        let tree = build_tree(&boxes);
        query.throughput(Throughput::Elements(n as u64));
        query.bench_with_input(BenchmarkId::from_parameter(n), &boxes, |b, boxes| {
            b.iter(|| {
                let hits: usize = boxes
                    .iter()
                    .map(|(key, aabb)| tree.query(aabb, Some(key)).len())
                    .sum();
                black_box(hits)
            });
        });
    }
    query.finish();

    // Every object drifts out of its fat box, forcing reinsertion.
    let mut update = c.benchmark_group("tree_update_moved");
    update.sample_size(30);
    for &n in &[100usize, 1_000] {
        let boxes = grid_boxes(n);
        update.throughput(Throughput::Elements(n as u64));
        update.bench_with_input(BenchmarkId::from_parameter(n), &boxes, |b, boxes| {
            b.iter_batched(
                || build_tree(boxes),
                |mut tree| {
                    let shift = Vec3::new(0.3, 0.0, 0.0);
                    for (key, aabb) in boxes {
                        let moved = Aabb::from_center_half_extents(
                            aabb.center() + shift,
                            aabb.half_extents(),
                        );
                        tree.update_object(key, moved).expect("key present");
                    }
                    black_box(tree)
                },
                BatchSize::LargeInput,
            );
        });
    }
    update.finish();
}

criterion_group!(benches, bench_tree);
criterion_main!(benches);
