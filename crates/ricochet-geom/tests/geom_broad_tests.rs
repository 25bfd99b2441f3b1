// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for ricochet-geom broad phase and motion bounds.

use ricochet_geom::broad::DynamicAabbTree;
use ricochet_geom::math::{Quat, Vec3};
use ricochet_geom::{Aabb, Sweep, Transform};

fn cube(center: Vec3, half: f32) -> Aabb {
    Aabb::from_center_half_extents(center, Vec3::splat(half))
}

#[test]
fn sweep_covers_start_and_end_poses() {
    let local = cube(Vec3::ZERO, 1.0);
    let t0 = Transform::identity();
    let t1 = Transform::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let fat = Sweep::new(t0, t1).fat_aabb(&local);
    assert_eq!(fat.min().to_array(), [-1.0, -1.0, -1.0]);
    assert_eq!(fat.max().to_array(), [11.0, 1.0, 1.0]);
}

#[test]
fn sweep_covers_mid_rotation_with_offset() {
    use core::f32::consts::FRAC_PI_2;
    // Rod from x=0..2 rotating a quarter turn about the origin.
    let local = Aabb::from_center_half_extents(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.1, 0.1));
    let t0 = Transform::identity();
    let t1 = Transform::new(Vec3::ZERO, Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2), Vec3::ONE);
    let mid = Transform::new(
        Vec3::ZERO,
        Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2 * 0.5),
        Vec3::ONE,
    );
    let mid_aabb = local.transformed(&mid.to_mat4());
    let fat = Sweep::new(t0, t1).fat_aabb(&local);
    assert!(
        fat.inflate(1e-5).contains(&mid_aabb),
        "fat={fat:?} must enclose mid={mid_aabb:?}"
    );
}

/// Canonical `(low, high)` pairs whose fat boxes overlap, sorted.
fn overlapping_pairs(tree: &DynamicAabbTree<usize>) -> Vec<(usize, usize)> {
    let mut keys: Vec<usize> = tree.objects().copied().collect();
    keys.sort_unstable();
    let mut out = Vec::new();
    for a in keys {
        let bounds = tree.fat_aabb(&a).unwrap();
        for b in tree.query(&bounds, Some(&a)) {
            if a < b {
                out.push((a, b));
            }
        }
    }
    out.sort_unstable();
    out
}

#[test]
fn overlapping_pairs_follow_inserts_and_removes() {
    let mut tree: DynamicAabbTree<usize> = DynamicAabbTree::new();
    tree.insert_object(2, cube(Vec3::new(100.0, 0.0, 0.0), 1.0)).unwrap();
    tree.insert_object(1, cube(Vec3::new(1.0, 0.0, 0.0), 1.0)).unwrap();
    tree.insert_object(0, cube(Vec3::ZERO, 1.0)).unwrap();
    assert_eq!(overlapping_pairs(&tree), vec![(0, 1)]);

    tree.insert_object(3, cube(Vec3::new(0.5, 0.0, 0.0), 1.0)).unwrap();
    assert_eq!(overlapping_pairs(&tree), vec![(0, 1), (0, 3), (1, 3)]);

    tree.remove_object(&0).unwrap();
    assert!(tree.remove_object(&42).is_err());
    assert_eq!(overlapping_pairs(&tree), vec![(1, 3)]);
}

#[test]
fn update_moves_existing_object() {
    let mut tree: DynamicAabbTree<usize> = DynamicAabbTree::new();
    tree.insert_object(0, cube(Vec3::ZERO, 1.0)).unwrap();
    tree.insert_object(1, cube(Vec3::new(10.0, 0.0, 0.0), 1.0)).unwrap();
    assert!(overlapping_pairs(&tree).is_empty());
    assert!(tree.update_object(&1, cube(Vec3::new(1.5, 0.0, 0.0), 1.0)).unwrap());
    assert_eq!(overlapping_pairs(&tree), vec![(0, 1)]);
    assert_eq!(tree.num_objects(), 2);
    tree.validate().unwrap();
}
