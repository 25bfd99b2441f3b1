// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use ricochet_geom::math::{Vec3, EPSILON};
use ricochet_geom::{CircleShape, OobbShape, Shape};

use super::aabb::sweep_boxes;
use super::{box_of, circle_of, Contact};

/// Cross products shorter than this come from near-parallel edges and are
/// skipped as separating-axis candidates.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Separating-axis test over the 3 + 3 face axes and 9 edge cross products.
fn overlap_oriented(a: &OobbShape, b: &OobbShape) -> Option<Contact> {
    let between = b.center() - a.center();
    let mut candidates: Vec<Vec3> = Vec::with_capacity(15);
    candidates.extend_from_slice(a.axes());
    candidates.extend_from_slice(b.axes());
    for ea in a.axes() {
        for eb in b.axes() {
            let edge = ea.cross(eb);
            if edge.length_squared() > PARALLEL_EPSILON {
                candidates.push(edge.normalize());
            }
        }
    }

    let mut best: Option<(f32, Vec3)> = None;
    for axis in candidates {
        let centers = between.dot(&axis);
        let overlap = a.projected_radius(&axis) + b.projected_radius(&axis) - centers.abs();
        if overlap <= 0.0 {
            return None;
        }
        if best.is_none_or(|(depth, _)| overlap < depth) {
            let oriented = if centers >= 0.0 { axis } else { -axis };
            best = Some((overlap, oriented));
        }
    }
    best.map(|(depth, normal)| Contact::overlap(normal, depth))
}

/// Oriented box (`a`) against a circle (`b`), in the box frame.
fn overlap_oriented_circle(a: &OobbShape, b: &CircleShape) -> Option<Contact> {
    let c = b.center();
    let r = b.radius();
    let closest = a.closest_point(&c);
    let out = c - closest;
    let dist_sq = out.length_squared();

    if dist_sq > EPSILON * EPSILON {
        if dist_sq >= r * r {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Contact::overlap(out.scale(1.0 / dist), r - dist));
    }

    let local = a.to_local_frame(&c);
    let he = a.half_extents();
    let mut face = 0;
    for i in 1..3 {
        if he.get(i) - local.get(i).abs() < he.get(face) - local.get(face).abs() {
            face = i;
        }
    }
    let depth = he.get(face) - local.get(face).abs();
    let axis = a.axes()[face];
    let normal = if local.get(face) >= 0.0 { axis } else { -axis };
    Some(Contact::overlap(normal, r + depth))
}

/// Overlap of two oriented boxes.
pub fn static_oobb_vs_oobb(a: &Shape, b: &Shape) -> Option<Contact> {
    overlap_oriented(&box_of(a)?, &box_of(b)?)
}

/// Overlap of an oriented box (`a`) and an axis-aligned box (`b`).
pub fn static_oobb_vs_aabb(a: &Shape, b: &Shape) -> Option<Contact> {
    static_oobb_vs_oobb(a, b)
}

/// Overlap of an axis-aligned box (`a`) and an oriented box (`b`).
pub fn static_aabb_vs_oobb(a: &Shape, b: &Shape) -> Option<Contact> {
    static_oobb_vs_aabb(b, a).map(Contact::flipped)
}

/// Overlap of an oriented box (`a`) and a circle (`b`).
pub fn static_oobb_vs_circle(a: &Shape, b: &Shape) -> Option<Contact> {
    overlap_oriented_circle(&box_of(a)?, circle_of(b)?)
}

/// Overlap of a circle (`a`) and an oriented box (`b`).
pub fn static_circle_vs_oobb(a: &Shape, b: &Shape) -> Option<Contact> {
    static_oobb_vs_circle(b, a).map(Contact::flipped)
}

fn static_then_swept(
    a: &Shape,
    va: Vec3,
    b: &Shape,
    vb: Vec3,
    window: f32,
    overlap: fn(&Shape, &Shape) -> Option<Contact>,
) -> Option<Contact> {
    overlap(a, b).or_else(|| sweep_boxes(&a.world_aabb(), va, &b.world_aabb(), vb, window))
}

/// Swept test of two oriented boxes over their world bounds.
pub fn dynamic_oobb_vs_oobb(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    static_then_swept(a, va, b, vb, window, static_oobb_vs_oobb)
}

/// Swept test of an oriented box (`a`) and an axis-aligned box (`b`).
pub fn dynamic_oobb_vs_aabb(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    static_then_swept(a, va, b, vb, window, static_oobb_vs_aabb)
}

/// Swept test of an axis-aligned box (`a`) and an oriented box (`b`).
pub fn dynamic_aabb_vs_oobb(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    dynamic_oobb_vs_aabb(b, vb, a, va, window).map(Contact::flipped)
}

/// Swept test of an oriented box (`a`) and a circle (`b`).
pub fn dynamic_oobb_vs_circle(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    static_then_swept(a, va, b, vb, window, static_oobb_vs_circle)
}

/// Swept test of a circle (`a`) and an oriented box (`b`).
pub fn dynamic_circle_vs_oobb(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    dynamic_oobb_vs_circle(b, vb, a, va, window).map(Contact::flipped)
}
