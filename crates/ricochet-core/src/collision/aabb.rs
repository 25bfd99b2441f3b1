// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use ricochet_geom::math::{Vec3, EPSILON};
use ricochet_geom::{Aabb, Shape};

use super::{min_axis, Contact};

/// Strict overlap of two world boxes, resolved along the axis of least
/// penetration.
pub(super) fn overlap_boxes(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if !a.intersects(b) {
        return None;
    }
    let depth = |i: usize| a.max().get(i).min(b.max().get(i)) - a.min().get(i).max(b.min().get(i));
    let overlaps = [depth(0), depth(1), depth(2)];
    let axis = min_axis(overlaps);
    let towards_b = b.center().get(axis) - a.center().get(axis);
    let normal = if towards_b >= 0.0 {
        Vec3::unit(axis)
    } else {
        -Vec3::unit(axis)
    };
    Some(Contact::overlap(normal, overlaps[axis]))
}

/// Slab test of two boxes moving apart or together at constant velocity.
///
/// Works in `a`'s frame with `v = vb - va`. The normal is the axis whose
/// slab was entered last. Boxes that already overlap are not handled here.
pub(super) fn sweep_boxes(a: &Aabb, va: Vec3, b: &Aabb, vb: Vec3, window: f32) -> Option<Contact> {
    let v = vb - va;
    if v.length_squared() <= EPSILON * EPSILON {
        return None;
    }

    let mut t_first = 0.0_f32;
    let mut t_last = window;
    let mut entry_axis: Option<usize> = None;

    for i in 0..3 {
        let (a_min, a_max) = (a.min().get(i), a.max().get(i));
        let (b_min, b_max) = (b.min().get(i), b.max().get(i));
        let vi = v.get(i);

        if vi.abs() <= EPSILON {
            if !(a_max > b_min && a_min < b_max) {
                return None;
            }
            continue;
        }

        if vi < 0.0 {
            if b_max <= a_min {
                return None;
            }
            if a_max <= b_min {
                let t = (a_max - b_min) / vi;
                if entry_axis.is_none() || t > t_first {
                    t_first = t_first.max(t);
                    entry_axis = Some(i);
                }
            }
            t_last = t_last.min((a_min - b_max) / vi);
        } else {
            if b_min >= a_max {
                return None;
            }
            if b_max <= a_min {
                let t = (a_min - b_max) / vi;
                if entry_axis.is_none() || t > t_first {
                    t_first = t_first.max(t);
                    entry_axis = Some(i);
                }
            }
            t_last = t_last.min((a_max - b_min) / vi);
        }

        if t_first >= t_last {
            return None;
        }
    }

    let axis = entry_axis?;
    let normal = if v.get(axis) < 0.0 {
        Vec3::unit(axis)
    } else {
        -Vec3::unit(axis)
    };
    Some(Contact::swept(normal, t_first))
}

/// Overlap of two axis-aligned boxes.
pub fn static_aabb_vs_aabb(a: &Shape, b: &Shape) -> Option<Contact> {
    overlap_boxes(&a.world_aabb(), &b.world_aabb())
}

/// Swept test of two axis-aligned boxes; an existing overlap is reported as a
/// static contact.
pub fn dynamic_aabb_vs_aabb(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    let (wa, wb) = (a.world_aabb(), b.world_aabb());
    overlap_boxes(&wa, &wb).or_else(|| sweep_boxes(&wa, va, &wb, vb, window))
}
