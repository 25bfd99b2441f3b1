// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use ricochet_geom::math::{clamp, Vec3, EPSILON};
use ricochet_geom::{Aabb, CircleShape, Shape};

use super::aabb::sweep_boxes;
use super::{circle_of, Contact};

fn overlap_circles(a: &CircleShape, b: &CircleShape) -> Option<Contact> {
    let offset = b.center() - a.center();
    let reach = a.radius() + b.radius();
    let dist_sq = offset.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > EPSILON {
        offset.scale(1.0 / dist)
    } else {
        Vec3::UNIT_Y
    };
    Some(Contact::overlap(normal, reach - dist))
}

/// Circle against a world box. A center inside the box is pushed out
/// through the nearest face.
fn overlap_circle_box(circle: &CircleShape, bounds: &Aabb) -> Option<Contact> {
    let c = circle.center();
    let r = circle.radius();
    let closest = Vec3::new(
        clamp(c.x(), bounds.min().x(), bounds.max().x()),
        clamp(c.y(), bounds.min().y(), bounds.max().y()),
        clamp(c.z(), bounds.min().z(), bounds.max().z()),
    );
    let to_box = closest - c;
    let dist_sq = to_box.length_squared();

    if dist_sq > EPSILON * EPSILON {
        if dist_sq >= r * r {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Contact::overlap(to_box.scale(1.0 / dist), r - dist));
    }

    let mut best = (f32::INFINITY, Vec3::UNIT_Y);
    for i in 0..3 {
        let to_min = c.get(i) - bounds.min().get(i);
        let to_max = bounds.max().get(i) - c.get(i);
        if to_min < best.0 {
            best = (to_min, Vec3::unit(i));
        }
        if to_max < best.0 {
            best = (to_max, -Vec3::unit(i));
        }
    }
    Some(Contact::overlap(best.1, r + best.0))
}

fn sweep_circles(a: &CircleShape, va: Vec3, b: &CircleShape, vb: Vec3, window: f32) -> Option<Contact> {
    let s = b.center() - a.center();
    let v = vb - va;
    let reach = a.radius() + b.radius();
    let qa = v.dot(&v);
    if qa <= EPSILON * EPSILON {
        return None;
    }
    let qb = s.dot(&v);
    if qb >= 0.0 {
        return None;
    }
    let qc = s.dot(&s) - reach * reach;
    let disc = qb * qb - qa * qc;
    if disc <= 0.0 {
        return None;
    }
    let t = (-qb - disc.sqrt()) / qa;
    if !(0.0..window).contains(&t) {
        return None;
    }
    let at_touch = s + v.scale(t);
    let normal = if at_touch.length_squared() > EPSILON * EPSILON {
        at_touch.normalize()
    } else {
        v.normalize().scale(-1.0)
    };
    Some(Contact::swept(normal, t))
}

/// Overlap of two circles.
pub fn static_circle_vs_circle(a: &Shape, b: &Shape) -> Option<Contact> {
    overlap_circles(circle_of(a)?, circle_of(b)?)
}

/// Overlap of a circle (`a`) and an axis-aligned box (`b`).
pub fn static_circle_vs_aabb(a: &Shape, b: &Shape) -> Option<Contact> {
    overlap_circle_box(circle_of(a)?, &b.world_aabb())
}

/// Overlap of an axis-aligned box (`a`) and a circle (`b`).
pub fn static_aabb_vs_circle(a: &Shape, b: &Shape) -> Option<Contact> {
    static_circle_vs_aabb(b, a).map(Contact::flipped)
}

/// Swept test of two circles: a ray against the summed-radius sphere.
pub fn dynamic_circle_vs_circle(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    let (ca, cb) = (circle_of(a)?, circle_of(b)?);
    overlap_circles(ca, cb).or_else(|| sweep_circles(ca, va, cb, vb, window))
}

/// Swept test of a circle (`a`) and an axis-aligned box (`b`); the moving
/// circle is approximated by its bounding box.
pub fn dynamic_circle_vs_aabb(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    let circle = circle_of(a)?;
    let bounds = b.world_aabb();
    overlap_circle_box(circle, &bounds)
        .or_else(|| sweep_boxes(&circle.world_bounds(), va, &bounds, vb, window))
}

/// Swept test of an axis-aligned box (`a`) and a circle (`b`).
pub fn dynamic_aabb_vs_circle(a: &Shape, va: Vec3, b: &Shape, vb: Vec3, window: f32) -> Option<Contact> {
    dynamic_circle_vs_aabb(b, vb, a, va, window).map(Contact::flipped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ricochet_geom::Transform;

    fn circle_at(at: Vec3, r: f32) -> Shape {
        let mut s = Shape::circle(Vec3::ZERO, r);
        s.set_model_transform_and_update(&Transform::from_translation(at));
        s
    }

    fn box_at(at: Vec3) -> Shape {
        let mut s = Shape::aabb(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0)));
        s.set_model_transform_and_update(&Transform::from_translation(at));
        s
    }

    #[test]
    fn circles_overlap_strictly() {
        let a = circle_at(Vec3::ZERO, 1.0);
        let b = circle_at(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let hit = static_circle_vs_circle(&a, &b).unwrap();
        assert_eq!(hit.normal, Vec3::UNIT_X);
        assert!((hit.penetration - 0.5).abs() < 1e-6);
        let touching = circle_at(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(static_circle_vs_circle(&a, &touching).is_none());
    }

    #[test]
    fn coincident_circles_use_fallback_normal() {
        let a = circle_at(Vec3::ZERO, 1.0);
        let hit = static_circle_vs_circle(&a, &a).unwrap();
        assert_eq!(hit.normal, Vec3::UNIT_Y);
        assert!((hit.penetration - 2.0).abs() < 1e-6);
    }

    #[test]
    fn circle_center_inside_box_exits_nearest_face() {
        let c = circle_at(Vec3::new(0.0, 0.8, 0.0), 0.5);
        let b = box_at(Vec3::ZERO);
        let hit = static_circle_vs_aabb(&c, &b).unwrap();
        // Nearest face is the box top, so the box lies below the circle.
        assert_eq!(hit.normal, -Vec3::UNIT_Y);
        assert!((hit.penetration - 0.7).abs() < 1e-5);
        let flipped = static_aabb_vs_circle(&b, &c).unwrap();
        assert_eq!(flipped.normal, Vec3::UNIT_Y);
    }

    #[test]
    fn circle_near_box_corner_misses() {
        let c = circle_at(Vec3::new(1.6, 1.6, 0.0), 0.5);
        let b = box_at(Vec3::ZERO);
        assert!(static_circle_vs_aabb(&c, &b).is_none());
    }

    #[test]
    fn swept_circles_meet_at_first_root() {
        let a = circle_at(Vec3::ZERO, 1.0);
        let b = circle_at(Vec3::new(10.0, 0.0, 0.0), 1.0);
        let hit = dynamic_circle_vs_circle(&a, Vec3::new(2.0, 0.0, 0.0), &b, Vec3::ZERO, 5.0).unwrap();
        assert!((hit.time - 4.0).abs() < 1e-5);
        assert!(hit.normal.approx_eq(&Vec3::UNIT_X, 1e-6));
        assert!(dynamic_circle_vs_circle(&a, Vec3::new(2.0, 0.0, 0.0), &b, Vec3::ZERO, 3.0).is_none());
        assert!(dynamic_circle_vs_circle(&a, Vec3::new(-2.0, 0.0, 0.0), &b, Vec3::ZERO, 50.0).is_none());
    }

    #[test]
    fn wrong_variant_yields_no_contact() {
        let b = box_at(Vec3::ZERO);
        assert!(static_circle_vs_circle(&b, &b).is_none());
    }
}
