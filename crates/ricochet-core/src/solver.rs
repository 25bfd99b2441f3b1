// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision response: positional correction and impulses.

use ricochet_geom::math::{Vec3, EPSILON};
use tracing::trace;

use crate::body::RigidBody;
use crate::manifold::Manifold;

/// Resolves one manifold between `a` and `b` (in manifold order).
///
/// Static contacts are pushed apart along the normal: a body that cannot
/// move leaves the whole correction to the other one, otherwise it is split
/// evenly. Any closing speed along the normal is then removed without bounce,
/// so bodies resting in a stack do not gain speed step after step. Swept
/// contacts advance both bodies to the time of impact, exchange
/// a restitution impulse and, when `enable_friction` is set, a Coulomb-capped
/// tangential impulse. Both bodies then only integrate what is left of `dt`.
pub fn resolve_collision(
    a: &mut RigidBody,
    b: &mut RigidBody,
    manifold: &Manifold,
    dt: f32,
    enable_friction: bool,
) {
    if manifold.static_collision {
        correct_positions(a, b, manifold);
    } else {
        apply_impulses(a, b, manifold, dt, enable_friction);
    }
}

fn correct_positions(a: &mut RigidBody, b: &mut RigidBody, manifold: &Manifold) {
    let n = manifold.normal;
    let push = n.scale(manifold.penetration);
    let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
    match (inv_a > 0.0, inv_b > 0.0) {
        (false, false) => return,
        (false, true) => b.translate(&push),
        (true, false) => a.translate(&-push),
        (true, true) => {
            let half = push.scale(0.5);
            a.translate(&-half);
            b.translate(&half);
        }
    }

    let vn = (b.linear_velocity() - a.linear_velocity()).dot(&n);
    if vn >= 0.0 {
        return;
    }
    let j = -vn / (inv_a + inv_b);
    push_velocity(a, -n.scale(j * inv_a));
    push_velocity(b, n.scale(j * inv_b));
}

fn apply_impulses(
    a: &mut RigidBody,
    b: &mut RigidBody,
    manifold: &Manifold,
    dt: f32,
    enable_friction: bool,
) {
    let toi = manifold.intersect_time.max(0.0);
    a.advance(toi);
    b.advance(toi);
    let left_a = a.solve_time_left() - toi;
    let left_b = b.solve_time_left() - toi;
    a.set_collision_status(true, left_a);
    b.set_collision_status(true, left_b);

    let n = manifold.normal;
    let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
    let inv_sum = inv_a + inv_b;
    if inv_sum <= EPSILON {
        return;
    }

    let rel = b.linear_velocity() - a.linear_velocity();
    let vn = rel.dot(&n);
    if vn > 0.0 {
        trace!(vn, "bodies already separating");
        return;
    }

    let j = ((1.0 + manifold.restitution) * vn).abs() / inv_sum;
    push_velocity(a, -n.scale(j * inv_a));
    push_velocity(b, n.scale(j * inv_b));

    if !enable_friction {
        return;
    }
    let rel = b.linear_velocity() - a.linear_velocity();
    let tangential = rel - n.scale(rel.dot(&n));
    if tangential.length_squared() <= EPSILON * EPSILON {
        return;
    }
    let t = tangential.normalize();
    let normal_force = manifold.gravity.dot(&n).abs() / inv_sum;
    let slide = rel.dot(&t).abs() / inv_sum;
    let jt = (manifold.friction * normal_force * dt).min(slide);
    push_velocity(a, t.scale(jt * inv_a));
    push_velocity(b, -t.scale(jt * inv_b));
}

fn push_velocity(body: &mut RigidBody, delta: Vec3) {
    if delta.length_squared() > 0.0 {
        body.set_linear_velocity(body.linear_velocity() + delta);
    }
}
