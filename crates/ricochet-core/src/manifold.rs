// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contact data handed from the narrow phase to the resolver.

use ricochet_geom::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::body::RigidBody;
use crate::collision::Contact;
use crate::store::BodyHandle;

/// A narrow-phase hit between two bodies, with the material data needed to
/// resolve it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifold {
    /// First body of the pair.
    pub body_a: BodyHandle,
    /// Second body of the pair.
    pub body_b: BodyHandle,
    /// Unit normal from `body_a` toward `body_b`.
    pub normal: Vec3,
    /// Overlap depth for static contacts.
    pub penetration: f32,
    /// Seconds into the step at which a swept contact touches.
    pub intersect_time: f32,
    /// Average of both friction coefficients.
    pub friction: f32,
    /// Average of both restitution coefficients.
    pub restitution: f32,
    /// Scene gravity when the contact was found.
    pub gravity: Vec3,
    /// `true` when the bodies already overlapped (positional resolution).
    pub static_collision: bool,
}

impl Manifold {
    /// Combines a raw contact with both bodies' materials.
    #[must_use]
    pub fn new(
        (handle_a, a): (BodyHandle, &RigidBody),
        (handle_b, b): (BodyHandle, &RigidBody),
        contact: &Contact,
        gravity: Vec3,
    ) -> Self {
        Self {
            body_a: handle_a,
            body_b: handle_b,
            normal: contact.normal,
            penetration: contact.penetration,
            intersect_time: contact.time,
            friction: 0.5 * (a.friction() + b.friction()),
            restitution: 0.5 * (a.restitution() + b.restitution()),
            gravity,
            static_collision: contact.is_static(),
        }
    }

    /// Pair key with the smaller handle first.
    #[must_use]
    pub fn canonical_pair(&self) -> (BodyHandle, BodyHandle) {
        if self.body_a <= self.body_b {
            (self.body_a, self.body_b)
        } else {
            (self.body_b, self.body_a)
        }
    }
}
