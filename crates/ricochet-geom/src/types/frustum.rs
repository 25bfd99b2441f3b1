// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::{Mat4, Vec3, EPSILON};
use crate::types::aabb::Aabb;

/// Plane `n · p + d = 0`; points with positive signed distance lie inside.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    normal: Vec3,
    d: f32,
}

impl Plane {
    /// Creates a plane from an inward normal and offset.
    #[must_use]
    pub const fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane through `point` facing `normal`.
    #[must_use]
    pub fn from_point_normal(point: &Vec3, normal: &Vec3) -> Self {
        let n = normal.normalize();
        Self {
            normal: n,
            d: -n.dot(point),
        }
    }

    /// Inward normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Offset term.
    #[must_use]
    pub fn d(&self) -> f32 {
        self.d
    }

    /// Signed distance from the plane to `point` (scaled by `|normal|`).
    #[must_use]
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Rescales so the normal has unit length. Degenerate planes are returned unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let len = self.normal.length();
        if len <= EPSILON {
            return *self;
        }
        Self {
            normal: self.normal.scale(1.0 / len),
            d: self.d / len,
        }
    }

    /// Corner of `aabb` farthest along the normal (the "positive vertex").
    #[must_use]
    pub fn positive_vertex(&self, aabb: &Aabb) -> Vec3 {
        let (lo, hi) = (aabb.min(), aabb.max());
        Vec3::new(
            if self.normal.x() >= 0.0 { hi.x() } else { lo.x() },
            if self.normal.y() >= 0.0 { hi.y() } else { lo.y() },
            if self.normal.z() >= 0.0 { hi.z() } else { lo.z() },
        )
    }
}

/// Six inward-facing planes: left, right, bottom, top, near, far.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Builds a frustum from explicit planes.
    #[must_use]
    pub const fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extracts the planes of a view-projection matrix (Gribb/Hartmann).
    ///
    /// The planes are expressed in the space the matrix maps *from*.
    #[must_use]
    pub fn from_view_projection(m: &Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        let combine = |sign: f32, r: [f32; 4]| {
            Plane::new(
                Vec3::new(r3[0] + sign * r[0], r3[1] + sign * r[1], r3[2] + sign * r[2]),
                r3[3] + sign * r[3],
            )
            .normalized()
        };
        Self {
            planes: [
                combine(1.0, r0),
                combine(-1.0, r0),
                combine(1.0, r1),
                combine(-1.0, r1),
                combine(1.0, r2),
                combine(-1.0, r2),
            ],
        }
    }

    /// The planes in left, right, bottom, top, near, far order.
    #[must_use]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Returns `false` when `aabb` lies fully outside at least one plane.
    ///
    /// Conservative: boxes straddling a frustum corner may be reported visible.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(&plane.positive_vertex(aabb)) >= 0.0)
    }
}
