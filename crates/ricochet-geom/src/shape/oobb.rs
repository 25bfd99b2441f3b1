// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::error::GeomError;
use crate::math::{clamp, Vec3};
use crate::types::{aabb::Aabb, transform::Transform};

/// Oriented box collider.
///
/// World state is recomputed from the object-space box on every transform
/// change: eight corners, three unit axes, scaled half extents and center.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OobbShape {
    local: Aabb,
    center: Vec3,
    axes: [Vec3; 3],
    half_extents: Vec3,
    corners: [Vec3; 8],
    world: Aabb,
    transform: Transform,
}

impl OobbShape {
    /// Creates the collider from an object-space box.
    #[must_use]
    pub fn new(local: Aabb) -> Self {
        let mut shape = Self {
            local,
            center: local.center(),
            axes: [Vec3::UNIT_X, Vec3::UNIT_Y, Vec3::UNIT_Z],
            half_extents: local.half_extents(),
            corners: local.corners(),
            world: local,
            transform: Transform::identity(),
        };
        shape.update(&Transform::identity());
        shape
    }

    /// Bounds the given object-space vertices.
    ///
    /// # Errors
    /// Returns [`GeomError::EmptyPointSet`] when `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Result<Self, GeomError> {
        Aabb::from_points(points).map(Self::new)
    }

    /// Object-space box.
    #[must_use]
    pub fn local(&self) -> Aabb {
        self.local
    }

    /// World center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Unit world axes of the box.
    #[must_use]
    pub fn axes(&self) -> &[Vec3; 3] {
        &self.axes
    }

    /// World half extents along [`Self::axes`].
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// World corners, ordered like [`Aabb::corners`].
    #[must_use]
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// World axis-aligned bound of the corners.
    #[must_use]
    pub fn world(&self) -> Aabb {
        self.world
    }

    /// Last model transform applied.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Radius of the sphere through the corners.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.half_extents.length()
    }

    /// Half-length of the box's projection onto `axis` (not necessarily unit).
    #[must_use]
    pub fn projected_radius(&self, axis: &Vec3) -> f32 {
        (0..3)
            .map(|i| self.half_extents.get(i) * self.axes[i].dot(axis).abs())
            .sum()
    }

    /// Closest point of the box (surface or interior) to `point`.
    #[must_use]
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        let d = point.sub(&self.center);
        (0..3).fold(self.center, |acc, i| {
            let h = self.half_extents.get(i);
            let dist = clamp(d.dot(&self.axes[i]), -h, h);
            acc.add(&self.axes[i].scale(dist))
        })
    }

    /// Expresses `point` in the box frame (origin at center, box axes).
    #[must_use]
    pub fn to_local_frame(&self, point: &Vec3) -> Vec3 {
        let d = point.sub(&self.center);
        Vec3::new(d.dot(&self.axes[0]), d.dot(&self.axes[1]), d.dot(&self.axes[2]))
    }

    pub(crate) fn update(&mut self, transform: &Transform) {
        let rot = transform.rotation().normalize();
        self.center = transform.transform_point(&self.local.center());
        self.axes = [
            rot.rotate(&Vec3::UNIT_X),
            rot.rotate(&Vec3::UNIT_Y),
            rot.rotate(&Vec3::UNIT_Z),
        ];
        self.half_extents = self.local.half_extents().hadamard(&transform.scale().abs());
        let local_corners = self.local.corners();
        for (dst, src) in self.corners.iter_mut().zip(local_corners.iter()) {
            *dst = transform.transform_point(src);
        }
        self.world = self
            .corners
            .iter()
            .skip(1)
            .fold(Aabb::from_corners(self.corners[0], self.corners[0]), |acc, c| {
                acc.union(&Aabb::from_corners(*c, *c))
            });
        self.transform = *transform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;

    #[test]
    fn rotated_box_world_bound_encloses_corners() {
        let mut shape = OobbShape::new(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.5)));
        let tf = Transform::new(
            Vec3::new(3.0, 0.0, 0.0),
            Quat::from_axis_angle(Vec3::UNIT_Z, core::f32::consts::FRAC_PI_4),
            Vec3::ONE,
        );
        shape.update(&tf);
        assert!(shape.center().approx_eq(&Vec3::new(3.0, 0.0, 0.0), 1e-6));
        for c in shape.corners() {
            assert!(shape.world().inflate(1e-5).contains_point(c));
        }
        let expected = (2.0 + 1.0) * core::f32::consts::FRAC_1_SQRT_2;
        assert!((shape.world().half_extents().x() - expected).abs() < 1e-5);
    }

    #[test]
    fn closest_point_clamps_to_faces() {
        let shape = OobbShape::new(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE));
        let q = shape.closest_point(&Vec3::new(5.0, 0.5, -3.0));
        assert!(q.approx_eq(&Vec3::new(1.0, 0.5, -1.0), 1e-6));
    }
}
