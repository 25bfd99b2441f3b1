// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::error::GeomError;
use crate::math::Vec3;
use crate::types::{aabb::Aabb, transform::Transform};

/// Bounding sphere collider (called a circle in the collision tables).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircleShape {
    local_center: Vec3,
    local_radius: f32,
    center: Vec3,
    radius: f32,
    transform: Transform,
}

impl CircleShape {
    /// Sphere of `radius` around object-space `center`. Negative radii are mirrored.
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        let radius = radius.abs();
        Self {
            local_center: center,
            local_radius: radius,
            center,
            radius,
            transform: Transform::identity(),
        }
    }

    /// Sphere centered on the vertices' bounding-box center, reaching the farthest vertex.
    ///
    /// # Errors
    /// Returns [`GeomError::EmptyPointSet`] when `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Result<Self, GeomError> {
        let center = Aabb::from_points(points)?.center();
        let radius = points
            .iter()
            .map(|p| p.distance(&center))
            .fold(0.0_f32, f32::max);
        Ok(Self::new(center, radius))
    }

    /// World center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// World radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Object-space center.
    #[must_use]
    pub fn local_center(&self) -> Vec3 {
        self.local_center
    }

    /// Object-space radius.
    #[must_use]
    pub fn local_radius(&self) -> f32 {
        self.local_radius
    }

    /// Last model transform applied.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Object-space bounding box.
    #[must_use]
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.local_center, Vec3::splat(self.local_radius))
    }

    /// World bounding box.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }

    pub(crate) fn update(&mut self, transform: &Transform) {
        self.center = transform.transform_point(&self.local_center);
        self.radius = self.local_radius * transform.scale().abs().max_element();
        self.transform = *transform;
    }
}
