// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Collision volumes.
//!
//! [`Shape`] is a closed sum over the three supported volumes. Every variant
//! keeps an object-space bound computed once and a world bound refreshed only
//! when [`Shape::set_model_transform_and_update`] sees a new transform.

mod aabb;
mod circle;
mod oobb;

pub use aabb::AabbShape;
pub use circle::CircleShape;
pub use oobb::OobbShape;

use std::f32::consts::PI;

use crate::debug::{DebugColor, DebugDraw};
use crate::error::GeomError;
use crate::math::{Mat4, Vec3};
use crate::types::{aabb::Aabb, frustum::Frustum, motion::Sweep, transform::Transform};

/// Discriminant of [`Shape`], used to index collision dispatch tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeType {
    /// Axis-aligned box.
    Aabb,
    /// Oriented box.
    Oobb,
    /// Bounding sphere.
    Circle,
}

impl ShapeType {
    /// Number of shape kinds.
    pub const COUNT: usize = 3;

    /// Row/column of this kind in a `COUNT x COUNT` table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Aabb => 0,
            Self::Oobb => 1,
            Self::Circle => 2,
        }
    }
}

/// A collision volume attached to a rigid body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Axis-aligned box.
    Aabb(AabbShape),
    /// Oriented box.
    Oobb(OobbShape),
    /// Bounding sphere.
    Circle(CircleShape),
}

impl Shape {
    /// Axis-aligned box from object-space corners.
    #[must_use]
    pub fn aabb(local: Aabb) -> Self {
        Self::Aabb(AabbShape::new(local))
    }

    /// Oriented box from an object-space box.
    #[must_use]
    pub fn oobb(local: Aabb) -> Self {
        Self::Oobb(OobbShape::new(local))
    }

    /// Sphere from an object-space center and radius.
    #[must_use]
    pub fn circle(center: Vec3, radius: f32) -> Self {
        Self::Circle(CircleShape::new(center, radius))
    }

    /// Axis-aligned box enclosing object-space vertex data.
    ///
    /// # Errors
    /// [`GeomError::EmptyPointSet`] when `points` is empty.
    pub fn aabb_from_points(points: &[Vec3]) -> Result<Self, GeomError> {
        AabbShape::from_points(points).map(Self::Aabb)
    }

    /// Oriented box enclosing object-space vertex data.
    ///
    /// # Errors
    /// [`GeomError::EmptyPointSet`] when `points` is empty.
    pub fn oobb_from_points(points: &[Vec3]) -> Result<Self, GeomError> {
        OobbShape::from_points(points).map(Self::Oobb)
    }

    /// Sphere enclosing object-space vertex data.
    ///
    /// # Errors
    /// [`GeomError::EmptyPointSet`] when `points` is empty.
    pub fn circle_from_points(points: &[Vec3]) -> Result<Self, GeomError> {
        CircleShape::from_points(points).map(Self::Circle)
    }

    /// Kind of this shape.
    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Self::Aabb(_) => ShapeType::Aabb,
            Self::Oobb(_) => ShapeType::Oobb,
            Self::Circle(_) => ShapeType::Circle,
        }
    }

    /// World-space center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Aabb(s) => s.world().center(),
            Self::Oobb(s) => s.center(),
            Self::Circle(s) => s.center(),
        }
    }

    /// Radius of the world-space bounding sphere.
    #[must_use]
    pub fn radius(&self) -> f32 {
        match self {
            Self::Aabb(s) => s.radius(),
            Self::Oobb(s) => s.radius(),
            Self::Circle(s) => s.radius(),
        }
    }

    /// World-space axis-aligned bound.
    #[must_use]
    pub fn world_aabb(&self) -> Aabb {
        match self {
            Self::Aabb(s) => s.world(),
            Self::Oobb(s) => s.world(),
            Self::Circle(s) => s.world_bounds(),
        }
    }

    /// Object-space axis-aligned bound.
    #[must_use]
    pub fn local_aabb(&self) -> Aabb {
        match self {
            Self::Aabb(s) => s.local(),
            Self::Oobb(s) => s.local(),
            Self::Circle(s) => s.local_bounds(),
        }
    }

    /// `(min, max)` corners of [`Self::world_aabb`].
    #[must_use]
    pub fn bounding_box_min_max(&self) -> (Vec3, Vec3) {
        let b = self.world_aabb();
        (b.min(), b.max())
    }

    /// Last model transform applied.
    #[must_use]
    pub fn model_transform(&self) -> Transform {
        match self {
            Self::Aabb(s) => s.transform(),
            Self::Oobb(s) => s.transform(),
            Self::Circle(s) => s.transform(),
        }
    }

    /// Recomputes world state for `transform`.
    ///
    /// Returns `false` without touching anything when `transform` equals the
    /// last one applied.
    pub fn set_model_transform_and_update(&mut self, transform: &Transform) -> bool {
        if self.model_transform() == *transform {
            return false;
        }
        match self {
            Self::Aabb(s) => s.update(transform),
            Self::Oobb(s) => s.update(transform),
            Self::Circle(s) => s.update(transform),
        }
        true
    }

    /// World bound covering the motion from the current transform to `end`.
    ///
    /// Axis-aligned boxes ignore rotation, so their sweep does too.
    #[must_use]
    pub fn swept_aabb(&self, end: &Transform) -> Aabb {
        let start = self.model_transform();
        match self {
            Self::Aabb(_) => Sweep::new(start.without_rotation(), end.without_rotation())
                .fat_aabb(&self.local_aabb()),
            Self::Oobb(_) => Sweep::new(start, *end).fat_aabb(&self.local_aabb()),
            // Rotating a sphere does not move its surface; only the center travels.
            Self::Circle(c) => {
                let moved = end.transform_point(&c.local_center()).sub(&c.center());
                let world = c.world_bounds();
                world.union(&world.translated(&moved))
            }
        }
    }

    /// Smallest box enclosing both shapes' world bounds.
    #[must_use]
    pub fn merged_bounds(&self, other: &Self) -> Aabb {
        Aabb::merged(&self.world_aabb(), &other.world_aabb())
    }

    /// World bounds overlap test, inclusive on faces.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.world_aabb().overlaps(&other.world_aabb())
    }

    /// Surface area of the volume itself.
    #[must_use]
    pub fn surface_area(&self) -> f32 {
        match self {
            Self::Aabb(s) => s.world().surface_area(),
            Self::Oobb(s) => {
                let e = s.half_extents().scale(2.0);
                2.0 * (e.x() * e.y() + e.y() * e.z() + e.z() * e.x())
            }
            Self::Circle(s) => 4.0 * PI * s.radius() * s.radius(),
        }
    }

    /// View-frustum test: `false` when the shape is certainly outside.
    ///
    /// `world_to_frustum` carries the world bound into the space the frustum
    /// planes are expressed in (identity when both are world space).
    #[must_use]
    pub fn vfc_test(&self, frustum: &Frustum, world_to_frustum: &Mat4) -> bool {
        frustum.intersects_aabb(&self.world_aabb().transformed(world_to_frustum))
    }

    /// Passes when the shape's bounding sphere reaches into the shell
    /// `[near, far]` around `center`.
    #[must_use]
    pub fn distance_test(&self, center: &Vec3, near: f32, far: f32) -> bool {
        let d = self.center().distance(center);
        let r = self.radius();
        d >= near - r && d <= far + r
    }

    /// Emits the shape's wireframe to `draw`.
    pub fn render(&self, draw: &mut dyn DebugDraw) {
        match self {
            Self::Aabb(s) => draw.draw_aabb(&s.world(), DebugColor::AABB),
            Self::Oobb(s) => draw.draw_box(s.corners(), DebugColor::OOBB),
            Self::Circle(s) => draw.draw_sphere(s.center(), s.radius(), DebugColor::CIRCLE),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Quat;
    use crate::types::frustum::Plane;

    fn unit_box() -> Aabb {
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
    }

    #[test]
    fn vertex_constructors_pick_their_variant() {
        let pts = [Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 0.5)];
        assert_eq!(Shape::aabb_from_points(&pts).unwrap().shape_type(), ShapeType::Aabb);
        assert_eq!(Shape::oobb_from_points(&pts).unwrap().shape_type(), ShapeType::Oobb);
        assert_eq!(Shape::circle_from_points(&pts).unwrap().shape_type(), ShapeType::Circle);
        assert_eq!(Shape::circle_from_points(&[]), Err(GeomError::EmptyPointSet));
    }

    #[test]
    fn update_is_memoized_on_equal_transform() {
        let mut s = Shape::aabb(unit_box());
        let tf = Transform::from_translation(Vec3::new(2.0, 0.0, 0.0));
        assert!(s.set_model_transform_and_update(&tf));
        assert!(!s.set_model_transform_and_update(&tf));
        assert_eq!(s.center().to_array(), [2.0, 0.0, 0.0]);
    }

    #[test]
    fn aabb_ignores_rotation_but_applies_scale() {
        let mut s = Shape::aabb(unit_box());
        let tf = Transform::new(
            Vec3::ZERO,
            Quat::from_axis_angle(Vec3::UNIT_Z, 0.9),
            Vec3::new(2.0, 1.0, 1.0),
        );
        s.set_model_transform_and_update(&tf);
        let (min, max) = s.bounding_box_min_max();
        assert_eq!(min.to_array(), [-1.0, -0.5, -0.5]);
        assert_eq!(max.to_array(), [1.0, 0.5, 0.5]);
    }

    #[test]
    fn circle_radius_uses_largest_scale() {
        let mut s = Shape::circle(Vec3::ZERO, 1.0);
        s.set_model_transform_and_update(&Transform::new(
            Vec3::new(0.0, 5.0, 0.0),
            Quat::identity(),
            Vec3::new(1.0, -3.0, 2.0),
        ));
        assert!((s.radius() - 3.0).abs() < 1e-6);
        assert_eq!(s.center().to_array(), [0.0, 5.0, 0.0]);
        assert!((s.surface_area() - 36.0 * PI).abs() < 1e-3);
    }

    #[test]
    fn distance_test_accepts_shell_with_radius_slack() {
        let mut s = Shape::circle(Vec3::ZERO, 1.0);
        s.set_model_transform_and_update(&Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert!(s.distance_test(&Vec3::ZERO, 0.0, 9.5));
        assert!(!s.distance_test(&Vec3::ZERO, 0.0, 8.5));
        assert!(s.distance_test(&Vec3::ZERO, 10.5, 20.0));
        assert!(!s.distance_test(&Vec3::ZERO, 11.5, 20.0));
    }

    #[test]
    fn vfc_culls_shapes_behind_a_plane() {
        let planes = [
            Plane::new(Vec3::UNIT_X, 10.0),
            Plane::new(-Vec3::UNIT_X, 10.0),
            Plane::new(Vec3::UNIT_Y, 10.0),
            Plane::new(-Vec3::UNIT_Y, 10.0),
            Plane::new(Vec3::UNIT_Z, 10.0),
            Plane::new(-Vec3::UNIT_Z, 10.0),
        ];
        let f = Frustum::new(planes);
        let mut inside = Shape::oobb(unit_box());
        inside.set_model_transform_and_update(&Transform::from_translation(Vec3::new(9.0, 0.0, 0.0)));
        let mut outside = Shape::circle(Vec3::ZERO, 1.0);
        outside.set_model_transform_and_update(&Transform::from_translation(Vec3::new(0.0, 0.0, -12.0)));
        assert!(inside.vfc_test(&f, &Mat4::identity()));
        assert!(!outside.vfc_test(&f, &Mat4::identity()));
        // Shifting the frustum space brings the sphere back in.
        assert!(outside.vfc_test(&f, &Mat4::translation(0.0, 0.0, 5.0)));
    }

    #[test]
    fn merged_bounds_and_overlap() {
        let mut a = Shape::aabb(unit_box());
        let mut b = Shape::circle(Vec3::ZERO, 0.5);
        a.set_model_transform_and_update(&Transform::from_translation(Vec3::new(-1.0, 0.0, 0.0)));
        b.set_model_transform_and_update(&Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!a.overlaps(&b));
        let m = a.merged_bounds(&b);
        assert_eq!(m.min().x(), -1.5);
        assert_eq!(m.max().x(), 1.5);
    }

    #[test]
    fn aabb_swept_bound_covers_translation() {
        let s = Shape::aabb(unit_box());
        let swept = s.swept_aabb(&Transform::from_translation(Vec3::new(0.0, -3.0, 0.0)));
        assert_eq!(swept.min().y(), -3.5);
        assert_eq!(swept.max().y(), 0.5);
    }
}
