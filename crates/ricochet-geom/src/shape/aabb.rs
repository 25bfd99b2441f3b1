// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::error::GeomError;
use crate::math::Vec3;
use crate::types::{aabb::Aabb, transform::Transform};

/// Axis-aligned box collider.
///
/// The world box follows translation and scale of the model transform;
/// rotation is ignored so the box stays axis aligned.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AabbShape {
    local: Aabb,
    world: Aabb,
    transform: Transform,
}

impl AabbShape {
    /// Creates the collider from an object-space box.
    #[must_use]
    pub fn new(local: Aabb) -> Self {
        Self {
            local,
            world: local,
            transform: Transform::identity(),
        }
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

    /// World-space box.
    #[must_use]
    pub fn world(&self) -> Aabb {
        self.world
    }

    /// Last model transform applied.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Radius of the sphere through the world box corners.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.world.half_extents().length()
    }

    pub(crate) fn update(&mut self, transform: &Transform) {
        let scale = transform.scale();
        let t = transform.translation();
        self.world = Aabb::from_corners(
            self.local.min().hadamard(&scale),
            self.local.max().hadamard(&scale),
        )
        .translated(&t);
        self.transform = *transform;
    }
}
