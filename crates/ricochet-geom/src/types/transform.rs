// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Mat4, Quat, Vec3};

/// Rigid transform with non-uniform scale used to place shapes in the world.
///
/// Conventions:
/// - `translation` in meters (world space).
/// - `rotation` as a unit quaternion (normalized internally when converting).
/// - `scale` is non-uniform and applied before rotation/translation.
///
/// `to_mat4` constructs `M = T * R * S`. Shapes compare transforms with
/// `PartialEq` to skip recomputing world bounds when nothing moved.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::identity(),
            scale: Vec3::ONE,
        }
    }

    /// Creates a transform from components.
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Pure translation.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity(), Vec3::ONE)
    }

    /// Translation component.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Scale component.
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Copy with a different translation.
    #[must_use]
    pub fn with_translation(&self, translation: Vec3) -> Self {
        Self {
            translation,
            ..*self
        }
    }

    /// Copy with the rotation reset to identity.
    #[must_use]
    pub fn without_rotation(&self) -> Self {
        Self {
            rotation: Quat::identity(),
            ..*self
        }
    }

    /// Returns the column-major `Mat4` corresponding to this transform.
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        let [sx, sy, sz] = self.scale.to_array();
        let [tx, ty, tz] = self.translation.to_array();
        Mat4::translation(tx, ty, tz)
            .multiply(&self.rotation.to_mat4())
            .multiply(&Mat4::scale(sx, sy, sz))
    }

    /// Applies scale, rotation, then translation to `point`.
    #[must_use]
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.rotation
            .rotate(&point.hadamard(&self.scale))
            .add(&self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_point_agrees_with_matrix() {
        let tf = Transform::new(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7),
            Vec3::new(2.0, 1.0, 0.5),
        );
        let p = Vec3::new(0.3, 0.4, -1.2);
        let direct = tf.transform_point(&p);
        let via_mat = tf.to_mat4().transform_point(&p);
        assert!(direct.approx_eq(&via_mat, 1e-5), "{direct:?} vs {via_mat:?}");
    }

    #[test]
    fn without_rotation_keeps_translation_and_scale() {
        let tf = Transform::new(
            Vec3::UNIT_X,
            Quat::from_axis_angle(Vec3::UNIT_Z, 1.0),
            Vec3::splat(3.0),
        );
        let flat = tf.without_rotation();
        assert_eq!(flat.translation(), Vec3::UNIT_X);
        assert_eq!(flat.scale(), Vec3::splat(3.0));
        assert_eq!(flat.rotation(), Quat::identity());
    }
}
