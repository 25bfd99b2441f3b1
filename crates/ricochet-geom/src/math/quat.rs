// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::{Mat4, Vec3, EPSILON};

/// Quaternion stored as `(x, y, z, w)`.
///
/// * All angles are expressed in radians.
/// * Rotation helpers normalise internally so slightly drifted quaternions
///   still produce proper rotations.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    data: [f32; 4],
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quat {
    /// Creates a quaternion from components.
    ///
    /// Callers should provide finite components; use
    /// [`Quat::from_axis_angle`] for axis/angle construction.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// Returns the quaternion as an array.
    pub fn to_array(self) -> [f32; 4] {
        self.data
    }

    fn component(&self, idx: usize) -> f32 {
        self.data[idx]
    }

    /// Constructs a quaternion from a rotation axis and angle in radians.
    ///
    /// Returns the identity quaternion when the axis length is ≤ `EPSILON`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len_sq = axis.length_squared();
        if len_sq <= EPSILON * EPSILON {
            return Self::identity();
        }
        let len = len_sq.sqrt();
        let norm_axis = axis.scale(1.0 / len);
        let half = angle * 0.5;
        let (sin_half, cos_half) = half.sin_cos();
        let scaled = norm_axis.scale(sin_half);
        Self::new(
            scaled.component(0),
            scaled.component(1),
            scaled.component(2),
            cos_half,
        )
    }

    /// Hamilton product of two quaternions (`self * other`).
    ///
    /// Operand order matters: the result applies `other` first, then `self`.
    ///
    /// # Examples
    /// ```
    /// use core::f32::consts::FRAC_PI_2;
    /// use ricochet_geom::math::{Quat, Vec3};
    /// let yaw = Quat::from_axis_angle(Vec3::UNIT_Y, FRAC_PI_2);
    /// let pitch = Quat::from_axis_angle(Vec3::UNIT_X, FRAC_PI_2);
    /// assert_ne!(yaw.multiply(&pitch).to_array(), pitch.multiply(&yaw).to_array());
    /// ```
    pub fn multiply(&self, other: &Self) -> Self {
        let ax = self.component(0);
        let ay = self.component(1);
        let az = self.component(2);
        let aw = self.component(3);

        let bx = other.component(0);
        let by = other.component(1);
        let bz = other.component(2);
        let bw = other.component(3);

        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Normalises the quaternion; returns identity when norm is ~0.
    pub fn normalize(&self) -> Self {
        let len = (self.component(0) * self.component(0)
            + self.component(1) * self.component(1)
            + self.component(2) * self.component(2)
            + self.component(3) * self.component(3))
        .sqrt();
        if len <= EPSILON {
            return Self::identity();
        }
        let inv = 1.0 / len;
        Self::new(
            self.component(0) * inv,
            self.component(1) * inv,
            self.component(2) * inv,
            self.component(3) * inv,
        )
    }

    /// Conjugate (inverse rotation for unit quaternions).
    pub fn conjugate(&self) -> Self {
        Self::new(
            -self.component(0),
            -self.component(1),
            -self.component(2),
            self.component(3),
        )
    }

    /// Returns the identity quaternion.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotates a vector by this quaternion.
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        let q = self.normalize();
        let u = Vec3::new(q.component(0), q.component(1), q.component(2));
        let w = q.component(3);
        // v' = v + 2w(u × v) + 2u × (u × v)
        let uv = u.cross(v);
        let uuv = u.cross(&uv);
        v.add(&uv.scale(2.0 * w)).add(&uuv.scale(2.0))
    }

    /// Advances the orientation by angular velocity `omega` (rad/s) over `dt`.
    ///
    /// Uses the first-order quaternion derivative `q' = ½ ω q` followed by
    /// renormalisation.
    pub fn integrate(&self, omega: &Vec3, dt: f32) -> Self {
        let spin = Self::new(omega.x(), omega.y(), omega.z(), 0.0).multiply(self);
        let half_dt = 0.5 * dt;
        Self::new(
            self.component(0) + spin.component(0) * half_dt,
            self.component(1) + spin.component(1) * half_dt,
            self.component(2) + spin.component(2) * half_dt,
            self.component(3) + spin.component(3) * half_dt,
        )
        .normalize()
    }

    /// Converts the quaternion to a rotation matrix (column-major 4×4).
    pub fn to_mat4(&self) -> Mat4 {
        let q = self.normalize();
        let x = q.component(0);
        let y = q.component(1);
        let z = q.component(2);
        let w = q.component(3);

        let xx = x * x;
        let yy = y * y;
        let zz = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Mat4::new([
            1.0 - 2.0 * (yy + zz),
            2.0 * (xy + wz),
            2.0 * (xz - wy),
            0.0,
            2.0 * (xy - wz),
            1.0 - 2.0 * (xx + zz),
            2.0 * (yz + wx),
            0.0,
            2.0 * (xz + wy),
            2.0 * (yz - wx),
            1.0 - 2.0 * (xx + yy),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }
}

/// Converts a 4‑element `[f32; 4]` array `(x, y, z, w)` into a `Quat`.
impl From<[f32; 4]> for Quat {
    fn from(value: [f32; 4]) -> Self {
        Self { data: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn rotate_matches_matrix_direction_transform() {
        let q = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2);
        let v = Vec3::new(1.0, 2.0, 3.0);
        let a = q.rotate(&v);
        let b = q.to_mat4().transform_direction(&v);
        assert!(a.approx_eq(&b, 1e-5), "{a:?} vs {b:?}");
        assert!(a.approx_eq(&Vec3::new(-2.0, 1.0, 3.0), 1e-5));
    }

    #[test]
    fn integrate_with_zero_spin_is_identity() {
        let q = Quat::from_axis_angle(Vec3::UNIT_Y, 0.3);
        let out = q.integrate(&Vec3::ZERO, 0.016);
        for (a, b) in out.to_array().iter().zip(q.to_array().iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn integrate_small_spin_turns_about_axis() {
        let q = Quat::identity().integrate(&Vec3::new(0.0, 0.0, 1.0), 0.01);
        let v = q.rotate(&Vec3::UNIT_X);
        assert!(v.y() > 0.0);
        assert!((v.length() - 1.0).abs() < 1e-5);
    }
}
