// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Float32 math helpers: vectors, quaternions, and column-major matrices.
//!
//! Everything rounds to `f32`. Degenerate inputs (zero-length axes, zero
//! vectors) collapse to well-defined values instead of producing NaNs so the
//! simulation loop keeps running when a single pair's math degenerates.

use std::f32::consts::TAU;

mod mat4;
mod quat;
mod vec3;

pub use mat4::Mat4;
pub use quat::Quat;
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Clamps `value` to the inclusive `[min, max]` range.
///
/// An inverted range collapses to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if min > max {
        return min;
    }
    value.max(min).min(max)
}

/// Converts degrees to radians with float32 precision.
pub fn deg_to_rad(value: f32) -> f32 {
    value * (TAU / 360.0)
}

/// Converts radians to degrees with float32 precision.
pub fn rad_to_deg(value: f32) -> f32 {
    value * (360.0 / TAU)
}

/// Returns `true` when `a` and `b` differ by at most `tolerance`.
pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_inverted_range() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.5, 2.0, 1.0), 2.0);
    }

    #[test]
    fn degree_radian_round_trip() {
        let r = deg_to_rad(90.0);
        assert!(approx_eq(r, core::f32::consts::FRAC_PI_2, 1e-6));
        assert!(approx_eq(rad_to_deg(r), 90.0, 1e-4));
    }
}
