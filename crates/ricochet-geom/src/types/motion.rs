// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::{Quat, Vec3};
use crate::types::{aabb::Aabb, transform::Transform};

/// Placement of a collider at the start and end of one simulation step.
///
/// The broad phase stores the union of both poses so a fast body finds the
/// neighbours it may hit before the narrow phase sweeps it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sweep {
    start: Transform,
    end: Transform,
}

impl Sweep {
    /// Creates a sweep between two transforms.
    #[must_use]
    pub const fn new(start: Transform, end: Transform) -> Self {
        Self { start, end }
    }

    /// Sweep of a body moving with constant `velocity` for `dt` seconds.
    #[must_use]
    pub fn linear(start: Transform, velocity: &Vec3, dt: f32) -> Self {
        let end = start.with_translation(start.translation().add(&velocity.scale(dt)));
        Self { start, end }
    }

    /// Transform at the beginning of the step.
    #[must_use]
    pub const fn start(&self) -> Transform {
        self.start
    }

    /// Transform at the end of the step.
    #[must_use]
    pub const fn end(&self) -> Transform {
        self.end
    }

    /// Conservative world bound for a collider with object-space `local` bound.
    ///
    /// Unions the poses at `t = 0`, `t = 0.5` and `t = 1`. The midpoint sample
    /// catches corners that bulge out mid-rotation about an off-centre pivot.
    #[must_use]
    pub fn fat_aabb(&self, local: &Aabb) -> Aabb {
        let a0 = local.transformed(&self.start.to_mat4());
        let a1 = local.transformed(&self.end.to_mat4());
        let am = local.transformed(&self.midpoint().to_mat4());
        a0.union(&a1).union(&am)
    }

    fn midpoint(&self) -> Transform {
        let tm = self
            .start
            .translation()
            .add(&self.end.translation())
            .scale(0.5);
        let sm = self.start.scale().add(&self.end.scale()).scale(0.5);
        let q0 = self.start.rotation().to_array();
        let q1 = self.end.rotation().to_array();
        let qm = Quat::new(
            0.5 * (q0[0] + q1[0]),
            0.5 * (q0[1] + q1[1]),
            0.5 * (q0[2] + q1[2]),
            0.5 * (q0[3] + q1[3]),
        )
        .normalize();
        Transform::new(tm, qm, sm)
    }
}
