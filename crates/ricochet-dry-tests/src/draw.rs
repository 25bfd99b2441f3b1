// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Debug-draw sink that records instead of rendering.

use ricochet_geom::math::Vec3;
use ricochet_geom::{Aabb, DebugColor, DebugDraw};

/// One recorded debug primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// [`DebugDraw::draw_aabb`].
    Aabb(Aabb, DebugColor),
    /// [`DebugDraw::draw_box`].
    Box([Vec3; 8], DebugColor),
    /// [`DebugDraw::draw_sphere`].
    Sphere(Vec3, f32, DebugColor),
}

/// [`DebugDraw`] implementation that keeps every call in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingDebugDraw {
    calls: Vec<DrawCall>,
}

impl RecordingDebugDraw {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Counts of (boxes, oriented boxes, spheres).
    pub fn tally(&self) -> (usize, usize, usize) {
        self.calls.iter().fold((0, 0, 0), |(a, o, s), call| match call {
            DrawCall::Aabb(..) => (a + 1, o, s),
            DrawCall::Box(..) => (a, o + 1, s),
            DrawCall::Sphere(..) => (a, o, s + 1),
        })
    }
}

impl DebugDraw for RecordingDebugDraw {
    fn draw_aabb(&mut self, aabb: &Aabb, color: DebugColor) {
        self.calls.push(DrawCall::Aabb(*aabb, color));
    }

    fn draw_box(&mut self, corners: &[Vec3; 8], color: DebugColor) {
        self.calls.push(DrawCall::Box(*corners, color));
    }

    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: DebugColor) {
        self.calls.push(DrawCall::Sphere(center, radius, color));
    }
}
