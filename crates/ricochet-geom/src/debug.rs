// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port trait for debug rendering of collision volumes.
//!
//! Shapes describe themselves through [`DebugDraw`] so geometry code never
//! depends on a concrete renderer.

use crate::math::Vec3;
use crate::types::aabb::Aabb;

/// Linear RGBA color used by debug overlays.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DebugColor(pub [f32; 4]);

impl DebugColor {
    /// Color for axis-aligned boxes.
    pub const AABB: Self = Self([0.1, 0.9, 0.2, 1.0]);
    /// Color for oriented boxes.
    pub const OOBB: Self = Self([0.2, 0.5, 1.0, 1.0]);
    /// Color for bounding spheres.
    pub const CIRCLE: Self = Self([1.0, 0.8, 0.1, 1.0]);
}

/// Minimal line-drawing port; implementations are best-effort.
pub trait DebugDraw {
    /// Draws a wireframe axis-aligned box.
    fn draw_aabb(&mut self, aabb: &Aabb, color: DebugColor);
    /// Draws a wireframe box through eight corners (same order as [`Aabb::corners`]).
    fn draw_box(&mut self, corners: &[Vec3; 8], color: DebugColor);
    /// Draws a wireframe sphere.
    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: DebugColor);
}
