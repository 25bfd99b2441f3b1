// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow phase: pairwise shape tests and their dispatch tables.
//!
//! Every test reports the contact normal pointing from the first shape
//! toward the second. Touching shapes, and touching shapes that move apart,
//! are not contacts.

mod aabb;
mod circle;
mod oobb;

pub use aabb::{dynamic_aabb_vs_aabb, static_aabb_vs_aabb};
pub use circle::{
    dynamic_aabb_vs_circle, dynamic_circle_vs_aabb, dynamic_circle_vs_circle,
    static_aabb_vs_circle, static_circle_vs_aabb, static_circle_vs_circle,
};
pub use oobb::{
    dynamic_aabb_vs_oobb, dynamic_circle_vs_oobb, dynamic_oobb_vs_aabb, dynamic_oobb_vs_circle,
    dynamic_oobb_vs_oobb, static_aabb_vs_oobb, static_circle_vs_oobb, static_oobb_vs_aabb,
    static_oobb_vs_circle, static_oobb_vs_oobb,
};

use ricochet_geom::math::Vec3;
use ricochet_geom::{CircleShape, OobbShape, Shape, ShapeType};
use serde::{Deserialize, Serialize};

/// Whether a contact was found already overlapping or by sweeping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    /// Shapes overlap at the start of the window.
    Static,
    /// Shapes first touch at [`Contact::time`] inside the window.
    Swept,
}

/// Raw narrow-phase result, before body and material data is attached.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Unit normal from the first shape toward the second.
    pub normal: Vec3,
    /// Overlap depth along `normal`; zero for swept contacts.
    pub penetration: f32,
    /// Seconds into the window at which the shapes touch; zero for static contacts.
    pub time: f32,
    /// How the contact was found.
    pub kind: ContactKind,
}

impl Contact {
    /// An overlap of `penetration` along `normal`.
    #[must_use]
    pub fn overlap(normal: Vec3, penetration: f32) -> Self {
        Self {
            normal,
            penetration,
            time: 0.0,
            kind: ContactKind::Static,
        }
    }

    /// A first touch at `time` with `normal`.
    #[must_use]
    pub fn swept(normal: Vec3, time: f32) -> Self {
        Self {
            normal,
            penetration: 0.0,
            time,
            kind: ContactKind::Swept,
        }
    }

    /// The same contact seen from the other shape.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }

    /// `true` for static contacts.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.kind == ContactKind::Static
    }
}

/// Overlap test between two shapes at rest.
pub type StaticTestFn = fn(&Shape, &Shape) -> Option<Contact>;

/// Swept test: shapes `a` and `b` moving with velocities `va` and `vb` for
/// up to `window` seconds.
pub type DynamicTestFn = fn(&Shape, Vec3, &Shape, Vec3, f32) -> Option<Contact>;

const N: usize = ShapeType::COUNT;

/// Static tests indexed `[type(a)][type(b)]` (order: AABB, OOBB, Circle).
pub const STATIC_TESTS: [[StaticTestFn; N]; N] = [
    [static_aabb_vs_aabb, static_aabb_vs_oobb, static_aabb_vs_circle],
    [static_oobb_vs_aabb, static_oobb_vs_oobb, static_oobb_vs_circle],
    [static_circle_vs_aabb, static_circle_vs_oobb, static_circle_vs_circle],
];

/// Swept tests indexed `[type(a)][type(b)]` (order: AABB, OOBB, Circle).
pub const DYNAMIC_TESTS: [[DynamicTestFn; N]; N] = [
    [dynamic_aabb_vs_aabb, dynamic_aabb_vs_oobb, dynamic_aabb_vs_circle],
    [dynamic_oobb_vs_aabb, dynamic_oobb_vs_oobb, dynamic_oobb_vs_circle],
    [dynamic_circle_vs_aabb, dynamic_circle_vs_oobb, dynamic_circle_vs_circle],
];

/// Narrow-phase service handed to a [`Scene`](crate::Scene).
///
/// Starts from [`STATIC_TESTS`] and [`DYNAMIC_TESTS`]; individual entries
/// may be replaced before the manager is injected.
#[derive(Debug, Clone)]
pub struct CollisionsManager {
    static_tests: [[StaticTestFn; N]; N],
    dynamic_tests: [[DynamicTestFn; N]; N],
}

impl Default for CollisionsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionsManager {
    /// Manager with the built-in tables.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            static_tests: STATIC_TESTS,
            dynamic_tests: DYNAMIC_TESTS,
        }
    }

    /// Built-in static test for a pair of shape kinds.
    #[must_use]
    pub const fn static_test_fn(a: ShapeType, b: ShapeType) -> StaticTestFn {
        STATIC_TESTS[a.index()][b.index()]
    }

    /// Built-in swept test for a pair of shape kinds.
    #[must_use]
    pub const fn dynamic_test_fn(a: ShapeType, b: ShapeType) -> DynamicTestFn {
        DYNAMIC_TESTS[a.index()][b.index()]
    }

    /// Replaces the static test for `(a, b)`.
    #[must_use]
    pub fn with_static_test(mut self, a: ShapeType, b: ShapeType, test: StaticTestFn) -> Self {
        self.static_tests[a.index()][b.index()] = test;
        self
    }

    /// Replaces the swept test for `(a, b)`.
    #[must_use]
    pub fn with_dynamic_test(mut self, a: ShapeType, b: ShapeType, test: DynamicTestFn) -> Self {
        self.dynamic_tests[a.index()][b.index()] = test;
        self
    }

    /// Overlap test for shapes at rest.
    #[must_use]
    pub fn static_test(&self, a: &Shape, b: &Shape) -> Option<Contact> {
        self.static_tests[a.shape_type().index()][b.shape_type().index()](a, b)
    }

    /// Swept test over `window` seconds.
    #[must_use]
    pub fn dynamic_test(
        &self,
        a: &Shape,
        va: Vec3,
        b: &Shape,
        vb: Vec3,
        window: f32,
    ) -> Option<Contact> {
        self.dynamic_tests[a.shape_type().index()][b.shape_type().index()](a, va, b, vb, window)
    }
}

/// Index of the smallest value; ties keep the lowest index.
fn min_axis(values: [f32; 3]) -> usize {
    let mut best = 0;
    for i in 1..3 {
        if values[i] < values[best] {
            best = i;
        }
    }
    best
}

fn circle_of(shape: &Shape) -> Option<&CircleShape> {
    match shape {
        Shape::Circle(c) => Some(c),
        Shape::Aabb(_) | Shape::Oobb(_) => None,
    }
}

/// Box view of a box-like shape; an axis-aligned box becomes an identity-axis
/// oriented box over its world bounds.
fn box_of(shape: &Shape) -> Option<OobbShape> {
    match shape {
        Shape::Aabb(a) => Some(OobbShape::new(a.world())),
        Shape::Oobb(o) => Some(*o),
        Shape::Circle(_) => None,
    }
}
