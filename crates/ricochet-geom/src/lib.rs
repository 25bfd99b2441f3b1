// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for Ricochet.

This crate provides:
- Float32 math (`Vec3`, `Quat`, `Mat4`) and rigid transforms (`Transform`).
- Axis-aligned bounding boxes (`Aabb`), planes and view frusta.
- Collision volumes (`Shape`: axis-aligned box, oriented box, sphere).
- Broad-phase structures: an incremental `DynamicAabbTree` and a per-step
  `SphereBvh` used to split the world into islands.
- A `DebugDraw` port so shapes can describe themselves to any renderer.

Design notes:
- Deterministic: no ambient RNG; tree rebuilds visit objects in key order.
- Fallible constructors return `GeomError` instead of panicking.
- Enable the `serde` feature to serialize math and shape value types.
"]

/// Broad-phase trees.
pub mod broad;
/// Debug-draw port.
pub mod debug;
mod error;
/// Vectors, quaternions, matrices and scalar helpers.
pub mod math;
/// Collision volumes.
pub mod shape;
/// Foundational geometric types.
pub mod types;

pub use broad::{DynamicAabbTree, NodeId, SphereBvh};
pub use debug::{DebugColor, DebugDraw};
pub use error::GeomError;
pub use shape::{AabbShape, CircleShape, OobbShape, Shape, ShapeType};
pub use types::aabb::Aabb;
pub use types::frustum::{Frustum, Plane};
pub use types::motion::Sweep;
pub use types::transform::Transform;
