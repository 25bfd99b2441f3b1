// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Foundational geometric types.

/// Axis-aligned bounding boxes.
pub mod aabb;
/// Planes and view frusta for visibility culling.
pub mod frustum;
/// Start/end poses used to bound motion over one step.
pub mod motion;
/// Rigid transforms with non-uniform scale.
pub mod transform;
