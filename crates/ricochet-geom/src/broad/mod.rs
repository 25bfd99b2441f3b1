// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase structures.
//!
//! Overlap is inclusive on faces: touching boxes are reported by queries.

/// Incremental bounding-volume tree with fattened leaves.
pub mod dynamic_tree;
/// Top-down sphere hierarchy used to split a scene into islands.
pub mod sphere_bvh;

pub use dynamic_tree::{DynamicAabbTree, NodeId, TreeNode};
pub use sphere_bvh::{BvhLeaf, SphereBvh};
