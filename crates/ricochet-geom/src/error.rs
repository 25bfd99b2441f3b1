// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

/// Errors produced by geometry construction and the broad-phase tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeomError {
    /// A bounding box was built with a `min` component above its `max`.
    #[error("invalid bounds: min {min:?} exceeds max {max:?}")]
    InvalidBounds {
        /// Requested minimum corner.
        min: [f32; 3],
        /// Requested maximum corner.
        max: [f32; 3],
    },
    /// A node index does not address a live slot in the tree arena.
    #[error("invalid tree node: {0}")]
    InvalidNode(u32),
    /// The tree arena cannot address a node at this index.
    #[error("tree arena full: node index {0} does not fit a node id")]
    ArenaFull(usize),
    /// The object key is not stored in the tree.
    #[error("object not present in tree")]
    UnknownObject,
    /// The object key is already stored in the tree.
    #[error("object already present in tree")]
    DuplicateObject,
    /// A bound was requested from an empty vertex set.
    #[error("cannot build a bound from zero points")]
    EmptyPointSet,
    /// Internal structure check failed.
    #[error("tree invariant violated: {0}")]
    Invariant(String),
}
