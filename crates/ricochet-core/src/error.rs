// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use ricochet_geom::GeomError;
use thiserror::Error;

use crate::body::EntityId;
use crate::store::BodyHandle;

/// Errors raised by bodies and the scene.
///
/// These describe caller mistakes or broken internal invariants; a failed
/// [`Scene::step`](crate::Scene::step) leaves the frame unfinished and should
/// not be retried blindly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// A body already owns a shape; shapes are assigned once.
    #[error("rigid body already has a shape")]
    ShapeAlreadyAssigned,
    /// A colliding body was added to a scene without a shape.
    #[error("rigid body of entity {0} has no shape")]
    MissingShape(EntityId),
    /// The handle is stale or was never issued by this scene.
    #[error("unknown rigid body {0:?}")]
    UnknownBody(BodyHandle),
    /// Step length was negative or not finite.
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f32),
    /// The scene owning the command inbox was dropped.
    #[error("scene command inbox is closed")]
    InboxClosed,
    /// Geometry or broad-phase failure.
    #[error(transparent)]
    Geom(#[from] GeomError),
}
