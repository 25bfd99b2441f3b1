// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Rigid-body simulation core for Ricochet.

This crate provides:
- `RigidBody`: pose, velocity, forces, material and a single collision shape.
- `CollisionsManager`: static and swept pair tests behind constant dispatch
  tables, injected into the scene rather than reached through a global.
- `Manifold` contacts and an iterative impulse resolver.
- `Scene`: owns every body and runs the fixed step (broad phase, narrow
  phase, resolution, integration, overlap correction, events).
- `config`: storage port and JSON service for `PhysicsSettings`.

Design notes:
- Single writer: every mutating `Scene` method takes `&mut self`; other
  threads enqueue `SceneCommand`s through a `CommandSender`.
- Bodies are addressed by generational `BodyHandle`s; stale handles are
  rejected with `PhysicsError::UnknownBody`.
- Deterministic: islands, pairs and events are produced in handle order.
"]

mod body;
pub mod collision;
pub mod config;
mod error;
mod events;
mod inbox;
mod manifold;
mod scene;
mod settings;
pub mod solver;
mod store;

pub use body::{BodyType, EntityId, EntityType, RigidBody};
pub use collision::{CollisionsManager, Contact, ContactKind};
pub use error::PhysicsError;
pub use events::CollisionEvent;
pub use inbox::{CommandSender, SceneCommand};
pub use manifold::Manifold;
pub use scene::Scene;
pub use settings::{PhysicsSettings, SETTINGS_KEY};
pub use store::{BodyHandle, BodyStore};
