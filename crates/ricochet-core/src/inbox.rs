// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cross-thread command submission for a [`Scene`](crate::Scene).
//!
//! Other threads never touch the scene directly. They hold a
//! [`CommandSender`] and enqueue [`SceneCommand`]s; the scene drains its inbox
//! at the start of every step, in submission order.

use std::sync::mpsc::{channel, Receiver, Sender};

use ricochet_geom::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;
use crate::store::BodyHandle;

/// A deferred mutation applied at the start of the next step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneCommand {
    /// [`RigidBody::apply_linear_force`](crate::RigidBody::apply_linear_force).
    ApplyForce {
        /// Target body.
        body: BodyHandle,
        /// Force (N).
        force: Vec3,
    },
    /// [`RigidBody::apply_force_at_world_point`](crate::RigidBody::apply_force_at_world_point).
    ApplyForceAtPoint {
        /// Target body.
        body: BodyHandle,
        /// Force (N).
        force: Vec3,
        /// World point of application.
        point: Vec3,
    },
    /// [`RigidBody::apply_torque`](crate::RigidBody::apply_torque).
    ApplyTorque {
        /// Target body.
        body: BodyHandle,
        /// Torque (N·m).
        torque: Vec3,
    },
    /// [`RigidBody::apply_linear_impulse`](crate::RigidBody::apply_linear_impulse).
    ApplyImpulse {
        /// Target body.
        body: BodyHandle,
        /// Impulse (N·s).
        impulse: Vec3,
    },
    /// [`RigidBody::apply_linear_impulse_at_world_point`](crate::RigidBody::apply_linear_impulse_at_world_point).
    ApplyImpulseAtPoint {
        /// Target body.
        body: BodyHandle,
        /// Impulse (N·s).
        impulse: Vec3,
        /// World point of application.
        point: Vec3,
    },
    /// Overwrites a body's linear velocity.
    SetLinearVelocity {
        /// Target body.
        body: BodyHandle,
        /// New velocity (m/s).
        velocity: Vec3,
    },
    /// Teleports a body.
    SetPosition {
        /// Target body.
        body: BodyHandle,
        /// New world position.
        position: Vec3,
    },
    /// Changes scene gravity.
    SetGravity(Vec3),
    /// Toggles friction impulses.
    EnableFriction(bool),
    /// Toggles sleeping.
    EnableSleep(bool),
    /// Toggles stepping altogether.
    EnableUpdate(bool),
    /// Removes one body.
    RemoveBody(BodyHandle),
    /// Removes every body.
    RemoveAllBodies,
}

/// Cloneable, `Send` handle for enqueueing commands.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<SceneCommand>,
}

impl CommandSender {
    /// Enqueues `command` for the next step.
    ///
    /// # Errors
    /// [`PhysicsError::InboxClosed`] once the scene has been dropped.
    pub fn send(&self, command: SceneCommand) -> Result<(), PhysicsError> {
        self.tx.send(command).map_err(|_| PhysicsError::InboxClosed)
    }
}

/// Receiving end owned by the scene.
#[derive(Debug)]
pub(crate) struct CommandInbox {
    tx: Sender<SceneCommand>,
    rx: Receiver<SceneCommand>,
}

impl CommandInbox {
    pub(crate) fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    pub(crate) fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Everything queued so far, oldest first.
    pub(crate) fn drain(&self) -> Vec<SceneCommand> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_submission_order_across_threads() {
        let inbox = CommandInbox::new();
        let sender = inbox.sender();
        std::thread::spawn(move || {
            sender.send(SceneCommand::EnableSleep(true)).unwrap();
            sender.send(SceneCommand::SetGravity(Vec3::ZERO)).unwrap();
        })
        .join()
        .unwrap();
        assert_eq!(
            inbox.drain(),
            vec![SceneCommand::EnableSleep(true), SceneCommand::SetGravity(Vec3::ZERO)]
        );
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn sending_after_drop_fails() {
        let inbox = CommandInbox::new();
        let sender = inbox.sender();
        drop(inbox);
        assert_eq!(
            sender.send(SceneCommand::RemoveAllBodies),
            Err(PhysicsError::InboxClosed)
        );
    }
}
