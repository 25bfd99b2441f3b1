// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generational arena that owns every [`RigidBody`] of a scene.

use serde::{Deserialize, Serialize};

use crate::body::RigidBody;
use crate::error::PhysicsError;

/// Stable reference to a body owned by a [`Scene`](crate::Scene).
///
/// A handle stays valid until its body is removed; a recycled slot gets a new
/// generation so old handles are rejected instead of aliasing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    /// Slot index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation.
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

/// Slot storage for bodies.
#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl BodyStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when no body is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `body` and returns its handle.
    pub fn insert(&mut self, body: RigidBody) -> BodyHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle {
            index,
            generation: 0,
        }
    }

    /// Removes and returns the body behind `handle`.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] for stale or foreign handles.
    pub fn remove(&mut self, handle: BodyHandle) -> Result<RigidBody, PhysicsError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        let body = slot.body.take().ok_or(PhysicsError::UnknownBody(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Ok(body)
    }

    /// Drops every body; all outstanding handles become stale.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.body.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(u32::try_from(index).unwrap_or(u32::MAX));
            }
        }
        self.len = 0;
    }

    /// `true` if `handle` refers to a live body.
    #[must_use]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_ok()
    }

    /// Borrows the body behind `handle`.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] for stale or foreign handles.
    pub fn get(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_ref())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Mutably borrows the body behind `handle`.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] for stale or foreign handles.
    pub fn get_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_mut())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Mutably borrows two distinct bodies at once.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] if either handle is stale, or `b` when
    /// both handles name the same slot.
    pub fn get_pair_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Result<(&mut RigidBody, &mut RigidBody), PhysicsError> {
        let (ia, ib) = (a.index as usize, b.index as usize);
        if ia == ib || ia >= self.slots.len() || ib >= self.slots.len() {
            let missing = if ia >= self.slots.len() { a } else { b };
            return Err(PhysicsError::UnknownBody(missing));
        }
        let (lo, hi) = self.slots.split_at_mut(ia.max(ib));
        let (first, second) = if ia < ib {
            (&mut lo[ia], &mut hi[0])
        } else {
            (&mut hi[0], &mut lo[ib])
        };
        let body_a = Some(first)
            .filter(|s| s.generation == a.generation)
            .and_then(|s| s.body.as_mut())
            .ok_or(PhysicsError::UnknownBody(a))?;
        let body_b = Some(second)
            .filter(|s| s.generation == b.generation)
            .and_then(|s| s.body.as_mut())
            .ok_or(PhysicsError::UnknownBody(b))?;
        Ok((body_a, body_b))
    }

    /// Live bodies with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    /// Live bodies with their handles, mutably, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut RigidBody)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.body.as_mut().map(|body| {
                (
                    BodyHandle {
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                        generation,
                    },
                    body,
                )
            })
        })
    }

    /// Handles of all live bodies, in slot order.
    #[must_use]
    pub fn handles(&self) -> Vec<BodyHandle> {
        self.iter().map(|(h, _)| h).collect()
    }
}
