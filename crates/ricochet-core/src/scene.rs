// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The simulation world and its fixed step.

use ricochet_geom::math::Vec3;
use ricochet_geom::{Aabb, DebugDraw, DynamicAabbTree, SphereBvh};
use rustc_hash::FxHashMap;
use tracing::{debug, error, instrument, warn};

use crate::body::{BodyType, RigidBody};
use crate::collision::CollisionsManager;
use crate::error::PhysicsError;
use crate::events::{collect_events, CollisionEvent};
use crate::inbox::{CommandInbox, CommandSender, SceneCommand};
use crate::manifold::Manifold;
use crate::settings::PhysicsSettings;
use crate::solver::resolve_collision;
use crate::store::{BodyHandle, BodyStore};

/// A broad-phase bucket plus the neighbours it must be tested against.
///
/// `guests` are bodies from later buckets whose broad-phase box reaches into
/// this bucket's bounds. Pairs are only formed member/member and
/// member/guest, so a pair straddling two buckets is tested exactly once.
#[derive(Debug, Clone, Default)]
struct Island {
    members: Vec<BodyHandle>,
    guests: Vec<BodyHandle>,
}

impl Island {
    fn pairs(&self) -> impl Iterator<Item = (BodyHandle, BodyHandle)> + '_ {
        let inner = self.members.iter().enumerate().flat_map(move |(i, &a)| {
            self.members[i + 1..].iter().map(move |&b| (a, b))
        });
        let outer = self
            .members
            .iter()
            .flat_map(move |&a| self.guests.iter().map(move |&b| (a, b)));
        inner.chain(outer)
    }
}

/// Owns every body and advances them in discrete steps.
///
/// Mutation is single-writer: every mutating method takes `&mut self`. Other
/// threads submit work through [`Scene::command_sender`].
#[derive(Debug)]
pub struct Scene {
    bodies: BodyStore,
    tree: DynamicAabbTree<BodyHandle>,
    islands: SphereBvh<BodyHandle>,
    collisions: CollisionsManager,
    settings: PhysicsSettings,
    inbox: CommandInbox,
    events: Vec<CollisionEvent>,
    steps: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(PhysicsSettings::default(), CollisionsManager::new())
    }
}

impl Scene {
    /// Empty scene using `settings` and the given narrow-phase service.
    #[must_use]
    pub fn new(settings: PhysicsSettings, collisions: CollisionsManager) -> Self {
        Self {
            bodies: BodyStore::new(),
            tree: DynamicAabbTree::with_skin_ratio(settings.skin_ratio),
            islands: SphereBvh::new(settings.island_leaf_capacity),
            collisions,
            settings,
            inbox: CommandInbox::new(),
            events: Vec::new(),
            steps: 0,
        }
    }

    // ── bodies ──────────────────────────────────────────────────────────

    /// Takes ownership of `body` and returns its handle.
    ///
    /// # Errors
    /// [`PhysicsError::MissingShape`] when a body that takes part in
    /// collisions has no shape. [`BodyType::NoCollision`] bodies may be
    /// shapeless.
    pub fn create_rigid_body(&mut self, body: RigidBody) -> Result<BodyHandle, PhysicsError> {
        if body.body_type() != BodyType::NoCollision && body.shape().is_none() {
            return Err(PhysicsError::MissingShape(body.entity()));
        }
        let bounds = body.world_aabb().filter(|_| body.is_collidable());
        let handle = self.bodies.insert(body);
        if let Some(bounds) = bounds {
            if let Err(err) = self.tree.insert_object(handle, bounds) {
                self.bodies.remove(handle)?;
                return Err(err.into());
            }
        }
        Ok(handle)
    }

    /// Removes a body and returns it.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] for stale handles.
    pub fn remove_rigid_body(&mut self, handle: BodyHandle) -> Result<RigidBody, PhysicsError> {
        let body = self.bodies.remove(handle)?;
        if self.tree.contains(&handle) {
            self.tree.remove_object(&handle)?;
        }
        Ok(body)
    }

    /// Removes every body.
    pub fn remove_all_bodies(&mut self) {
        self.bodies.clear();
        self.tree.clear();
    }

    /// Shared access to a body.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] for stale handles.
    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.bodies.get(handle)
    }

    /// Exclusive access to a body.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] for stale handles.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies.get_mut(handle)
    }

    /// Every live body in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // ── settings ────────────────────────────────────────────────────────

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    /// Narrow-phase service in use.
    #[must_use]
    pub fn collisions(&self) -> &CollisionsManager {
        &self.collisions
    }

    /// Changes gravity and wakes sleeping bodies so they feel it.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.settings.gravity = gravity.to_array();
        for (_, body) in self.bodies.iter_mut() {
            body.wake();
        }
    }

    /// Scene gravity.
    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        self.settings.gravity()
    }

    /// Toggles friction impulses.
    pub fn enable_friction(&mut self, enabled: bool) {
        self.settings.enable_friction = enabled;
    }

    /// Toggles sleeping; turning it off wakes every body.
    pub fn enable_sleep(&mut self, enabled: bool) {
        self.settings.enable_sleep = enabled;
        if !enabled {
            for (_, body) in self.bodies.iter_mut() {
                body.wake();
            }
        }
    }

    /// Toggles stepping; while off, [`Scene::step`] only drains commands.
    pub fn enable_update(&mut self, enabled: bool) {
        self.settings.enable_update = enabled;
    }

    // ── commands and events ─────────────────────────────────────────────

    /// Handle for submitting commands from other threads.
    #[must_use]
    pub fn command_sender(&self) -> CommandSender {
        self.inbox.sender()
    }

    /// Events emitted by the last step.
    #[must_use]
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Takes the events emitted by the last step.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Steps completed so far.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    // ── queries ─────────────────────────────────────────────────────────

    /// Bodies whose shape overlaps `region`, sorted by handle.
    #[must_use]
    pub fn query_region(&self, region: &Aabb) -> Vec<BodyHandle> {
        let mut hits: Vec<BodyHandle> = self
            .tree
            .query(region, None)
            .into_iter()
            .filter(|h| {
                self.bodies
                    .get(*h)
                    .ok()
                    .and_then(RigidBody::world_aabb)
                    .is_some_and(|bounds| bounds.overlaps(region))
            })
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Broad-phase tree over collidable bodies.
    #[must_use]
    pub fn tree(&self) -> &DynamicAabbTree<BodyHandle> {
        &self.tree
    }

    /// Draws every shape through `draw`.
    pub fn render_debug(&self, draw: &mut dyn DebugDraw) {
        for (_, body) in self.bodies.iter() {
            if let Some(shape) = body.shape() {
                shape.render(draw);
            }
        }
    }

    // ── step ────────────────────────────────────────────────────────────

    /// Advances the world by `dt` seconds.
    ///
    /// Order: queued commands, broad-phase sync, islands, narrow phase and
    /// resolution (up to `max_iterations` per island), integration, an
    /// overlap-only correction pass, tree refresh, sleep, force clearing and
    /// event emission.
    ///
    /// # Errors
    /// [`PhysicsError::InvalidTimeStep`] for negative or non-finite `dt`;
    /// other errors mean an internal invariant broke and the frame is
    /// incomplete.
    #[instrument(skip(self))]
    pub fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        self.apply_commands();
        if !self.settings.enable_update {
            return Ok(());
        }
        self.run_step(dt).inspect_err(|err| {
            error!(%err, step = self.steps, "physics step failed");
        })
    }

    fn run_step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        self.events.clear();
        for (_, body) in self.bodies.iter_mut() {
            body.set_collision_status(false, dt);
        }

        self.sync_tree(dt)?;
        let islands = self.broad_phase(dt);
        let mut resolved: Vec<Manifold> = Vec::new();

        for island in &islands {
            for _ in 0..self.settings.max_iterations {
                let manifolds = self.narrow_phase(island, false)?;
                if manifolds.is_empty() {
                    break;
                }
                self.resolve(&manifolds, dt)?;
                resolved.extend(manifolds);
            }
        }

        self.solve(dt);

        for island in &islands {
            let manifolds = self.narrow_phase(island, true)?;
            self.resolve(&manifolds, dt)?;
            resolved.extend(manifolds);
        }

        self.refresh_tree()?;
        self.update_sleep(dt);
        for (_, body) in self.bodies.iter_mut() {
            body.clear_forces();
        }

        self.events = collect_events(&resolved, &self.bodies);
        self.steps += 1;
        debug!(
            step = self.steps,
            bodies = self.bodies.len(),
            islands = islands.len(),
            manifolds = resolved.len(),
            events = self.events.len(),
            "step complete"
        );
        Ok(())
    }

    fn apply_commands(&mut self) {
        for command in self.inbox.drain() {
            if let Err(err) = self.apply_command(command) {
                warn!(%err, "dropped scene command");
            }
        }
    }

    fn apply_command(&mut self, command: SceneCommand) -> Result<(), PhysicsError> {
        match command {
            SceneCommand::ApplyForce { body, force } => {
                self.bodies.get_mut(body)?.apply_linear_force(&force);
            }
            SceneCommand::ApplyForceAtPoint { body, force, point } => {
                self.bodies
                    .get_mut(body)?
                    .apply_force_at_world_point(&force, &point);
            }
            SceneCommand::ApplyTorque { body, torque } => {
                self.bodies.get_mut(body)?.apply_torque(&torque);
            }
            SceneCommand::ApplyImpulse { body, impulse } => {
                self.bodies.get_mut(body)?.apply_linear_impulse(&impulse);
            }
            SceneCommand::ApplyImpulseAtPoint {
                body,
                impulse,
                point,
            } => {
                self.bodies
                    .get_mut(body)?
                    .apply_linear_impulse_at_world_point(&impulse, &point);
            }
            SceneCommand::SetLinearVelocity { body, velocity } => {
                self.bodies.get_mut(body)?.set_linear_velocity(velocity);
            }
            SceneCommand::SetPosition { body, position } => {
                self.bodies.get_mut(body)?.set_position(position);
            }
            SceneCommand::SetGravity(gravity) => self.set_gravity(gravity),
            SceneCommand::EnableFriction(on) => self.enable_friction(on),
            SceneCommand::EnableSleep(on) => self.enable_sleep(on),
            SceneCommand::EnableUpdate(on) => self.enable_update(on),
            SceneCommand::RemoveBody(body) => {
                self.remove_rigid_body(body)?;
            }
            SceneCommand::RemoveAllBodies => self.remove_all_bodies(),
        }
        Ok(())
    }

    /// Indexes every collidable body by the box it sweeps this step and drops
    /// bodies that stopped colliding.
    fn sync_tree(&mut self, dt: f32) -> Result<(), PhysicsError> {
        for (handle, body) in self.bodies.iter() {
            match body.swept_aabb(dt).filter(|_| body.is_collidable()) {
                Some(swept) if self.tree.contains(&handle) => {
                    self.tree.update_object(&handle, swept)?;
                }
                Some(swept) => {
                    self.tree.insert_object(handle, swept)?;
                }
                None if self.tree.contains(&handle) => self.tree.remove_object(&handle)?,
                None => {}
            }
        }
        Ok(())
    }

    fn refresh_tree(&mut self) -> Result<(), PhysicsError> {
        for (handle, body) in self.bodies.iter() {
            if let Some(bounds) = body.world_aabb() {
                if self.tree.contains(&handle) {
                    self.tree.update_object(&handle, bounds)?;
                }
            }
        }
        Ok(())
    }

    /// Splits collidable bodies into islands: buckets of a sphere hierarchy
    /// rebuilt from this step's swept bounds.
    fn broad_phase(&mut self, dt: f32) -> Vec<Island> {
        let spheres: Vec<(BodyHandle, Vec3, f32)> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_collidable())
            .filter_map(|(handle, body)| {
                let swept = body.swept_aabb(dt)?;
                Some((handle, swept.center(), swept.half_extents().length()))
            })
            .collect();
        self.islands.build(spheres);

        let mut bucket_of: FxHashMap<BodyHandle, usize> = FxHashMap::default();
        for (i, leaf) in self.islands.leaves().iter().enumerate() {
            for &handle in leaf.members() {
                bucket_of.insert(handle, i);
            }
        }

        self.islands
            .leaves()
            .iter()
            .enumerate()
            .map(|(i, leaf)| {
                let mut guests: Vec<BodyHandle> = self
                    .tree
                    .query(&leaf.bounds(), None)
                    .into_iter()
                    .filter(|h| bucket_of.get(h).is_some_and(|&j| j > i))
                    .collect();
                guests.sort_unstable();
                Island {
                    members: leaf.members().to_vec(),
                    guests,
                }
            })
            .collect()
    }

    fn should_test(a: &RigidBody, b: &RigidBody) -> bool {
        if !a.is_collidable() || !b.is_collidable() {
            return false;
        }
        if a.is_immovable() && b.is_immovable() {
            return false;
        }
        let asleep = (!a.is_awake(), !b.is_awake());
        match asleep {
            (true, true) => return false,
            (true, false) if b.is_immovable() => return false,
            (false, true) if a.is_immovable() => return false,
            _ => {}
        }
        !(a.ignores(b.entity_type()) || b.ignores(a.entity_type()))
    }

    /// Pairwise tests inside `island`. With `overlap_only` set the sweep
    /// window is zero and only existing overlaps are reported.
    fn narrow_phase(&self, island: &Island, overlap_only: bool) -> Result<Vec<Manifold>, PhysicsError> {
        let gravity = self.settings.gravity();
        let mut manifolds = Vec::new();
        for (ha, hb) in island.pairs() {
            let a = self.bodies.get(ha)?;
            let b = self.bodies.get(hb)?;
            if !Self::should_test(a, b) {
                continue;
            }
            let (Some(sa), Some(sb)) = (a.shape(), b.shape()) else {
                continue;
            };
            let contact = if overlap_only {
                self.collisions.static_test(sa, sb)
            } else {
                let window = a.solve_time_left().min(b.solve_time_left());
                self.collisions.dynamic_test(
                    sa,
                    a.linear_velocity(),
                    sb,
                    b.linear_velocity(),
                    window,
                )
            };
            if let Some(contact) = contact {
                manifolds.push(Manifold::new((ha, a), (hb, b), &contact, gravity));
            }
        }
        Ok(manifolds)
    }

    fn resolve(&mut self, manifolds: &[Manifold], dt: f32) -> Result<(), PhysicsError> {
        let friction = self.settings.enable_friction;
        for m in manifolds {
            let (a, b) = self.bodies.get_pair_mut(m.body_a, m.body_b)?;
            resolve_collision(a, b, m, dt, friction);
        }
        Ok(())
    }

    /// Integrates every body; bodies resolved mid-step only integrate the
    /// time they have left.
    fn solve(&mut self, dt: f32) {
        let gravity = self.settings.gravity();
        for (_, body) in self.bodies.iter_mut() {
            let t = if body.is_collided() {
                body.solve_time_left()
            } else {
                dt
            };
            body.integrate(&gravity, t);
        }
    }

    fn update_sleep(&mut self, dt: f32) {
        if !self.settings.enable_sleep {
            return;
        }
        let s = &self.settings;
        for (handle, body) in self.bodies.iter_mut() {
            if body.update_sleep(dt, s.linear_sleep_threshold, s.angular_sleep_threshold, s.time_to_sleep) {
                debug!(?handle, "body fell asleep");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cube(scene: &mut Scene, at: Vec3, body_type: BodyType) -> BodyHandle {
        let mut body = RigidBody::new(scene.body_count() as u64, 0);
        body.set_body_type(body_type);
        body.set_position(at);
        body.set_aabb_shape(at - Vec3::splat(0.5), at + Vec3::splat(0.5))
            .unwrap();
        scene.create_rigid_body(body).unwrap()
    }

    #[test]
    fn island_pairs_cover_members_and_guests_once() {
        let mut store = BodyStore::new();
        let h: Vec<BodyHandle> = (0..4).map(|e| store.insert(RigidBody::new(e, 0))).collect();
        let island = Island {
            members: vec![h[0], h[1], h[2]],
            guests: vec![h[3]],
        };
        let pairs: Vec<_> = island.pairs().collect();
        assert_eq!(
            pairs,
            vec![(h[0], h[1]), (h[0], h[2]), (h[1], h[2]), (h[0], h[3]), (h[1], h[3]), (h[2], h[3])]
        );
    }

    #[test]
    fn bodies_in_different_buckets_still_collide() {
        let settings = PhysicsSettings {
            island_leaf_capacity: 1,
            gravity: [0.0; 3],
            ..PhysicsSettings::default()
        };
        let mut scene = Scene::new(settings, CollisionsManager::new());
        let a = cube(&mut scene, Vec3::ZERO, BodyType::Dynamic);
        let b = cube(&mut scene, Vec3::new(0.8, 0.0, 0.0), BodyType::Dynamic);
        scene.step(1.0 / 60.0).unwrap();
        let gap = scene.body(b).unwrap().position().x() - scene.body(a).unwrap().position().x();
        assert!(gap >= 1.0 - 1e-5, "gap {gap}");
        assert_eq!(scene.events().len(), 1);
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut scene = Scene::default();
        let h = cube(&mut scene, Vec3::ZERO, BodyType::Dynamic);
        scene.remove_rigid_body(h).unwrap();
        assert_eq!(scene.body(h).err(), Some(PhysicsError::UnknownBody(h)));
        assert!(scene.remove_rigid_body(h).is_err());
        assert!(scene.tree().is_empty());
    }

    #[test]
    fn shapeless_bodies_must_not_collide() {
        let mut scene = Scene::default();
        let err = scene.create_rigid_body(RigidBody::new(7, 0)).unwrap_err();
        assert_eq!(err, PhysicsError::MissingShape(7));
        assert_eq!(scene.body_count(), 0);

        let mut ghost = RigidBody::new(8, 0);
        ghost.set_body_type(BodyType::NoCollision);
        let h = scene.create_rigid_body(ghost).unwrap();
        assert_eq!(scene.body_count(), 1);
        assert!(!scene.tree().contains(&h));
    }

    #[test]
    fn negative_step_is_an_error() {
        let mut scene = Scene::default();
        assert_eq!(scene.step(-1.0), Err(PhysicsError::InvalidTimeStep(-1.0)));
        assert!(scene.step(f32::NAN).is_err());
    }
}
