// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid bodies and their motion state.

use std::collections::BTreeSet;

use ricochet_geom::math::{Quat, Vec3, EPSILON};
use ricochet_geom::{Aabb, Shape, Transform};
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Identifier of the game entity that owns a body.
pub type EntityId = u64;

/// Gameplay category of an entity, matched against ignore sets.
pub type EntityType = u32;

/// How a body takes part in the simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves; infinite mass.
    Static,
    /// Moved by forces, gravity and collisions.
    #[default]
    Dynamic,
    /// Posed by the caller and never integrated. Its velocity still counts
    /// in contacts, so it pushes others but is never pushed.
    Kinematic,
    /// Integrates like a dynamic body but is skipped by collision detection.
    NoCollision,
}

/// A simulated body with at most one collision shape.
#[derive(Debug, Clone)]
pub struct RigidBody {
    entity: EntityId,
    entity_type: EntityType,
    body_type: BodyType,
    shape: Option<Shape>,
    collider_displacement: Vec3,

    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    force: Vec3,
    torque: Vec3,

    mass: f32,
    inverse_mass: f32,
    inverse_inertia: f32,
    linear_damping: f32,
    angular_damping: f32,
    gravity_scale: f32,
    restitution: f32,
    friction: f32,
    ignored_types: BTreeSet<EntityType>,

    collided: bool,
    solve_time_left: f32,
    awake: bool,
    rest_time: f32,
}

impl RigidBody {
    /// Dynamic body of unit mass at the origin, owned by `entity`.
    #[must_use]
    pub fn new(entity: EntityId, entity_type: EntityType) -> Self {
        Self {
            entity,
            entity_type,
            body_type: BodyType::Dynamic,
            shape: None,
            collider_displacement: Vec3::ZERO,
            position: Vec3::ZERO,
            rotation: Quat::identity(),
            scale: Vec3::ONE,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            mass: 1.0,
            inverse_mass: 1.0,
            inverse_inertia: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.05,
            gravity_scale: 1.0,
            restitution: 0.2,
            friction: 0.5,
            ignored_types: BTreeSet::new(),
            collided: false,
            solve_time_left: 0.0,
            awake: true,
            rest_time: 0.0,
        }
    }

    // ── identity and classification ─────────────────────────────────────

    /// Owning entity.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Entity category.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Simulation role.
    #[must_use]
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Changes the simulation role. Bodies that stop being dynamic lose
    /// their accumulated forces.
    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
        if !self.responds_to_forces() {
            self.clear_forces();
        }
        if body_type == BodyType::Static {
            self.linear_velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
        self.refresh_inertia();
    }

    /// Static and kinematic bodies are never pushed by collisions.
    #[must_use]
    pub fn is_immovable(&self) -> bool {
        matches!(self.body_type, BodyType::Static | BodyType::Kinematic)
    }

    /// `true` for bodies the narrow phase tests.
    #[must_use]
    pub fn is_collidable(&self) -> bool {
        self.body_type != BodyType::NoCollision && self.shape.is_some()
    }

    fn responds_to_forces(&self) -> bool {
        matches!(self.body_type, BodyType::Dynamic | BodyType::NoCollision)
    }

    /// Never collide with entities of `entity_type`.
    pub fn add_ignored_type(&mut self, entity_type: EntityType) {
        self.ignored_types.insert(entity_type);
    }

    /// Stops ignoring `entity_type`.
    pub fn remove_ignored_type(&mut self, entity_type: EntityType) {
        self.ignored_types.remove(&entity_type);
    }

    /// `true` if collisions with `entity_type` are filtered out.
    #[must_use]
    pub fn ignores(&self, entity_type: EntityType) -> bool {
        self.ignored_types.contains(&entity_type)
    }

    // ── shape ───────────────────────────────────────────────────────────

    /// Assigned shape, if any.
    #[must_use]
    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// Offset from the body position to the shape placement.
    #[must_use]
    pub fn collider_displacement(&self) -> Vec3 {
        self.collider_displacement
    }

    /// Assigns an axis-aligned box spanning world corners `min`..`max` at the
    /// body's current pose. The box keeps its offset from the body position.
    ///
    /// # Errors
    /// [`PhysicsError::ShapeAlreadyAssigned`] if a shape is present, or
    /// [`PhysicsError::Geom`] when `min > max`.
    pub fn set_aabb_shape(&mut self, min: Vec3, max: Vec3) -> Result<(), PhysicsError> {
        if self.shape.is_some() {
            return Err(PhysicsError::ShapeAlreadyAssigned);
        }
        let world = Aabb::new(min, max)?;
        let scale = self.scale.abs();
        let unscale = |s: f32| if s > EPSILON { 1.0 / s } else { 1.0 };
        let half = world
            .half_extents()
            .hadamard(&Vec3::new(unscale(scale.x()), unscale(scale.y()), unscale(scale.z())));
        self.shape = Some(Shape::aabb(Aabb::from_center_half_extents(Vec3::ZERO, half)));
        self.collider_displacement = world.center().sub(&self.position);
        self.refresh_inertia();
        self.update_shape();
        Ok(())
    }

    /// Assigns a shape whose geometry is expressed relative to the body origin.
    ///
    /// # Errors
    /// [`PhysicsError::ShapeAlreadyAssigned`] if a shape is present.
    pub fn set_shape(&mut self, shape: Shape) -> Result<(), PhysicsError> {
        if self.shape.is_some() {
            return Err(PhysicsError::ShapeAlreadyAssigned);
        }
        self.shape = Some(shape);
        self.collider_displacement = Vec3::ZERO;
        self.refresh_inertia();
        self.update_shape();
        Ok(())
    }

    /// Model transform the shape is placed with.
    #[must_use]
    pub fn shape_transform(&self) -> Transform {
        Transform::new(
            self.position.add(&self.collider_displacement),
            self.rotation,
            self.scale,
        )
    }

    /// Re-places the shape at `position + displacement`; a no-op when nothing moved.
    pub fn update_shape(&mut self) -> bool {
        let tf = self.shape_transform();
        self.shape
            .as_mut()
            .is_some_and(|s| s.set_model_transform_and_update(&tf))
    }

    /// World bound of the shape.
    #[must_use]
    pub fn world_aabb(&self) -> Option<Aabb> {
        self.shape.as_ref().map(Shape::world_aabb)
    }

    /// World bound covering the motion over the next `dt` seconds.
    #[must_use]
    pub fn swept_aabb(&self, dt: f32) -> Option<Aabb> {
        let start = self.shape_transform();
        let end = start.with_translation(start.translation().add(&self.linear_velocity.scale(dt)));
        self.shape.as_ref().map(|s| s.swept_aabb(&end))
    }

    // ── pose ────────────────────────────────────────────────────────────

    /// World position of the body origin.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleports the body and re-places its shape.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_shape();
    }

    /// Moves the body by `delta`.
    pub fn translate(&mut self, delta: &Vec3) {
        self.set_position(self.position.add(delta));
    }

    /// Orientation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Sets the orientation and re-places the shape.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
        self.update_shape();
    }

    /// Non-uniform scale.
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Sets the scale and re-places the shape.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.update_shape();
        self.refresh_inertia();
    }

    // ── velocity and forces ─────────────────────────────────────────────

    /// Linear velocity (m/s).
    #[must_use]
    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    /// Sets the linear velocity. Static bodies stay at rest.
    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        if self.body_type == BodyType::Static {
            return;
        }
        self.linear_velocity = velocity;
        self.wake();
    }

    /// Angular velocity (rad/s).
    #[must_use]
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Sets the angular velocity. Static bodies stay at rest.
    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        if self.body_type == BodyType::Static {
            return;
        }
        self.angular_velocity = velocity;
        self.wake();
    }

    /// Force accumulated since the last step.
    #[must_use]
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Torque accumulated since the last step.
    #[must_use]
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    /// Adds a force through the center of mass.
    pub fn apply_linear_force(&mut self, force: &Vec3) {
        if !self.responds_to_forces() {
            return;
        }
        self.force += *force;
        self.wake();
    }

    /// Adds a force acting at world point `point`, producing torque.
    pub fn apply_force_at_world_point(&mut self, force: &Vec3, point: &Vec3) {
        if !self.responds_to_forces() {
            return;
        }
        self.force += *force;
        self.torque += point.sub(&self.position).cross(force);
        self.wake();
    }

    /// Adds a torque.
    pub fn apply_torque(&mut self, torque: &Vec3) {
        if !self.responds_to_forces() {
            return;
        }
        self.torque += *torque;
        self.wake();
    }

    /// Instantly changes momentum through the center of mass.
    pub fn apply_linear_impulse(&mut self, impulse: &Vec3) {
        if !self.responds_to_forces() {
            return;
        }
        self.linear_velocity += impulse.scale(self.inverse_mass);
        self.wake();
    }

    /// Instantly changes momentum at world point `point`, producing spin.
    pub fn apply_linear_impulse_at_world_point(&mut self, impulse: &Vec3, point: &Vec3) {
        if !self.responds_to_forces() {
            return;
        }
        self.linear_velocity += impulse.scale(self.inverse_mass);
        self.angular_velocity += point
            .sub(&self.position)
            .cross(impulse)
            .scale(self.inverse_inertia);
        self.wake();
    }

    /// Zeroes accumulated force and torque.
    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    // ── mass and material ───────────────────────────────────────────────

    /// Mass in kg.
    #[must_use]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Sets the mass; values at or below `EPSILON` give infinite mass.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.0);
        self.inverse_mass = if self.mass > EPSILON {
            1.0 / self.mass
        } else {
            0.0
        };
        self.refresh_inertia();
    }

    /// Inverse mass as seen by collision response: zero for immovable bodies.
    #[must_use]
    pub fn inverse_mass(&self) -> f32 {
        if self.is_immovable() {
            0.0
        } else {
            self.inverse_mass
        }
    }

    /// Inverse moment of inertia (solid sphere around the shape radius).
    #[must_use]
    pub fn inverse_inertia(&self) -> f32 {
        if self.is_immovable() {
            0.0
        } else {
            self.inverse_inertia
        }
    }

    fn refresh_inertia(&mut self) {
        let radius = self.shape.as_ref().map_or(0.0, Shape::radius);
        let inertia = 0.4 * self.mass * radius * radius;
        self.inverse_inertia = if inertia > EPSILON && self.inverse_mass > 0.0 {
            1.0 / inertia
        } else {
            0.0
        };
    }

    /// Linear damping coefficient (1/s).
    #[must_use]
    pub fn linear_damping(&self) -> f32 {
        self.linear_damping
    }

    /// Sets the linear damping coefficient; negative values clamp to zero.
    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping.max(0.0);
    }

    /// Angular damping coefficient (1/s).
    #[must_use]
    pub fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    /// Sets the angular damping coefficient; negative values clamp to zero.
    pub fn set_angular_damping(&mut self, damping: f32) {
        self.angular_damping = damping.max(0.0);
    }

    /// Multiplier on world gravity.
    #[must_use]
    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    /// Sets the gravity multiplier.
    pub fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    /// Bounciness in `[0, 1]`.
    #[must_use]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Sets bounciness, clamped to `[0, 1]`.
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution.clamp(0.0, 1.0);
    }

    /// Coulomb friction coefficient.
    #[must_use]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Sets the friction coefficient; negative values clamp to zero.
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction.max(0.0);
    }

    // ── per-step state ──────────────────────────────────────────────────

    /// `true` once this body was resolved against another this step.
    #[must_use]
    pub fn is_collided(&self) -> bool {
        self.collided
    }

    /// Seconds of the current step this body still has to integrate.
    #[must_use]
    pub fn solve_time_left(&self) -> f32 {
        self.solve_time_left
    }

    /// Records the collision status; `solve_time_left` is clamped at zero.
    pub fn set_collision_status(&mut self, collided: bool, solve_time_left: f32) {
        self.collided = collided;
        self.solve_time_left = solve_time_left.max(0.0);
    }

    /// Advances the pose by the current velocities over `dt`, without forces.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 || self.is_immovable() {
            return;
        }
        self.position += self.linear_velocity.scale(dt);
        if self.angular_velocity.length_squared() > EPSILON * EPSILON {
            self.rotation = self.rotation.integrate(&self.angular_velocity, dt);
        }
        self.update_shape();
    }

    /// Semi-implicit Euler step of `dt` seconds under `gravity`.
    ///
    /// Dynamic bodies feel forces, gravity and damping. Static, kinematic and
    /// sleeping bodies stay put.
    pub fn integrate(&mut self, gravity: &Vec3, dt: f32) {
        if dt <= 0.0 || !self.awake {
            return;
        }
        match self.body_type {
            BodyType::Static | BodyType::Kinematic => return,
            BodyType::Dynamic | BodyType::NoCollision => {
                let accel = self
                    .force
                    .scale(self.inverse_mass)
                    .add(&gravity.scale(self.gravity_scale));
                self.linear_velocity += accel.scale(dt);
                self.linear_velocity *= 1.0 / (1.0 + dt * self.linear_damping);
                self.angular_velocity += self.torque.scale(self.inverse_inertia * dt);
                self.angular_velocity *= 1.0 / (1.0 + dt * self.angular_damping);
            }
        }
        self.advance(dt);
    }

    // ── sleep ───────────────────────────────────────────────────────────

    /// `false` while the body sleeps.
    #[must_use]
    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Wakes the body and restarts its rest timer.
    pub fn wake(&mut self) {
        self.awake = true;
        self.rest_time = 0.0;
    }

    /// Puts the body to sleep and stops it.
    pub fn sleep(&mut self) {
        self.awake = false;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.clear_forces();
    }

    /// Accumulates rest time while both speeds stay under their thresholds;
    /// returns `true` when the body just fell asleep.
    pub fn update_sleep(
        &mut self,
        dt: f32,
        linear_threshold: f32,
        angular_threshold: f32,
        time_to_sleep: f32,
    ) -> bool {
        if !self.awake || self.body_type != BodyType::Dynamic {
            return false;
        }
        let slow = self.linear_velocity.length_squared() < linear_threshold * linear_threshold
            && self.angular_velocity.length_squared() < angular_threshold * angular_threshold;
        if !slow {
            self.rest_time = 0.0;
            return false;
        }
        self.rest_time += dt;
        if self.rest_time >= time_to_sleep {
            self.sleep();
            return true;
        }
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn shape_is_assigned_once() {
        let mut body = RigidBody::new(1, 0);
        body.set_aabb_shape(Vec3::ZERO, Vec3::ONE).unwrap();
        assert_eq!(
            body.set_aabb_shape(Vec3::ZERO, Vec3::ONE),
            Err(PhysicsError::ShapeAlreadyAssigned)
        );
        assert_eq!(
            body.set_shape(Shape::circle(Vec3::ZERO, 1.0)),
            Err(PhysicsError::ShapeAlreadyAssigned)
        );
    }

    #[test]
    fn aabb_shape_keeps_offset_from_position() {
        let mut body = RigidBody::new(1, 0);
        body.set_position(Vec3::new(1.0, 0.0, 0.0));
        body.set_aabb_shape(Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 2.0)).unwrap();
        assert_eq!(body.collider_displacement().to_array(), [2.0, 1.0, 1.0]);
        body.set_position(Vec3::new(11.0, 0.0, 0.0));
        let b = body.world_aabb().unwrap();
        assert_eq!(b.min().to_array(), [12.0, 0.0, 0.0]);
        assert_eq!(b.max().to_array(), [14.0, 2.0, 2.0]);
    }

    #[test]
    fn inverted_aabb_shape_is_rejected() {
        let mut body = RigidBody::new(1, 0);
        assert!(matches!(
            body.set_aabb_shape(Vec3::ONE, Vec3::ZERO),
            Err(PhysicsError::Geom(_))
        ));
        assert!(body.shape().is_none());
    }

    #[test]
    fn zero_mass_is_infinite() {
        let mut body = RigidBody::new(1, 0);
        body.set_mass(0.0);
        assert_eq!(body.inverse_mass(), 0.0);
        body.apply_linear_impulse(&Vec3::UNIT_X);
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
    }

    #[test]
    fn static_bodies_ignore_forces() {
        let mut body = RigidBody::new(1, 0);
        body.set_body_type(BodyType::Static);
        body.apply_linear_force(&Vec3::UNIT_Y);
        body.apply_linear_impulse(&Vec3::UNIT_Y);
        assert_eq!(body.force(), Vec3::ZERO);
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
        assert_eq!(body.inverse_mass(), 0.0);
    }

    #[test]
    fn off_center_force_produces_torque() {
        let mut body = RigidBody::new(1, 0);
        body.apply_force_at_world_point(&Vec3::UNIT_Y, &Vec3::UNIT_X);
        assert_eq!(body.torque().to_array(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn integrate_applies_gravity_then_moves() {
        let mut body = RigidBody::new(1, 0);
        body.integrate(&Vec3::new(0.0, -10.0, 0.0), 0.5);
        assert_eq!(body.linear_velocity().to_array(), [0.0, -5.0, 0.0]);
        assert_eq!(body.position().to_array(), [0.0, -2.5, 0.0]);
    }

    #[test]
    fn kinematic_body_is_not_integrated() {
        let mut body = RigidBody::new(1, 0);
        body.set_body_type(BodyType::Kinematic);
        body.set_linear_velocity(Vec3::UNIT_X);
        body.integrate(&Vec3::new(0.0, -10.0, 0.0), 1.0);
        body.advance(1.0);
        assert_eq!(body.position(), Vec3::ZERO);
        assert_eq!(body.linear_velocity(), Vec3::UNIT_X);
    }

    #[test]
    fn resting_body_falls_asleep_and_wakes_on_impulse() {
        let mut body = RigidBody::new(1, 0);
        assert!(!body.update_sleep(0.3, 0.1, 0.1, 0.5));
        assert!(body.update_sleep(0.3, 0.1, 0.1, 0.5));
        assert!(!body.is_awake());
        body.apply_linear_impulse(&Vec3::UNIT_X);
        assert!(body.is_awake());
        assert_eq!(body.linear_velocity(), Vec3::UNIT_X);
    }
}
