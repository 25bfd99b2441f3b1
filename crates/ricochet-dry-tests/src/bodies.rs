// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid body and scene builders.

use ricochet_core::{
    BodyType, CollisionsManager, EntityId, EntityType, PhysicsError, PhysicsSettings, RigidBody,
    Scene,
};
use ricochet_geom::math::Vec3;
use ricochet_geom::{Aabb, Shape};

#[derive(Debug, Clone, Copy)]
enum ShapeSpec {
    None,
    Aabb(Vec3),
    Oobb(Vec3),
    Circle(f32),
}

/// Fluent builder for [`RigidBody`] fixtures.
///
/// Shapes are centered on the body position. Velocity is applied last so
/// static bodies silently keep zero velocity, as they would in a scene.
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    entity: EntityId,
    entity_type: EntityType,
    body_type: BodyType,
    position: Vec3,
    velocity: Vec3,
    mass: f32,
    restitution: Option<f32>,
    friction: Option<f32>,
    gravity_scale: f32,
    ignored: Vec<EntityType>,
    shape: ShapeSpec,
}

impl BodyBuilder {
    /// Dynamic, unit-mass, shapeless body at the origin.
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            entity_type: 0,
            body_type: BodyType::Dynamic,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            mass: 1.0,
            restitution: None,
            friction: None,
            gravity_scale: 1.0,
            ignored: Vec::new(),
            shape: ShapeSpec::None,
        }
    }

    /// Static body.
    pub fn fixed(entity: EntityId) -> Self {
        Self::new(entity).body_type(BodyType::Static)
    }

    /// Sets the gameplay category.
    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = entity_type;
        self
    }

    /// Sets the body type.
    pub fn body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        self
    }

    /// Places the body.
    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Initial linear velocity.
    pub fn moving(mut self, x: f32, y: f32, z: f32) -> Self {
        self.velocity = Vec3::new(x, y, z);
        self
    }

    /// Mass in kg.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Restitution coefficient.
    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution);
        self
    }

    /// Friction coefficient.
    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    /// Gravity multiplier.
    pub fn gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Never collide with `entity_type`.
    pub fn ignoring(mut self, entity_type: EntityType) -> Self {
        self.ignored.push(entity_type);
        self
    }

    /// Axis-aligned cube of half extent `half`.
    pub fn cube(self, half: f32) -> Self {
        self.aabb(Vec3::splat(half))
    }

    /// Axis-aligned box with the given half extents.
    pub fn aabb(mut self, half_extents: Vec3) -> Self {
        self.shape = ShapeSpec::Aabb(half_extents);
        self
    }

    /// Oriented box with the given half extents.
    pub fn oobb(mut self, half_extents: Vec3) -> Self {
        self.shape = ShapeSpec::Oobb(half_extents);
        self
    }

    /// Sphere of radius `radius`.
    pub fn sphere(mut self, radius: f32) -> Self {
        self.shape = ShapeSpec::Circle(radius);
        self
    }

    /// Builds the body.
    ///
    /// # Errors
    /// Propagates shape assignment failures (negative extents).
    pub fn build(self) -> Result<RigidBody, PhysicsError> {
        let mut body = RigidBody::new(self.entity, self.entity_type);
        body.set_body_type(self.body_type);
        body.set_mass(self.mass);
        body.set_gravity_scale(self.gravity_scale);
        if let Some(e) = self.restitution {
            body.set_restitution(e);
        }
        if let Some(mu) = self.friction {
            body.set_friction(mu);
        }
        for t in self.ignored {
            body.add_ignored_type(t);
        }
        body.set_position(self.position);
        match self.shape {
            ShapeSpec::None => {}
            ShapeSpec::Aabb(half) => {
                body.set_aabb_shape(self.position - half, self.position + half)?;
            }
            ShapeSpec::Oobb(half) => {
                body.set_shape(Shape::oobb(Aabb::from_center_half_extents(Vec3::ZERO, half)))?;
            }
            ShapeSpec::Circle(radius) => body.set_shape(Shape::circle(Vec3::ZERO, radius))?,
        }
        body.set_linear_velocity(self.velocity);
        Ok(body)
    }

    /// Builds the body and adds it to `scene`.
    ///
    /// # Errors
    /// See [`BodyBuilder::build`] and [`Scene::create_rigid_body`].
    pub fn spawn(self, scene: &mut Scene) -> Result<ricochet_core::BodyHandle, PhysicsError> {
        scene.create_rigid_body(self.build()?)
    }
}

/// Default settings with gravity switched off.
pub fn weightless_settings() -> PhysicsSettings {
    PhysicsSettings {
        gravity: [0.0; 3],
        ..PhysicsSettings::default()
    }
}

/// Empty scene without gravity, using the built-in narrow phase.
pub fn weightless_scene() -> Scene {
    Scene::new(weightless_settings(), CollisionsManager::new())
}
