// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canned scenes for exercising the solver from the command line.

use anyhow::Result;
use clap::ValueEnum;
use ricochet_core::{
    BodyType, CollisionsManager, EntityId, EntityType, PhysicsSettings, RigidBody, Scene,
};
use ricochet_geom::math::{Quat, Vec3};
use ricochet_geom::{Aabb, Shape};
use serde::Serialize;
use tracing::{debug, info};

const WALL: EntityType = 1;
const PROP: EntityType = 2;

/// Scene to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// A column of cubes dropped onto a floor.
    Drop,
    /// Two elastic boxes bouncing between walls without gravity.
    Pong,
    /// One of each shape kind falling onto a floor.
    Mixed,
}

/// Final state of one body.
#[derive(Debug, Clone, Serialize)]
pub struct BodyReport {
    pub entity: EntityId,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub awake: bool,
}

/// Outcome of [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: u64,
    pub dt: f32,
    pub collisions: usize,
    pub bodies: Vec<BodyReport>,
}

/// Builds `demo` with `settings`.
pub fn build(demo: Demo, settings: PhysicsSettings) -> Result<Scene> {
    let mut scene = Scene::new(settings, CollisionsManager::new());
    match demo {
        Demo::Drop => {
            scene.create_rigid_body(floor(0)?)?;
            for i in 0..4u64 {
                let y = 1.5 + 1.5 * i as f32;
                scene.create_rigid_body(cube(i + 1, Vec3::new(0.0, y, 0.0), 0.5)?)?;
            }
        }
        Demo::Pong => {
            scene.set_gravity(Vec3::ZERO);
            scene.enable_friction(false);
            scene.create_rigid_body(wall(0, -6.0)?)?;
            scene.create_rigid_body(wall(1, 6.0)?)?;
            for (entity, x, vx) in [(2, -3.0, 4.0), (3, 3.0, -2.0)] {
                let mut body = cube(entity, Vec3::new(x, 0.0, 0.0), 0.5)?;
                body.set_restitution(1.0);
                body.set_linear_velocity(Vec3::new(vx, 0.0, 0.0));
                scene.create_rigid_body(body)?;
            }
        }
        Demo::Mixed => {
            scene.create_rigid_body(floor(0)?)?;
            scene.create_rigid_body(cube(1, Vec3::new(-2.0, 2.0, 0.0), 0.5)?)?;
            scene.create_rigid_body(ball(2, Vec3::new(0.0, 3.0, 0.0), 0.5)?)?;
            scene.create_rigid_body(tilted_box(3, Vec3::new(2.0, 4.0, 0.0), 0.6)?)?;
        }
    }
    info!(?demo, bodies = scene.body_count(), "demo scene built");
    Ok(scene)
}

/// Steps `scene` `steps` times and summarizes the result.
pub fn run(scene: &mut Scene, steps: u64, dt: f32) -> Result<Report> {
    let mut collisions = 0;
    for _ in 0..steps {
        scene.step(dt)?;
        for event in scene.drain_events() {
            debug!(
                step = scene.step_count(),
                a = event.entity_a,
                b = event.entity_b,
                toi = event.manifold.intersect_time,
                "collision"
            );
            collisions += 1;
        }
    }
    let bodies = scene
        .bodies()
        .map(|(_, body)| BodyReport {
            entity: body.entity(),
            position: body.position().to_array(),
            velocity: body.linear_velocity().to_array(),
            awake: body.is_awake(),
        })
        .collect();
    info!(steps, collisions, "demo finished");
    Ok(Report {
        steps: scene.step_count(),
        dt,
        collisions,
        bodies,
    })
}

fn floor(entity: EntityId) -> Result<RigidBody> {
    let mut body = RigidBody::new(entity, WALL);
    body.set_body_type(BodyType::Static);
    body.set_position(Vec3::new(0.0, -0.5, 0.0));
    body.set_aabb_shape(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0))?;
    Ok(body)
}

fn wall(entity: EntityId, x: f32) -> Result<RigidBody> {
    let mut body = RigidBody::new(entity, WALL);
    body.set_body_type(BodyType::Static);
    body.set_position(Vec3::new(x, 0.0, 0.0));
    body.set_aabb_shape(Vec3::new(x - 0.5, -2.0, -2.0), Vec3::new(x + 0.5, 2.0, 2.0))?;
    Ok(body)
}

fn cube(entity: EntityId, at: Vec3, half: f32) -> Result<RigidBody> {
    let mut body = RigidBody::new(entity, PROP);
    body.set_position(at);
    body.set_aabb_shape(at - Vec3::splat(half), at + Vec3::splat(half))?;
    Ok(body)
}

fn ball(entity: EntityId, at: Vec3, radius: f32) -> Result<RigidBody> {
    let mut body = RigidBody::new(entity, PROP);
    body.set_position(at);
    body.set_shape(Shape::circle(Vec3::ZERO, radius))?;
    Ok(body)
}

fn tilted_box(entity: EntityId, at: Vec3, half: f32) -> Result<RigidBody> {
    let mut body = RigidBody::new(entity, PROP);
    body.set_position(at);
    body.set_rotation(Quat::from_axis_angle(Vec3::UNIT_Y, 0.5));
    body.set_shape(Shape::oobb(Aabb::from_center_half_extents(
        Vec3::ZERO,
        Vec3::splat(half),
    )))?;
    Ok(body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dropped_column_lands_on_the_floor() {
        let mut scene = build(Demo::Drop, PhysicsSettings::default()).unwrap();
        let report = run(&mut scene, 240, 1.0 / 60.0).unwrap();
        assert_eq!(report.steps, 240);
        assert!(report.collisions > 0);
        for body in report.bodies.iter().filter(|b| b.entity != 0) {
            assert!(body.position[1] > 0.25, "{body:?}");
        }
    }

    #[test]
    fn pong_boxes_stay_between_the_walls() {
        let mut scene = build(Demo::Pong, PhysicsSettings::default()).unwrap();
        let report = run(&mut scene, 300, 1.0 / 60.0).unwrap();
        assert!(report.collisions >= 2);
        for body in &report.bodies {
            assert!(body.position[0].abs() <= 6.0, "{body:?}");
        }
    }

    #[test]
    fn mixed_scene_has_every_shape_kind() {
        let scene = build(Demo::Mixed, PhysicsSettings::default()).unwrap();
        let kinds: Vec<_> = scene
            .bodies()
            .filter_map(|(_, b)| b.shape().map(Shape::shape_type))
            .collect();
        assert_eq!(kinds.len(), 4);
        for kind in [
            ricochet_geom::ShapeType::Aabb,
            ricochet_geom::ShapeType::Oobb,
            ricochet_geom::ShapeType::Circle,
        ] {
            assert!(kinds.contains(&kind));
        }
    }
}
