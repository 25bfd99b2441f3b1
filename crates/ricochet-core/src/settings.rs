// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tunables for a [`Scene`](crate::Scene).

use ricochet_geom::math::Vec3;
use serde::{Deserialize, Serialize};

/// Config key under which [`PhysicsSettings`] are stored.
pub const SETTINGS_KEY: &str = "physics";

/// Simulation parameters. Missing fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// World gravity in m/s².
    pub gravity: [f32; 3],
    /// Apply Coulomb friction during impulse resolution.
    pub enable_friction: bool,
    /// Let slow dynamic bodies fall asleep.
    pub enable_sleep: bool,
    /// When `false`, [`Scene::step`](crate::Scene::step) does nothing.
    pub enable_update: bool,
    /// Narrow-phase/resolve passes per island per step.
    pub max_iterations: u32,
    /// Maximum bodies per broad-phase island bucket.
    pub island_leaf_capacity: usize,
    /// Fraction of a body's extent added to its broad-phase box.
    pub skin_ratio: f32,
    /// Linear speed (m/s) below which a body counts as resting.
    pub linear_sleep_threshold: f32,
    /// Angular speed (rad/s) below which a body counts as resting.
    pub angular_sleep_threshold: f32,
    /// Seconds a body must rest before it sleeps.
    pub time_to_sleep: f32,
    /// Step length used by fixed-rate drivers such as the CLI.
    pub fixed_time_step: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            enable_friction: true,
            enable_sleep: false,
            enable_update: true,
            max_iterations: 3,
            island_leaf_capacity: 16,
            skin_ratio: 0.1,
            linear_sleep_threshold: 0.05,
            angular_sleep_threshold: 0.05,
            time_to_sleep: 0.5,
            fixed_time_step: 1.0 / 60.0,
        }
    }
}

impl PhysicsSettings {
    /// Gravity as a vector.
    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        Vec3::from(self.gravity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let s: PhysicsSettings = serde_json::from_str(r#"{"max_iterations": 5}"#).unwrap();
        assert_eq!(s.max_iterations, 5);
        assert_eq!(s.gravity, [0.0, -9.81, 0.0]);
        assert!(s.enable_update);
    }
}
