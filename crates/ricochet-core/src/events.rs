// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::body::EntityId;
use crate::manifold::Manifold;
use crate::store::{BodyHandle, BodyStore};

/// Published once per body pair resolved during a step.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Entity owning `body_a`.
    pub entity_a: EntityId,
    /// Entity owning `body_b`.
    pub entity_b: EntityId,
    /// First body, as ordered in `manifold`.
    pub body_a: BodyHandle,
    /// Second body, as ordered in `manifold`.
    pub body_b: BodyHandle,
    /// First manifold resolved for this pair in the step.
    pub manifold: Manifold,
}

/// Collapses resolved manifolds to one event per pair, ordered by the pair's
/// canonical (smaller handle first) key.
pub(crate) fn collect_events(resolved: &[Manifold], bodies: &BodyStore) -> Vec<CollisionEvent> {
    let mut firsts: BTreeMap<(BodyHandle, BodyHandle), &Manifold> = BTreeMap::new();
    for m in resolved {
        firsts.entry(m.canonical_pair()).or_insert(m);
    }
    firsts
        .into_values()
        .filter_map(|m| {
            let a = bodies.get(m.body_a).ok()?;
            let b = bodies.get(m.body_b).ok()?;
            Some(CollisionEvent {
                entity_a: a.entity(),
                entity_b: b.entity(),
                body_a: m.body_a,
                body_b: m.body_b,
                manifold: *m,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBody;
    use crate::collision::Contact;
    use ricochet_geom::math::Vec3;

    #[test]
    fn one_event_per_pair_in_canonical_order() {
        let mut bodies = BodyStore::new();
        let h: Vec<BodyHandle> = (0..3u64).map(|e| bodies.insert(RigidBody::new(e + 10, 0))).collect();
        let hit = |a: BodyHandle, b: BodyHandle, depth: f32| {
            let (ra, rb) = (bodies.get(a).ok(), bodies.get(b).ok());
            let (Some(ra), Some(rb)) = (ra, rb) else {
                unreachable!("bodies were just inserted")
            };
            Manifold::new((a, ra), (b, rb), &Contact::overlap(Vec3::UNIT_X, depth), Vec3::ZERO)
        };
        let resolved = vec![hit(h[2], h[1], 0.1), hit(h[0], h[1], 0.2), hit(h[1], h[2], 0.3)];
        let events = collect_events(&resolved, &bodies);
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].entity_a, events[0].entity_b), (10, 11));
        assert_eq!((events[1].body_a, events[1].body_b), (h[2], h[1]));
        assert!((events[1].manifold.penetration - 0.1).abs() < f32::EPSILON);
    }
}
