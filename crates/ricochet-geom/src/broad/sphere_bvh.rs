// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::Vec3;
use crate::types::aabb::Aabb;

/// Default number of spheres a leaf bucket may hold before it is split.
pub const DEFAULT_LEAF_CAPACITY: usize = 16;

/// A leaf bucket of a [`SphereBvh`].
#[derive(Debug, Clone, PartialEq)]
pub struct BvhLeaf<K> {
    members: Vec<K>,
    bounds: Aabb,
}

impl<K> BvhLeaf<K> {
    /// Keys in this bucket, sorted ascending.
    #[must_use]
    pub fn members(&self) -> &[K] {
        &self.members
    }

    /// Box enclosing every sphere of the bucket.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

#[derive(Debug, Clone, Copy)]
struct Item<K> {
    key: K,
    center: Vec3,
    radius: f32,
}

impl<K> Item<K> {
    fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }
}

/// Top-down hierarchy over bounding spheres, rebuilt from scratch each time.
///
/// A node is split at the median of its sphere centers along the widest axis
/// of the center spread until each bucket holds at most `leaf_capacity`
/// spheres. Only the leaf buckets are kept.
#[derive(Debug, Clone)]
pub struct SphereBvh<K> {
    leaf_capacity: usize,
    leaves: Vec<BvhLeaf<K>>,
}

impl<K: Copy + Ord> SphereBvh<K> {
    /// Empty hierarchy with the given bucket size (at least one).
    #[must_use]
    pub fn new(leaf_capacity: usize) -> Self {
        Self {
            leaf_capacity: leaf_capacity.max(1),
            leaves: Vec::new(),
        }
    }

    /// Maximum bucket size.
    #[must_use]
    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Rebuilds from `(key, center, radius)` triples.
    pub fn build<I>(&mut self, spheres: I)
    where
        I: IntoIterator<Item = (K, Vec3, f32)>,
    {
        self.leaves.clear();
        let items: Vec<Item<K>> = spheres
            .into_iter()
            .map(|(key, center, radius)| Item {
                key,
                center,
                radius: radius.abs(),
            })
            .collect();
        if items.is_empty() {
            return;
        }

        let mut work = vec![items];
        while let Some(mut group) = work.pop() {
            if group.len() <= self.leaf_capacity {
                self.leaves.push(Self::make_leaf(group));
                continue;
            }
            let axis = Self::split_axis(&group);
            group.sort_by(|a, b| {
                a.center
                    .get(axis)
                    .total_cmp(&b.center.get(axis))
                    .then_with(|| a.key.cmp(&b.key))
            });
            let upper = group.split_off(group.len() / 2);
            // Upper half is pushed first so buckets come out in ascending order along each split.
            work.push(upper);
            work.push(group);
        }
    }

    /// Leaf buckets from the last build.
    #[must_use]
    pub fn leaves(&self) -> &[BvhLeaf<K>] {
        &self.leaves
    }

    fn split_axis(group: &[Item<K>]) -> usize {
        let (first, rest) = match group.split_first() {
            Some(split) => split,
            None => return 0,
        };
        let spread = rest
            .iter()
            .fold(Aabb::from_corners(first.center, first.center), |acc, item| {
                acc.union(&Aabb::from_corners(item.center, item.center))
            });
        spread.extents().max_axis()
    }

    fn make_leaf(group: Vec<Item<K>>) -> BvhLeaf<K> {
        let bounds = group
            .iter()
            .map(Item::bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();
        let mut members: Vec<K> = group.into_iter().map(|item| item.key).collect();
        members.sort_unstable();
        BvhLeaf { members, bounds }
    }
}
