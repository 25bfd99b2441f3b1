// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::GeomError;
use crate::types::aabb::Aabb;

/// Default fraction of a leaf's own extent added on each side.
pub const DEFAULT_SKIN_RATIO: f32 = 0.1;

const MIN_CAPACITY: usize = 16;
const FREE_HEIGHT: i32 = -1;

/// Index of a slot in the tree's node arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn from_index(index: usize) -> Result<Self, GeomError> {
        u32::try_from(index)
            .map(Self)
            .map_err(|_| GeomError::ArenaFull(index))
    }

    /// Raw arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena slot of a [`DynamicAabbTree`].
///
/// Leaves carry an object key and a fattened box; internal nodes carry the
/// exact union of their children's boxes. Free slots have height `-1` and
/// are chained through `next`.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<K> {
    aabb: Aabb,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    next: Option<NodeId>,
    height: i32,
    object: Option<K>,
}

impl<K> TreeNode<K> {
    fn free(next: Option<NodeId>) -> Self {
        Self {
            aabb: Aabb::default(),
            parent: None,
            left: None,
            right: None,
            next,
            height: FREE_HEIGHT,
            object: None,
        }
    }

    /// Bounding box (fattened for leaves).
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Left child, `None` for leaves.
    #[must_use]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child, `None` for leaves.
    #[must_use]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Height: `0` for leaves, `-1` for free slots.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Object key stored in a leaf.
    #[must_use]
    pub fn object(&self) -> Option<&K> {
        self.object.as_ref()
    }

    /// `true` for leaf nodes.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.height == 0
    }
}

/// Incremental AABB tree keyed by caller-chosen object keys.
///
/// - Insertion picks a sibling by the surface area heuristic and rebalances
///   with AVL-style rotations on the way back to the root, so sibling
///   heights never differ by more than one.
/// - Leaves store boxes fattened by `skin_ratio` of their own extent so small
///   motions do not force a reinsert.
/// - Nodes live in a growable arena addressed by [`NodeId`]; unused slots
///   form an intrusive free list.
#[derive(Debug, Clone)]
pub struct DynamicAabbTree<K> {
    nodes: Vec<TreeNode<K>>,
    root: Option<NodeId>,
    free: Option<NodeId>,
    node_count: usize,
    leaves: FxHashMap<K, NodeId>,
    skin_ratio: f32,
}

impl<K: Copy + Eq + Hash + Ord> Default for DynamicAabbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + Ord> DynamicAabbTree<K> {
    /// Creates an empty tree with [`DEFAULT_SKIN_RATIO`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_skin_ratio(DEFAULT_SKIN_RATIO)
    }

    /// Creates an empty tree whose leaves are fattened by `skin_ratio`.
    #[must_use]
    pub fn with_skin_ratio(skin_ratio: f32) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            free: None,
            node_count: 0,
            leaves: FxHashMap::default(),
            skin_ratio: skin_ratio.max(0.0),
        }
    }

    /// Fattening ratio applied to inserted boxes.
    #[must_use]
    pub fn skin_ratio(&self) -> f32 {
        self.skin_ratio
    }

    /// Number of stored objects.
    #[must_use]
    pub fn num_objects(&self) -> usize {
        self.leaves.len()
    }

    /// `true` when no object is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// `true` if `key` is stored.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.leaves.contains_key(key)
    }

    /// Height of the root; `0` for a single leaf or an empty tree.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.root.map_or(0, |r| self.nodes[r.index()].height)
    }

    /// Root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Arena slot count (live and free).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Fattened box stored for `key`.
    #[must_use]
    pub fn fat_aabb(&self, key: &K) -> Option<Aabb> {
        self.leaves.get(key).map(|id| self.nodes[id.index()].aabb)
    }

    /// Looks up a live node.
    ///
    /// # Errors
    /// Returns [`GeomError::InvalidNode`] for out-of-range or free slots.
    pub fn node(&self, id: NodeId) -> Result<&TreeNode<K>, GeomError> {
        self.nodes
            .get(id.index())
            .filter(|n| n.height != FREE_HEIGHT)
            .ok_or(GeomError::InvalidNode(id.0))
    }

    /// Iterates stored keys in arbitrary order.
    pub fn objects(&self) -> impl Iterator<Item = &K> + '_ {
        self.leaves.keys()
    }

    /// Drops every node and object. The arena's allocation is reused by
    /// later inserts.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.free = None;
        self.node_count = 0;
        self.leaves.clear();
    }

    /// Inserts `key` with tight bounds `aabb`; the stored box is fattened.
    ///
    /// # Errors
    /// Returns [`GeomError::DuplicateObject`] if `key` is already stored and
    /// [`GeomError::ArenaFull`] if the arena cannot address another node.
    pub fn insert_object(&mut self, key: K, aabb: Aabb) -> Result<NodeId, GeomError> {
        if self.leaves.contains_key(&key) {
            return Err(GeomError::DuplicateObject);
        }
        self.insert_new(key, aabb)
    }

    /// Removes `key` and its leaf.
    ///
    /// # Errors
    /// Returns [`GeomError::UnknownObject`] if `key` is not stored.
    pub fn remove_object(&mut self, key: &K) -> Result<(), GeomError> {
        let leaf = self.leaves.remove(key).ok_or(GeomError::UnknownObject)?;
        self.remove_leaf(leaf);
        self.free_node(leaf);
        Ok(())
    }

    /// Moves `key` to tight bounds `aabb`.
    ///
    /// The leaf is left in place while its fat box still contains `aabb`
    /// (returns `false`); otherwise it is reinserted with fresh fat bounds.
    ///
    /// # Errors
    /// Returns [`GeomError::UnknownObject`] if `key` is not stored.
    pub fn update_object(&mut self, key: &K, aabb: Aabb) -> Result<bool, GeomError> {
        let leaf = *self.leaves.get(key).ok_or(GeomError::UnknownObject)?;
        if self.nodes[leaf.index()].aabb.contains(&aabb) {
            return Ok(false);
        }
        self.reinsert(leaf, aabb)?;
        Ok(true)
    }

    /// Reinserts `key` with fresh fat bounds regardless of containment.
    ///
    /// # Errors
    /// Returns [`GeomError::UnknownObject`] if `key` is not stored.
    pub fn force_update_object(&mut self, key: &K, aabb: Aabb) -> Result<(), GeomError> {
        let leaf = *self.leaves.get(key).ok_or(GeomError::UnknownObject)?;
        self.reinsert(leaf, aabb)
    }

    /// Keys whose fat boxes overlap `aabb` (inclusive), skipping `exclude`.
    #[must_use]
    pub fn query(&self, aabb: &Aabb, exclude: Option<&K>) -> Vec<K> {
        let mut out = Vec::new();
        self.query_with(aabb, |key| {
            if exclude != Some(&key) {
                out.push(key);
            }
        });
        out
    }

    /// Calls `visit` for every key whose fat box overlaps `aabb`.
    pub fn query_with<F: FnMut(K)>(&self, aabb: &Aabb, mut visit: F) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = Vec::with_capacity(64);
        stack.push(root);
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            if let Some(key) = node.object {
                visit(key);
            } else {
                stack.extend(node.left);
                stack.extend(node.right);
            }
        }
    }

    /// Rebuilds the hierarchy bottom-up, greedily pairing the two subtrees
    /// whose merged box has the smallest surface area. Each new parent is
    /// rebalanced, so the result keeps the same height bound as incremental
    /// inserts.
    ///
    /// Quadratic in the object count per merge; meant for load time, not
    /// every frame.
    ///
    /// # Errors
    /// Returns [`GeomError::ArenaFull`] if a parent node cannot be addressed.
    pub fn rebuild(&mut self) -> Result<(), GeomError> {
        let mut pending: Vec<NodeId> = Vec::with_capacity(self.leaves.len());
        for i in 0..self.nodes.len() {
            let id = NodeId::from_index(i)?;
            let node = &self.nodes[i];
            if node.height == FREE_HEIGHT {
                continue;
            }
            if node.object.is_some() {
                self.nodes[i].parent = None;
                pending.push(id);
            } else {
                self.free_node(id);
            }
        }
        // Key order keeps the pairing independent of arena layout.
        pending.sort_by_key(|id| self.nodes[id.index()].object);

        while pending.len() > 1 {
            let mut best = (0, 1);
            let mut best_cost = f32::INFINITY;
            for i in 0..pending.len() {
                let ai = self.nodes[pending[i].index()].aabb;
                for j in (i + 1)..pending.len() {
                    let cost = ai.union(&self.nodes[pending[j].index()].aabb).surface_area();
                    if cost < best_cost {
                        best_cost = cost;
                        best = (i, j);
                    }
                }
            }
            let (i, j) = best;
            let left = pending[i];
            let right = pending[j];
            let parent = self.alloc_node()?;
            {
                let node = &mut self.nodes[parent.index()];
                node.left = Some(left);
                node.right = Some(right);
            }
            self.nodes[left.index()].parent = Some(parent);
            self.nodes[right.index()].parent = Some(parent);
            pending[i] = self.balance(parent);
            pending.swap_remove(j);
        }
        self.root = pending.first().copied();
        if let Some(root) = self.root {
            self.nodes[root.index()].parent = None;
        }
        Ok(())
    }

    /// Largest `|height(left) - height(right)|` over all internal nodes.
    #[must_use]
    pub fn max_balance(&self) -> i32 {
        let mut worst = 0;
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if let (Some(l), Some(r)) = (node.left, node.right) {
                let diff = (self.nodes[l.index()].height - self.nodes[r.index()].height).abs();
                worst = worst.max(diff);
                stack.push(l);
                stack.push(r);
            }
        }
        worst
    }

    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    /// Returns [`GeomError::Invariant`] describing the first violation found.
    pub fn validate(&self) -> Result<(), GeomError> {
        let fail = |msg: String| Err(GeomError::Invariant(msg));
        let mut reachable = 0usize;
        let mut leaf_count = 0usize;
        if let Some(root) = self.root {
            if self.nodes[root.index()].parent.is_some() {
                return fail(format!("root {} has a parent", root.0));
            }
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                reachable += 1;
                let node = &self.nodes[id.index()];
                match (node.left, node.right, node.object) {
                    (None, None, Some(key)) => {
                        leaf_count += 1;
                        if node.height != 0 {
                            return fail(format!("leaf {} has height {}", id.0, node.height));
                        }
                        if self.leaves.get(&key) != Some(&id) {
                            return fail(format!("leaf {} not indexed by its key", id.0));
                        }
                    }
                    (Some(l), Some(r), None) => {
                        let (ln, rn) = (&self.nodes[l.index()], &self.nodes[r.index()]);
                        if ln.parent != Some(id) || rn.parent != Some(id) {
                            return fail(format!("children of {} do not point back", id.0));
                        }
                        if node.height != 1 + ln.height.max(rn.height) {
                            return fail(format!("node {} height {} is stale", id.0, node.height));
                        }
                        if node.aabb != ln.aabb.union(&rn.aabb) {
                            return fail(format!("node {} box is not the union of its children", id.0));
                        }
                        stack.push(l);
                        stack.push(r);
                    }
                    _ => return fail(format!("node {} is neither leaf nor internal", id.0)),
                }
            }
        }
        if reachable != self.node_count {
            return fail(format!("{reachable} reachable nodes, {} allocated", self.node_count));
        }
        if leaf_count != self.leaves.len() {
            return fail(format!("{leaf_count} leaves for {} objects", self.leaves.len()));
        }
        let mut free_count = 0usize;
        let mut cursor = self.free;
        while let Some(id) = cursor {
            let node = &self.nodes[id.index()];
            if node.height != FREE_HEIGHT {
                return fail(format!("free list holds live node {}", id.0));
            }
            free_count += 1;
            if free_count > self.nodes.len() {
                return fail("free list cycles".to_owned());
            }
            cursor = node.next;
        }
        if free_count != self.nodes.len() - self.node_count {
            return fail(format!(
                "free list holds {free_count} slots, expected {}",
                self.nodes.len() - self.node_count
            ));
        }
        Ok(())
    }

    fn insert_new(&mut self, key: K, aabb: Aabb) -> Result<NodeId, GeomError> {
        let leaf = self.alloc_node()?;
        {
            let node = &mut self.nodes[leaf.index()];
            node.aabb = aabb.fattened(self.skin_ratio);
            node.object = Some(key);
            node.height = 0;
        }
        if let Err(err) = self.insert_leaf(leaf) {
            self.free_node(leaf);
            return Err(err);
        }
        self.leaves.insert(key, leaf);
        Ok(leaf)
    }

    fn reinsert(&mut self, leaf: NodeId, aabb: Aabb) -> Result<(), GeomError> {
        // Removal frees the old parent slot, so the insert below reuses it.
        self.remove_leaf(leaf);
        self.nodes[leaf.index()].aabb = aabb.fattened(self.skin_ratio);
        self.insert_leaf(leaf)
    }

    fn grow_to(&mut self, capacity: usize) -> Result<(), GeomError> {
        let start = self.nodes.len();
        let target = capacity.max(MIN_CAPACITY);
        if target <= start {
            return Ok(());
        }
        // Every new slot must be addressable before any is pushed.
        NodeId::from_index(target - 1)?;
        // Chain new slots in index order ahead of the existing free list.
        let old_free = self.free;
        for i in start..target {
            let next = if i + 1 < target {
                Some(NodeId::from_index(i + 1)?)
            } else {
                old_free
            };
            self.nodes.push(TreeNode::free(next));
        }
        self.free = Some(NodeId::from_index(start)?);
        Ok(())
    }

    fn alloc_node(&mut self) -> Result<NodeId, GeomError> {
        if self.free.is_none() {
            self.grow_to(self.nodes.len().saturating_mul(2))?;
        }
        let id = self.free.ok_or(GeomError::ArenaFull(self.nodes.len()))?;
        let node = &mut self.nodes[id.index()];
        self.free = node.next;
        *node = TreeNode::free(None);
        node.height = 0;
        self.node_count += 1;
        Ok(id)
    }

    fn free_node(&mut self, id: NodeId) {
        self.nodes[id.index()] = TreeNode::free(self.free);
        self.free = Some(id);
        self.node_count -= 1;
    }

    fn insert_leaf(&mut self, leaf: NodeId) -> Result<(), GeomError> {
        let Some(root) = self.root else {
            self.root = Some(leaf);
            self.nodes[leaf.index()].parent = None;
            return Ok(());
        };

        let leaf_aabb = self.nodes[leaf.index()].aabb;
        let mut sibling = root;
        loop {
            let node = &self.nodes[sibling.index()];
            let (Some(left), Some(right)) = (node.left, node.right) else {
                break;
            };
            let area = node.aabb.surface_area();
            let combined_area = node.aabb.union(&leaf_aabb).surface_area();

            // Cost of pairing the leaf with this node, and the cost pushed down
            // onto every ancestor if we descend further instead.
            let cost = 2.0 * combined_area;
            let inheritance = 2.0 * (combined_area - area);
            let cost_left = self.descend_cost(left, &leaf_aabb, inheritance);
            let cost_right = self.descend_cost(right, &leaf_aabb, inheritance);

            if cost < cost_left && cost < cost_right {
                break;
            }
            sibling = if cost_left < cost_right { left } else { right };
        }

        let old_parent = self.nodes[sibling.index()].parent;
        let new_parent = self.alloc_node()?;
        {
            let sibling_node = &self.nodes[sibling.index()];
            let aabb = sibling_node.aabb.union(&leaf_aabb);
            let height = sibling_node.height + 1;
            let node = &mut self.nodes[new_parent.index()];
            node.parent = old_parent;
            node.aabb = aabb;
            node.height = height;
            node.left = Some(sibling);
            node.right = Some(leaf);
        }
        match old_parent {
            Some(p) => self.replace_child(p, sibling, new_parent),
            None => self.root = Some(new_parent),
        }
        self.nodes[sibling.index()].parent = Some(new_parent);
        self.nodes[leaf.index()].parent = Some(new_parent);

        self.fix_upwards(Some(new_parent));
        Ok(())
    }

    fn descend_cost(&self, child: NodeId, leaf_aabb: &Aabb, inheritance: f32) -> f32 {
        let node = &self.nodes[child.index()];
        let union_area = node.aabb.union(leaf_aabb).surface_area();
        if node.is_leaf() {
            union_area + inheritance
        } else {
            union_area - node.aabb.surface_area() + inheritance
        }
    }

    fn remove_leaf(&mut self, leaf: NodeId) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }
        let Some(parent) = self.nodes[leaf.index()].parent else {
            return;
        };
        let parent_node = &self.nodes[parent.index()];
        let grand_parent = parent_node.parent;
        let sibling = if parent_node.left == Some(leaf) {
            parent_node.right
        } else {
            parent_node.left
        };
        let Some(sibling) = sibling else {
            return;
        };

        match grand_parent {
            Some(g) => {
                self.replace_child(g, parent, sibling);
                self.nodes[sibling.index()].parent = Some(g);
                self.free_node(parent);
                self.fix_upwards(Some(g));
            }
            None => {
                self.root = Some(sibling);
                self.nodes[sibling.index()].parent = None;
                self.free_node(parent);
            }
        }
        self.nodes[leaf.index()].parent = None;
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let node = &mut self.nodes[parent.index()];
        if node.left == Some(old) {
            node.left = Some(new);
        } else {
            node.right = Some(new);
        }
    }

    fn fix_upwards(&mut self, start: Option<NodeId>) {
        let mut cursor = start;
        while let Some(id) = cursor {
            let id = self.balance(id);
            cursor = self.nodes[id.index()].parent;
        }
    }

    fn refit(&mut self, id: NodeId) {
        let node = &self.nodes[id.index()];
        let (Some(l), Some(r)) = (node.left, node.right) else {
            return;
        };
        let (ln, rn) = (&self.nodes[l.index()], &self.nodes[r.index()]);
        let aabb = ln.aabb.union(&rn.aabb);
        let height = 1 + ln.height.max(rn.height);
        let node = &mut self.nodes[id.index()];
        node.aabb = aabb;
        node.height = height;
    }

    /// Rotates `a` until its children's heights differ by at most one and
    /// refits it. Both children must already be balanced; their heights may
    /// differ by any amount. Returns the root of the (possibly new) subtree.
    fn balance(&mut self, a: NodeId) -> NodeId {
        let node = &self.nodes[a.index()];
        let (Some(b), Some(c)) = (node.left, node.right) else {
            return a;
        };
        let skew = self.nodes[c.index()].height - self.nodes[b.index()].height;
        let top = if skew > 1 {
            self.rotate_up(a, c, b, Side::Right)
        } else if skew < -1 {
            self.rotate_up(a, b, c, Side::Left)
        } else {
            a
        };
        self.refit(top);
        top
    }

    /// Promotes `pivot` (the `side` child of `a`) above `a`. `other` is
    /// the remaining child of `a`.
    ///
    /// `a` is left holding `other` and the pivot's shorter child. Those two
    /// can still differ by more than one, so `a` is balanced again before the
    /// pivot is refit.
    fn rotate_up(&mut self, a: NodeId, pivot: NodeId, other: NodeId, side: Side) -> NodeId {
        let pivot_node = &self.nodes[pivot.index()];
        let (Some(f), Some(g)) = (pivot_node.left, pivot_node.right) else {
            return a;
        };
        trace!(node = a.0, pivot = pivot.0, ?side, "tree rotation");

        let a_parent = self.nodes[a.index()].parent;
        self.nodes[pivot.index()].left = Some(a);
        self.nodes[pivot.index()].parent = a_parent;
        self.nodes[a.index()].parent = Some(pivot);
        match a_parent {
            Some(p) => self.replace_child(p, a, pivot),
            None => self.root = Some(pivot),
        }

        // The taller grandchild stays with the pivot, the shorter moves to `a`.
        let (keep, give) = if self.nodes[f.index()].height > self.nodes[g.index()].height {
            (f, g)
        } else {
            (g, f)
        };
        self.nodes[pivot.index()].right = Some(keep);
        match side {
            Side::Right => {
                self.nodes[a.index()].left = Some(other);
                self.nodes[a.index()].right = Some(give);
            }
            Side::Left => {
                self.nodes[a.index()].left = Some(give);
                self.nodes[a.index()].right = Some(other);
            }
        }
        self.nodes[give.index()].parent = Some(a);
        self.nodes[keep.index()].parent = Some(pivot);
        self.balance(a);
        self.refit(pivot);
        pivot
    }
}

#[derive(Debug, Copy, Clone)]
enum Side {
    Left,
    Right,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn cube(x: f32, y: f32, z: f32, h: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(x, y, z), Vec3::splat(h))
    }

    #[test]
    fn free_list_recycles_slots() {
        let mut tree = DynamicAabbTree::new();
        tree.insert_object(1u32, cube(0.0, 0.0, 0.0, 1.0)).unwrap();
        tree.insert_object(2u32, cube(5.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(tree.capacity(), MIN_CAPACITY);
        tree.remove_object(&1).unwrap();
        tree.insert_object(3u32, cube(-5.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(tree.capacity(), MIN_CAPACITY);
        tree.validate().unwrap();
    }

    #[test]
    fn arena_doubles_when_exhausted() {
        let mut tree = DynamicAabbTree::new();
        // n leaves need 2n - 1 nodes.
        for i in 0..9u32 {
            tree.insert_object(i, cube(i as f32 * 3.0, 0.0, 0.0, 1.0)).unwrap();
        }
        assert_eq!(tree.capacity(), 2 * MIN_CAPACITY);
        tree.validate().unwrap();
    }

    #[test]
    fn node_lookup_rejects_free_slots() {
        let mut tree = DynamicAabbTree::new();
        let id = tree.insert_object(7u32, cube(0.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(tree.node(id).unwrap().object(), Some(&7));
        tree.remove_object(&7).unwrap();
        assert_eq!(tree.node(id), Err(GeomError::InvalidNode(id.0)));
        assert!(tree.node(NodeId(10_000)).is_err());
    }

    #[test]
    fn duplicate_and_unknown_keys_are_errors() {
        let mut tree = DynamicAabbTree::new();
        tree.insert_object(1u32, cube(0.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(
            tree.insert_object(1u32, cube(0.0, 0.0, 0.0, 1.0)),
            Err(GeomError::DuplicateObject)
        );
        assert_eq!(tree.remove_object(&9), Err(GeomError::UnknownObject));
        assert_eq!(
            tree.update_object(&9, cube(0.0, 0.0, 0.0, 1.0)),
            Err(GeomError::UnknownObject)
        );
    }

    #[test]
    fn update_within_fat_box_keeps_leaf() {
        let mut tree = DynamicAabbTree::new();
        tree.insert_object(1u32, cube(0.0, 0.0, 0.0, 1.0)).unwrap();
        let fat = tree.fat_aabb(&1).unwrap();
        assert!(!tree.update_object(&1, cube(0.1, 0.0, 0.0, 1.0)).unwrap());
        assert_eq!(tree.fat_aabb(&1), Some(fat));
        assert!(tree.update_object(&1, cube(3.0, 0.0, 0.0, 1.0)).unwrap());
        assert_ne!(tree.fat_aabb(&1), Some(fat));
        tree.validate().unwrap();
    }

    #[test]
    fn sorted_line_insertions_stay_balanced() {
        let mut tree = DynamicAabbTree::new();
        for i in 0..64u32 {
            tree.insert_object(i, cube(i as f32 * 2.5, 0.0, 0.0, 1.0)).unwrap();
        }
        tree.validate().unwrap();
        // A degenerate list would be 63 high.
        assert!(tree.height() <= 12, "height {}", tree.height());
    }

    #[test]
    fn rebuild_keeps_objects_and_invariants() {
        let mut tree = DynamicAabbTree::new();
        for i in 0..20u32 {
            let f = i as f32;
            tree.insert_object(i, cube(f * 1.5, (f * 0.7).sin() * 4.0, 0.0, 0.5)).unwrap();
        }
        tree.rebuild().unwrap();
        tree.validate().unwrap();
        assert!(tree.max_balance() <= 1, "balance {}", tree.max_balance());
        assert_eq!(tree.num_objects(), 20);
        let hits = tree.query(&cube(0.0, 0.0, 0.0, 0.1), None);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn rebuild_with_far_outlier_stays_balanced() {
        let mut tree = DynamicAabbTree::new();
        for i in 0..8u32 {
            tree.insert_object(i, cube(i as f32 * 1.1, 0.0, 0.0, 0.5)).unwrap();
        }
        tree.insert_object(8u32, cube(1000.0, 0.0, 0.0, 0.5)).unwrap();
        tree.rebuild().unwrap();
        tree.validate().unwrap();
        assert!(tree.max_balance() <= 1, "balance {}", tree.max_balance());
        // Nine leaves fit in a height-4 tree.
        assert!(tree.height() <= 4, "height {}", tree.height());
        assert_eq!(tree.query(&cube(1000.0, 0.0, 0.0, 0.1), None), vec![8]);
    }

    #[test]
    fn outlier_inserted_after_a_cluster_is_rebalanced() {
        let mut tree = DynamicAabbTree::new();
        for i in 0..16u32 {
            tree.insert_object(i, cube((i % 4) as f32, (i / 4) as f32, 0.0, 0.4)).unwrap();
            assert!(tree.max_balance() <= 1);
        }
        tree.insert_object(99u32, cube(-500.0, 0.0, 0.0, 0.4)).unwrap();
        tree.validate().unwrap();
        assert!(tree.max_balance() <= 1, "balance {}", tree.max_balance());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn node_ids_past_u32_are_rejected() {
        assert_eq!(NodeId::from_index(7).unwrap().index(), 7);
        assert_eq!(NodeId::from_index(usize::MAX), Err(GeomError::ArenaFull(usize::MAX)));
    }

    #[test]
    fn clear_empties_tree() {
        let mut tree = DynamicAabbTree::new();
        tree.insert_object(1u32, cube(0.0, 0.0, 0.0, 1.0)).unwrap();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        tree.validate().unwrap();
        tree.insert_object(1u32, cube(0.0, 0.0, 0.0, 1.0)).unwrap();
        tree.validate().unwrap();
    }
}
