// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node store: canonical nodes, id index, child index, and the visible rows.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::StoreError;
use crate::types::Node;

type Children<K> = SmallVec<[K; 4]>;

/// In-memory collection of tree nodes, addressable by id.
///
/// The store owns the canonical instance of every loaded node. Structure is
/// expressed through parent ids only: [`NodeStore::children_of`] and
/// [`NodeStore::resolve_parent`] always go through the id index, so a parent id
/// that names nothing loaded behaves like "no parent".
///
/// Besides the canonical nodes, the store keeps an ordered list of *visible
/// items* (ids). Loading appends to it; a filter may replace it with
/// [`NodeStore::set_items`]. Tree traversal never looks at the visible items.
///
/// Include flags can only be changed through the propagation engine
/// ([`propagate_check`](crate::propagate_check)) or [`NodeStore::normalize`].
///
/// ## Example
///
/// ```rust
/// use understory_tree_select::NodeStore;
///
/// let mut store = NodeStore::<u32>::new();
/// store.insert(1, None, ()).unwrap();
/// store.insert(2, Some(1), ()).unwrap();
/// // The parent of 3 is not loaded yet.
/// store.insert(3, Some(9), ()).unwrap();
///
/// assert_eq!(store.children_of(1), &[2]);
/// assert_eq!(store.resolve_parent(2), Some(1));
/// assert_eq!(store.resolve_parent(3), None);
/// assert_eq!(store.items(), &[1, 2, 3]);
/// ```
#[derive(Clone)]
pub struct NodeStore<K, D = ()> {
    /// canonical nodes, in load order
    nodes: Vec<Node<K, D>>,
    /// id -> slot in `nodes`
    index: HashMap<K, usize>,
    /// raw parent id -> children, so children loaded before their parent are
    /// found once it arrives
    children: HashMap<K, Children<K>>,
    items: Vec<K>,
}

impl<K: Debug, D> Debug for NodeStore<K, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeStore")
            .field("nodes", &self.nodes.len())
            .field("parents", &self.children.len())
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl<K, D> Default for NodeStore<K, D> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            children: HashMap::new(),
            items: Vec::new(),
        }
    }
}

impl<K, D> NodeStore<K, D>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            children: HashMap::new(),
            items: Vec::with_capacity(capacity),
        }
    }

    /// Load a node with an unset include flag.
    ///
    /// `parent` does not have to be loaded yet. The id is appended to the
    /// visible items.
    pub fn insert(&mut self, id: K, parent: Option<K>, data: D) -> Result<(), StoreError<K>> {
        self.insert_with_flag(id, parent, None, data)
    }

    /// Load a node with a seeded include flag.
    ///
    /// Seeded flags are taken as-is; call [`NodeStore::normalize`] once loading
    /// is done to make ancestors agree with them.
    pub fn insert_with_flag(
        &mut self,
        id: K,
        parent: Option<K>,
        included: Option<bool>,
        data: D,
    ) -> Result<(), StoreError<K>> {
        if self.index.contains_key(&id) {
            debug!(?id, "rejected duplicate node");
            return Err(StoreError::DuplicateId { id });
        }
        // A fresh id is nobody's ancestor unless a loaded node names it as
        // parent, so only then can the new link close a cycle.
        if let Some(p) = parent
            && (p == id || (self.children.contains_key(&id) && self.closes_cycle(id, p)))
        {
            debug!(?id, parent = ?p, "rejected cyclic parent link");
            return Err(StoreError::Cycle { id, parent: p });
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(Node {
            id,
            parent,
            included,
            data,
        });
        if let Some(p) = parent {
            self.children.entry(p).or_default().push(id);
        }
        self.items.push(id);
        Ok(())
    }

    /// Move `id` under `parent` (or make it a root with `None`).
    ///
    /// Include flags are left alone; a host that reparents flagged nodes
    /// should follow up with [`NodeStore::normalize`].
    pub fn set_parent(&mut self, id: K, parent: Option<K>) -> Result<(), StoreError<K>> {
        let Some(&slot) = self.index.get(&id) else {
            return Err(StoreError::UnknownNode { id });
        };
        let old = self.nodes[slot].parent;
        if old == parent {
            return Ok(());
        }
        if let Some(p) = parent
            && self.closes_cycle(id, p)
        {
            debug!(?id, parent = ?p, "rejected cyclic parent link");
            return Err(StoreError::Cycle { id, parent: p });
        }
        if let Some(o) = old
            && let Some(siblings) = self.children.get_mut(&o)
        {
            siblings.retain(|c| *c != id);
            if siblings.is_empty() {
                self.children.remove(&o);
            }
        }
        if let Some(p) = parent {
            self.children.entry(p).or_default().push(id);
        }
        self.nodes[slot].parent = parent;
        Ok(())
    }

    /// Whether linking `id` under `parent` would make `id` its own ancestor.
    ///
    /// Follows raw parent ids through loaded nodes; the existing links are
    /// acyclic, so the walk ends.
    fn closes_cycle(&self, id: K, parent: K) -> bool {
        let mut current = Some(parent);
        while let Some(c) = current {
            if c == id {
                return true;
            }
            current = self.get(c).and_then(|n| n.parent);
        }
        false
    }

    /// Number of loaded nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node is loaded.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `id` names a loaded node.
    pub fn contains(&self, id: K) -> bool {
        self.index.contains_key(&id)
    }

    /// The canonical node for `id`.
    pub fn get(&self, id: K) -> Option<&Node<K, D>> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Iterate canonical nodes in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<K, D>> + '_ {
        self.nodes.iter()
    }

    /// Include flag of `id`; `None` for unknown ids and unset flags alike.
    pub fn included(&self, id: K) -> Option<bool> {
        self.get(id).and_then(|n| n.included)
    }

    /// Returns true only if `id` is loaded and flagged `Some(true)`.
    pub fn is_included(&self, id: K) -> bool {
        self.included(id) == Some(true)
    }

    /// Host payload of `id`.
    pub fn data(&self, id: K) -> Option<&D> {
        self.get(id).map(|n| &n.data)
    }

    /// Mutable host payload of `id`.
    pub fn data_mut(&mut self, id: K) -> Option<&mut D> {
        let slot = *self.index.get(&id)?;
        Some(&mut self.nodes[slot].data)
    }

    /// Parent of `id`, only if it resolves to a loaded node.
    pub fn resolve_parent(&self, id: K) -> Option<K> {
        let parent = self.get(id)?.parent?;
        self.contains(parent).then_some(parent)
    }

    /// Children of `id` in load order; empty if `id` is not loaded.
    pub fn children_of(&self, id: K) -> &[K] {
        if !self.contains(id) {
            return &[];
        }
        self.children.get(&id).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Iterate the resolved ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: K) -> Ancestors<'_, K, D> {
        Ancestors {
            store: self,
            next: self.resolve_parent(id),
        }
    }

    /// Iterate the descendants of `id` depth-first, in load order among siblings.
    ///
    /// `id` itself is not yielded.
    pub fn descendants(&self, id: K) -> Descendants<'_, K, D> {
        let stack = self.children_of(id).iter().rev().copied().collect();
        Descendants { store: self, stack }
    }

    /// The ordered visible items.
    pub fn items(&self) -> &[K] {
        &self.items
    }

    /// Replace the visible items.
    ///
    /// This does not load or drop nodes; it only changes which ids a host
    /// presents and in what order.
    pub fn set_items(&mut self, items: Vec<K>) {
        self.items = items;
    }

    /// Returns true if every node flagged `Some(true)` has all of its resolved
    /// ancestors flagged `Some(true)` as well.
    pub fn ancestors_consistent(&self) -> bool {
        self.nodes
            .iter()
            .filter(|n| n.included == Some(true))
            .all(|n| self.ancestors(n.id).all(|a| self.is_included(a)))
    }

    /// Raise every ancestor of an included node to included.
    ///
    /// Meant for stores loaded with [`NodeStore::insert_with_flag`] or
    /// reshaped with [`NodeStore::set_parent`]. Returns the number of flags
    /// changed.
    pub fn normalize(&mut self) -> usize {
        let seeds: Vec<K> = self
            .nodes
            .iter()
            .filter(|n| n.included == Some(true))
            .map(|n| n.id)
            .collect();
        let mut changed = 0;
        for id in seeds {
            let mut current = id;
            while let Some(parent) = self.resolve_parent(current) {
                if self.is_included(parent) {
                    break;
                }
                self.set_flag(parent, Some(true));
                changed += 1;
                current = parent;
            }
        }
        if changed > 0 {
            debug!(changed, "normalized include flags");
        }
        changed
    }

    /// Overwrite the flag of a loaded node. Returns false for unknown ids.
    pub(crate) fn set_flag(&mut self, id: K, included: Option<bool>) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                self.nodes[slot].included = included;
                true
            }
            None => false,
        }
    }
}

/// Iterator over resolved ancestors, see [`NodeStore::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors<'a, K, D> {
    store: &'a NodeStore<K, D>,
    next: Option<K>,
}

impl<K, D> Iterator for Ancestors<'_, K, D>
where
    K: Copy + Eq + Hash + Debug,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.next?;
        self.next = self.store.resolve_parent(current);
        Some(current)
    }
}

/// Depth-first iterator over descendants, see [`NodeStore::descendants`].
#[derive(Clone, Debug)]
pub struct Descendants<'a, K, D> {
    store: &'a NodeStore<K, D>,
    stack: Vec<K>,
}

impl<K, D> Iterator for Descendants<'_, K, D>
where
    K: Copy + Eq + Hash + Debug,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.store.children_of(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// `Root(A(B, C), D)` with ids 0..=4.
    fn sample() -> NodeStore<u32, &'static str> {
        let mut store = NodeStore::new();
        store.insert(0, None, "root").unwrap();
        store.insert(1, Some(0), "a").unwrap();
        store.insert(2, Some(1), "b").unwrap();
        store.insert(3, Some(1), "c").unwrap();
        store.insert(4, Some(0), "d").unwrap();
        store
    }

    #[test]
    fn structure_queries() {
        let store = sample();
        assert_eq!(store.len(), 5);
        assert_eq!(store.children_of(0), &[1, 4]);
        assert_eq!(store.children_of(1), &[2, 3]);
        assert!(store.children_of(2).is_empty());
        assert_eq!(store.resolve_parent(3), Some(1));
        assert_eq!(store.resolve_parent(0), None);
        assert_eq!(store.data(4), Some(&"d"));
    }

    #[test]
    fn ancestors_and_descendants() {
        let store = sample();
        let up: Vec<_> = store.ancestors(3).collect();
        assert_eq!(up, vec![1, 0]);
        let down: Vec<_> = store.descendants(0).collect();
        assert_eq!(down, vec![1, 2, 3, 4], "pre-order, load order among siblings");
        assert_eq!(store.descendants(42).count(), 0);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut store = sample();
        assert_eq!(
            store.insert(2, None, "again"),
            Err(StoreError::DuplicateId { id: 2 })
        );
        assert_eq!(store.len(), 5);
        assert_eq!(store.data(2), Some(&"b"), "original node kept");
    }

    #[test]
    fn cycles_are_rejected() {
        let mut store = NodeStore::<u32>::new();
        assert_eq!(
            store.insert(1, Some(1), ()),
            Err(StoreError::Cycle { id: 1, parent: 1 })
        );
        // 2 waits for a parent that arrives later and points back at 2.
        store.insert(2, Some(3), ()).unwrap();
        assert_eq!(
            store.insert(3, Some(2), ()),
            Err(StoreError::Cycle { id: 3, parent: 2 })
        );

        let mut store = sample();
        assert_eq!(
            store.set_parent(1, Some(3)),
            Err(StoreError::Cycle { id: 1, parent: 3 })
        );
        assert_eq!(store.resolve_parent(1), Some(0), "failed reparent leaves links");
    }

    #[test]
    fn cycle_through_waiting_chain_is_rejected() {
        let mut store = NodeStore::<u32>::new();
        // 4 <- 5 <- 6 are loaded child-first; 4 then asks for 6 as parent.
        store.insert(6, Some(5), ()).unwrap();
        store.insert(5, Some(4), ()).unwrap();
        assert_eq!(
            store.insert(4, Some(6), ()),
            Err(StoreError::Cycle { id: 4, parent: 6 })
        );
        store.insert(4, Some(7), ()).unwrap();
        assert_eq!(store.ancestors(6).collect::<Vec<_>>(), vec![5, 4]);
        assert_eq!(store.items(), &[6, 5, 4]);
    }

    #[test]
    fn late_parent_resolves_once_loaded() {
        let mut store = NodeStore::<u32>::new();
        store.insert(2, Some(1), ()).unwrap();
        assert_eq!(store.resolve_parent(2), None);
        assert!(store.children_of(1).is_empty(), "unloaded node has no children");
        store.insert(1, None, ()).unwrap();
        assert_eq!(store.resolve_parent(2), Some(1));
        assert_eq!(store.children_of(1), &[2]);
    }

    #[test]
    fn reparent_updates_child_index() {
        let mut store = sample();
        store.set_parent(3, Some(4)).unwrap();
        assert_eq!(store.children_of(1), &[2]);
        assert_eq!(store.children_of(4), &[3]);
        store.set_parent(3, None).unwrap();
        assert!(store.children_of(4).is_empty());
        assert_eq!(store.resolve_parent(3), None);
        assert_eq!(
            store.set_parent(99, None),
            Err(StoreError::UnknownNode { id: 99 })
        );
    }

    #[test]
    fn visible_items_are_independent_of_structure() {
        let mut store = sample();
        store.set_items(vec![4, 2]);
        assert_eq!(store.items(), &[4, 2]);
        assert_eq!(store.children_of(1), &[2, 3], "hidden rows still count as children");
    }

    #[test]
    fn normalize_raises_ancestors_of_seeded_flags() {
        let mut store = NodeStore::<u32>::new();
        store.insert(0, None, ()).unwrap();
        store.insert(1, Some(0), ()).unwrap();
        store.insert_with_flag(2, Some(1), Some(true), ()).unwrap();
        store.insert_with_flag(3, Some(0), Some(false), ()).unwrap();
        assert!(!store.ancestors_consistent());

        assert_eq!(store.normalize(), 2);
        assert!(store.ancestors_consistent());
        assert_eq!(store.included(0), Some(true));
        assert_eq!(store.included(1), Some(true));
        assert_eq!(store.included(3), Some(false));
        assert_eq!(store.normalize(), 0, "already consistent");
    }
}
