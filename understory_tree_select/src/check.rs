// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Include-flag propagation: the checkbox variant of tree selection.
//!
//! Rules applied by [`propagate_check`]:
//!
//! - Checking a node checks its whole subtree and every unchecked ancestor.
//! - Unchecking a node unchecks its whole subtree. Each ancestor is then
//!   unchecked only while none of its direct children is still checked.
//!
//! After every call, each node flagged `Some(true)` has all of its resolved
//! ancestors flagged `Some(true)`.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use tracing::debug;

use crate::store::NodeStore;
use crate::surface::RowSurface;
use crate::types::Invalidation;

/// Why a node's flag changed during a propagation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Via {
    /// The node the caller toggled.
    Origin,
    /// Reached walking down from the origin.
    Descendant,
    /// Reached walking up from the origin.
    Ancestor,
}

/// A single flag change made by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Change<K> {
    /// The node whose flag changed.
    pub id: K,
    /// Its new flag.
    pub included: bool,
    /// Which pass changed it.
    pub via: Via,
}

/// Everything one call to [`propagate_check`] did.
#[derive(Clone, Debug)]
pub struct Propagation<K> {
    /// Flag changes in the order they were made.
    pub changes: Vec<Change<K>>,
    /// What the presentation surface must redraw.
    pub invalidation: Invalidation,
}

impl<K> Default for Propagation<K> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
            invalidation: Invalidation::empty(),
        }
    }
}

impl<K: Copy> Propagation<K> {
    /// Returns true if no flag changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Ids of the changed nodes, in change order.
    pub fn changed_ids(&self) -> impl Iterator<Item = K> + '_ {
        self.changes.iter().map(|c| c.id)
    }

    fn push(&mut self, id: K, included: bool, via: Via) {
        self.changes.push(Change { id, included, via });
    }
}

/// Set the include flag of `id` to `value` and restore tree consistency.
///
/// The whole subtree of `id` is visited. Unknown ids change nothing and
/// report no invalidation. Parent ids that do not resolve end the upward walk
/// as if the node were a root.
///
/// ```rust
/// use understory_tree_select::{NodeStore, propagate_check};
///
/// let mut store = NodeStore::<u32>::new();
/// store.insert(0, None, ()).unwrap();
/// store.insert(1, Some(0), ()).unwrap();
/// store.insert(2, Some(1), ()).unwrap();
///
/// let p = propagate_check(&mut store, 1, true);
/// assert_eq!(p.changes.len(), 3);
/// assert!(store.is_included(0) && store.is_included(2));
/// ```
pub fn propagate_check<K, D>(store: &mut NodeStore<K, D>, id: K, value: bool) -> Propagation<K>
where
    K: Copy + Eq + Hash + Debug,
{
    let mut out = Propagation::default();
    let Some(previous) = store.get(id).map(|n| n.included) else {
        debug!(?id, "include change for unknown node ignored");
        return out;
    };

    if previous != Some(value) {
        store.set_flag(id, Some(value));
        out.push(id, value, Via::Origin);
    }
    propagate_down(store, id, value, &mut out);
    if value {
        propagate_up_check(store, id, &mut out);
    } else {
        propagate_up_uncheck(store, id, &mut out);
    }
    out.invalidation = Invalidation::ALL_ROWS;

    debug!(?id, value, changed = out.changes.len(), "propagated include flag");
    out
}

fn propagate_down<K, D>(store: &mut NodeStore<K, D>, id: K, value: bool, out: &mut Propagation<K>)
where
    K: Copy + Eq + Hash + Debug,
{
    let mut stack: Vec<K> = store.children_of(id).iter().rev().copied().collect();
    // No short-circuit on equal children: an upward check can leave a checked
    // node with unchecked children below it.
    while let Some(child) = stack.pop() {
        if store.included(child) != Some(value) {
            store.set_flag(child, Some(value));
            out.push(child, value, Via::Descendant);
        }
        stack.extend(store.children_of(child).iter().rev().copied());
    }
}

fn propagate_up_check<K, D>(store: &mut NodeStore<K, D>, id: K, out: &mut Propagation<K>)
where
    K: Copy + Eq + Hash + Debug,
{
    let mut current = id;
    while let Some(parent) = store.resolve_parent(current) {
        if store.is_included(parent) {
            break;
        }
        store.set_flag(parent, Some(true));
        out.push(parent, true, Via::Ancestor);
        current = parent;
    }
}

fn propagate_up_uncheck<K, D>(store: &mut NodeStore<K, D>, id: K, out: &mut Propagation<K>)
where
    K: Copy + Eq + Hash + Debug,
{
    let mut current = id;
    while let Some(parent) = store.resolve_parent(current) {
        if !store.is_included(parent) {
            break;
        }
        let has_checked_child = store
            .children_of(parent)
            .iter()
            .any(|&c| store.is_included(c));
        if has_checked_child {
            break;
        }
        store.set_flag(parent, Some(false));
        out.push(parent, false, Via::Ancestor);
        current = parent;
    }
}

/// Binds the propagation engine to a [`RowSurface`].
///
/// This is the entry point a checkbox column calls when the user toggles a
/// row. Every call that reaches a loaded node ends with
/// [`RowSurface::refresh_all`].
#[derive(Debug, Default)]
pub struct CheckHandler<S> {
    surface: S,
}

impl<S: RowSurface> CheckHandler<S> {
    /// Create a handler that refreshes `surface`.
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    /// The wrapped surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The wrapped surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Unwrap the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Apply a user toggle of `id` to `value`, propagate, and refresh rows.
    pub fn on_flag_change<K, D>(
        &mut self,
        store: &mut NodeStore<K, D>,
        id: K,
        value: bool,
    ) -> Propagation<K>
    where
        K: Copy + Eq + Hash + Debug,
    {
        let propagation = propagate_check(store, id, value);
        if propagation.invalidation.contains(Invalidation::ALL_ROWS) {
            self.surface.refresh_all();
        }
        propagation
    }
}
