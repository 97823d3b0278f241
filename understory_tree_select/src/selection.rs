// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection mirroring: the multi-select variant of tree selection.
//!
//! When rows are (de)selected in a multi-select tree view, [`SelectionMirror`]
//! applies the same rules as the checkbox engine to the selection set:
//!
//! - Selecting a node selects its whole subtree and every unselected ancestor.
//! - Deselecting a node deselects its whole subtree, then deselects each
//!   ancestor whose direct children are all deselected.
//!
//! The mirror writes the result back through
//! [`SelectionSurface::set_selection`], which typically fires another
//! selection event. That event is recognized and ignored, either through its
//! [`Origin`] or because the mirror is still busy with the call that caused it.

use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::store::NodeStore;
use crate::surface::SelectionSurface;
use crate::types::Invalidation;

/// Who caused a selection change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The user clicked or used the keyboard.
    User,
    /// Code assigned the selection.
    Programmatic,
}

/// A batch of selection changes reported by the view.
///
/// Both sets may be non-empty when the view reports a compound change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionDelta<K> {
    /// Ids that became selected.
    pub added: Vec<K>,
    /// Ids that became deselected.
    pub removed: Vec<K>,
    /// Source of the change.
    pub origin: Origin,
}

impl<K> SelectionDelta<K> {
    /// A user-originated delta.
    pub fn user(added: Vec<K>, removed: Vec<K>) -> Self {
        Self {
            added,
            removed,
            origin: Origin::User,
        }
    }

    /// A delta caused by a programmatic assignment.
    pub fn programmatic(added: Vec<K>, removed: Vec<K>) -> Self {
        Self {
            added,
            removed,
            origin: Origin::Programmatic,
        }
    }
}

/// Result of [`SelectionMirror::on_selection_delta`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SelectionOutcome {
    /// The event was programmatic or arrived while the mirror was busy.
    Ignored,
    /// Propagation added or removed nothing; the surface was not touched.
    Unchanged,
    /// The surface selection was replaced.
    Updated,
}

impl SelectionOutcome {
    /// What the surface has to redraw for this outcome.
    pub fn invalidation(self) -> Invalidation {
        match self {
            Self::Updated => Invalidation::SELECTION,
            Self::Ignored | Self::Unchanged => Invalidation::empty(),
        }
    }
}

/// Keeps a multi-select selection closed over the tree.
///
/// The mirror itself only holds its in-progress guard, so one mirror can
/// serve a view for its whole lifetime and is shared by reference with
/// surfaces that call back into it.
///
/// ## Example
///
/// ```rust
/// use hashbrown::HashSet;
/// use understory_tree_select::{
///     NodeStore, SelectionDelta, SelectionMirror, SelectionOutcome, SelectionSurface,
/// };
///
/// struct Grid(HashSet<u32>);
///
/// impl SelectionSurface<u32> for Grid {
///     fn selection(&self) -> &HashSet<u32> {
///         &self.0
///     }
///     fn set_selection(&mut self, selection: HashSet<u32>) {
///         self.0 = selection;
///     }
/// }
///
/// let mut store = NodeStore::<u32>::new();
/// store.insert(0, None, ()).unwrap();
/// store.insert(1, Some(0), ()).unwrap();
/// store.insert(2, Some(1), ()).unwrap();
///
/// // The user selected row 1.
/// let mut grid = Grid(HashSet::from_iter([1]));
/// let mirror = SelectionMirror::new();
/// let outcome = mirror.on_selection_delta(&store, &mut grid, &SelectionDelta::user(vec![1], vec![]));
///
/// assert_eq!(outcome, SelectionOutcome::Updated);
/// assert_eq!(grid.0, HashSet::from_iter([0, 1, 2]));
/// ```
#[derive(Debug, Default)]
pub struct SelectionMirror {
    busy: Cell<bool>,
}

/// Clears the busy flag on every exit path, unwinding included.
struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SelectionMirror {
    /// Create an idle mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a propagation is being applied.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    fn enter(&self) -> BusyGuard<'_> {
        self.busy.set(true);
        BusyGuard(&self.busy)
    }

    /// Propagate a user selection change through the tree.
    ///
    /// Works on a copy of the surface selection (which already reflects
    /// `delta`): added ids pull in their subtree and ancestors, then removed
    /// ids drop their subtree and any ancestor left without a selected child.
    /// The copy is written back only if it differs. Ids that are not in
    /// `store` are not propagated.
    pub fn on_selection_delta<K, D, S>(
        &self,
        store: &NodeStore<K, D>,
        surface: &mut S,
        delta: &SelectionDelta<K>,
    ) -> SelectionOutcome
    where
        K: Copy + Eq + Hash + Debug,
        S: SelectionSurface<K> + ?Sized,
    {
        if self.is_busy() {
            trace!("selection event during propagation ignored");
            return SelectionOutcome::Ignored;
        }
        if delta.origin == Origin::Programmatic {
            trace!("programmatic selection event ignored");
            return SelectionOutcome::Ignored;
        }
        let _guard = self.enter();

        let mut working = surface.selection().clone();
        let mut changed = false;
        for &id in delta.added.iter().filter(|&&id| store.contains(id)) {
            changed |= select_descendants(store, id, &mut working);
            changed |= select_ancestors(store, id, &mut working);
        }
        for &id in delta.removed.iter().filter(|&&id| store.contains(id)) {
            changed |= deselect_descendants(store, id, &mut working);
            changed |= deselect_ancestors(store, id, &mut working);
        }

        if !changed {
            return SelectionOutcome::Unchanged;
        }
        debug!(
            added = delta.added.len(),
            removed = delta.removed.len(),
            selected = working.len(),
            "propagated selection"
        );
        surface.set_selection(working);
        SelectionOutcome::Updated
    }
}

fn select_descendants<K, D>(store: &NodeStore<K, D>, id: K, selection: &mut HashSet<K>) -> bool
where
    K: Copy + Eq + Hash + Debug,
{
    let mut changed = false;
    for d in store.descendants(id) {
        changed |= selection.insert(d);
    }
    changed
}

fn select_ancestors<K, D>(store: &NodeStore<K, D>, id: K, selection: &mut HashSet<K>) -> bool
where
    K: Copy + Eq + Hash + Debug,
{
    let mut changed = false;
    for a in store.ancestors(id) {
        if !selection.insert(a) {
            break;
        }
        changed = true;
    }
    changed
}

fn deselect_descendants<K, D>(store: &NodeStore<K, D>, id: K, selection: &mut HashSet<K>) -> bool
where
    K: Copy + Eq + Hash + Debug,
{
    let mut changed = false;
    for d in store.descendants(id) {
        changed |= selection.remove(&d);
    }
    changed
}

fn deselect_ancestors<K, D>(store: &NodeStore<K, D>, id: K, selection: &mut HashSet<K>) -> bool
where
    K: Copy + Eq + Hash + Debug,
{
    let mut changed = false;
    for a in store.ancestors(id) {
        if !selection.contains(&a) {
            break;
        }
        if store.children_of(a).iter().any(|c| selection.contains(c)) {
            break;
        }
        selection.remove(&a);
        changed = true;
    }
    changed
}
