// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits for the presentation surface the engine talks back to.

use hashbrown::HashSet;

/// A tree-aware row view that caches rendering per row.
pub trait RowSurface {
    /// Invalidate every cached row; called after a propagation that may have
    /// touched an unbounded set of rows.
    fn refresh_all(&mut self);
}

impl<S: RowSurface + ?Sized> RowSurface for &mut S {
    fn refresh_all(&mut self) {
        (**self).refresh_all();
    }
}

/// The multi-select API of a tree view.
///
/// [`SelectionSurface::set_selection`] may synchronously emit a selection
/// event back into a [`SelectionMirror`](crate::SelectionMirror); the mirror
/// ignores such re-entrant calls.
pub trait SelectionSurface<K> {
    /// The authoritative selection, including the latest user change.
    fn selection(&self) -> &HashSet<K>;

    /// Replace the authoritative selection.
    fn set_selection(&mut self, selection: HashSet<K>);
}
