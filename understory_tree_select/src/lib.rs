// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tree Select: include flags and selections that stay consistent over a tree.
//!
//! This crate is the state core behind tree views with a checkbox column or
//! multi-row selection over a parent-linked catalog (for example a hierarchy of
//! fields). It keeps one rule true while the user toggles individual rows:
//!
//! - a node that is included has all of its ancestors included,
//! - including a node includes its whole subtree,
//! - excluding a node excludes its whole subtree, and excludes each ancestor
//!   left without an included child.
//!
//! The pieces:
//!
//! - [`NodeStore`]: canonical nodes addressed by id, with parent links resolved
//!   through the id index, plus the ordered list of visible rows.
//! - [`propagate_check`] and [`CheckHandler`]: the checkbox variant over each
//!   node's tri-state `included` flag. The handler asks its [`RowSurface`] to
//!   refresh all rows afterwards.
//! - [`SelectionMirror`]: the multi-select variant over a set of selected ids
//!   held by a [`SelectionSurface`], guarded against its own echo events.
//!
//! Filtering the visible rows lives in `understory_item_filter`, which can
//! drive a [`NodeStore`] directly.
//!
//! ## Example
//!
//! ```rust
//! use understory_tree_select::{CheckHandler, NodeStore, RowSurface};
//!
//! #[derive(Default)]
//! struct Rows {
//!     redraws: u32,
//! }
//!
//! impl RowSurface for Rows {
//!     fn refresh_all(&mut self) {
//!         self.redraws += 1;
//!     }
//! }
//!
//! // Root(A(B, C), D)
//! let mut store = NodeStore::<&str>::new();
//! store.insert("root", None, ()).unwrap();
//! store.insert("a", Some("root"), ()).unwrap();
//! store.insert("b", Some("a"), ()).unwrap();
//! store.insert("c", Some("a"), ()).unwrap();
//! store.insert("d", Some("root"), ()).unwrap();
//!
//! let mut handler = CheckHandler::new(Rows::default());
//! handler.on_flag_change(&mut store, "b", true);
//! handler.on_flag_change(&mut store, "c", true);
//! handler.on_flag_change(&mut store, "b", false);
//!
//! // `c` keeps `a` (and the root) included.
//! assert!(store.is_included("a"));
//! assert!(!store.is_included("b"));
//! assert!(!store.is_included("d"));
//!
//! handler.on_flag_change(&mut store, "c", false);
//! assert!(!store.is_included("root"));
//! assert_eq!(handler.surface().redraws, 4);
//! ```
//!
//! Everything here is synchronous and single-threaded; the engine never
//! allocates nodes or removes them, it only rewrites flags and selections.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod check;
mod error;
mod selection;
mod store;
mod surface;
mod types;

pub use check::{Change, CheckHandler, Propagation, Via, propagate_check};
pub use error::StoreError;
pub use selection::{Origin, SelectionDelta, SelectionMirror, SelectionOutcome};
pub use store::{Ancestors, Descendants, NodeStore};
pub use surface::{RowSurface, SelectionSurface};
pub use types::{Invalidation, Node};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Full binary tree of the given depth, ids in breadth-first order from 1.
    fn binary_tree(depth: u32) -> NodeStore<u32> {
        let mut store = NodeStore::new();
        let count = (1_u32 << depth) - 1;
        for id in 1..=count {
            let parent = (id > 1).then_some(id / 2);
            store.insert(id, parent, ()).unwrap();
        }
        store
    }

    #[test]
    fn check_reaches_every_descendant_and_ancestor() {
        let mut store = binary_tree(5);
        propagate_check(&mut store, 2, true);
        let subtree: Vec<u32> = store.descendants(2).collect();
        assert_eq!(subtree.len(), 14);
        assert!(subtree.iter().all(|&id| store.is_included(id)));
        assert!(store.is_included(1));
        assert!(store.descendants(3).all(|id| !store.is_included(id)));
        assert!(store.ancestors_consistent());
    }

    #[test]
    fn random_walk_keeps_ancestors_consistent() {
        let mut store = binary_tree(6);
        // Deterministic LCG so the sequence is reproducible.
        let mut state = 0x2545_f491_u32;
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = 1 + (state >> 8) % 63;
            let value = state & 0x10 != 0;
            propagate_check(&mut store, id, value);
            assert!(store.ancestors_consistent(), "after toggling {id} to {value}");
            if value {
                assert!(store.descendants(id).all(|d| store.is_included(d)));
            } else {
                assert!(store.descendants(id).all(|d| store.included(d) == Some(false)));
            }
        }
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let mut store = NodeStore::<u32>::new();
        store.insert(0, None, ()).unwrap();
        for id in 1..20_000 {
            store.insert(id, Some(id - 1), ()).unwrap();
        }
        assert_eq!(store.ancestors(19_999).count(), 19_999);
        let p = propagate_check(&mut store, 0, true);
        assert_eq!(p.changes.len(), 20_000);
        let p = propagate_check(&mut store, 19_999, false);
        assert_eq!(p.changes.len(), 20_000, "whole chain clears from the leaf");
    }
}
