// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter for Understory Tree Select.
//!
//! ## Feature
//!
//! Enable with `node_store_adapter`.
//!
//! ## Notes
//!
//! A [`NodeStore`] exposes its visible rows as node ids, so the snapshot holds
//! ids and predicates look nodes up in the store. Flag changes made through
//! the propagation engine while filtering are picked up by
//! [`SnapshotFilter::refresh`](crate::SnapshotFilter::refresh). Tree traversal
//! in the store does not depend on the visible rows, so propagation keeps
//! reaching hidden nodes.
//!
//! Nodes loaded while a filter is active are appended to the filtered view
//! right away. The next [`SnapshotFilter::refresh`](crate::SnapshotFilter::refresh)
//! or [`SnapshotFilter::restore`](crate::SnapshotFilter::restore) adds them to
//! the snapshot, so the predicate decides whether they stay visible and
//! restore brings them back.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use understory_tree_select::NodeStore;

use crate::source::ItemSource;

impl<K, D> ItemSource for NodeStore<K, D>
where
    K: Copy + Eq + Hash + Debug,
{
    type Item = K;

    fn items(&self) -> &[K] {
        Self::items(self)
    }

    fn set_items(&mut self, items: Vec<K>) {
        Self::set_items(self, items);
    }

    fn loaded(&self) -> usize {
        self.len()
    }

    fn loaded_since(&self, mark: usize) -> Vec<K> {
        self.iter().skip(mark).map(|node| node.id()).collect()
    }
}

/// Predicate keeping rows whose include flag is `Some(true)`.
///
/// ```rust
/// use understory_item_filter::SnapshotFilter;
/// use understory_item_filter::adapters::node_store::only_included;
/// use understory_tree_select::{NodeStore, propagate_check};
///
/// let mut store = NodeStore::<u32>::new();
/// store.insert(1, None, ()).unwrap();
/// store.insert(2, Some(1), ()).unwrap();
/// store.insert(3, None, ()).unwrap();
/// propagate_check(&mut store, 2, true);
///
/// let mut filter = SnapshotFilter::new();
/// filter.filter(&mut store, only_included);
/// assert_eq!(store.items(), &[1, 2]);
/// ```
pub fn only_included<K, D>(store: &NodeStore<K, D>, id: &K) -> bool
where
    K: Copy + Eq + Hash + Debug,
{
    store.is_included(*id)
}
