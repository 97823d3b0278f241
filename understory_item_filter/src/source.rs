// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The item list a filter reads from and publishes to.

use alloc::vec::Vec;

/// An ordered list of visible items that can be replaced wholesale.
///
/// Items are cloned into the snapshot, so they should be cheap handles (ids,
/// `Rc`s, indices) whose underlying state stays reachable from the source.
/// That way edits made while filtered show up on [`SnapshotFilter::refresh`]
/// without taking a new snapshot.
///
/// [`SnapshotFilter::refresh`]: crate::SnapshotFilter::refresh
pub trait ItemSource {
    /// Handle of one visible item.
    type Item: Clone;

    /// The current visible items, in presentation order.
    fn items(&self) -> &[Self::Item];

    /// Replace the visible items.
    fn set_items(&mut self, items: Vec<Self::Item>);

    /// How many items have been loaded into the source over its lifetime.
    ///
    /// Sources that load rows on their own (appending to the visible items
    /// while a filter may be active) report a count that only grows, so a
    /// filter can pick up rows loaded after its snapshot through
    /// [`ItemSource::loaded_since`]. The default of 0 means the source never
    /// loads behind the filter's back.
    fn loaded(&self) -> usize {
        0
    }

    /// Items loaded after the first `mark` loads, in load order.
    fn loaded_since(&self, _mark: usize) -> Vec<Self::Item> {
        Vec::new()
    }
}

impl<T: Clone> ItemSource for Vec<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }

    fn set_items(&mut self, items: Vec<T>) {
        *self = items;
    }
}
