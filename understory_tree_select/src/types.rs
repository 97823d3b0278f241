// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: nodes and invalidation flags.

/// A node of the catalog tree as held by a [`NodeStore`](crate::NodeStore).
///
/// Nodes refer to their parent by id only. The store resolves that id back to
/// its canonical node on every structural hop, so a parent that is not loaded
/// simply does not resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node<K, D = ()> {
    pub(crate) id: K,
    pub(crate) parent: Option<K>,
    pub(crate) included: Option<bool>,
    pub(crate) data: D,
}

impl<K: Copy, D> Node<K, D> {
    /// Identity of this node.
    pub fn id(&self) -> K {
        self.id
    }

    /// Raw parent id, whether or not it resolves in the store.
    pub fn parent(&self) -> Option<K> {
        self.parent
    }

    /// Tri-state include flag. `None` means the flag was never set.
    pub fn included(&self) -> Option<bool> {
        self.included
    }

    /// Host payload.
    pub fn data(&self) -> &D {
        &self.data
    }
}

bitflags::bitflags! {
    /// What a presentation surface has to redraw after an engine call.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Invalidation: u8 {
        /// Any row may have changed; drop all cached row rendering.
        const ALL_ROWS  = 0b0000_0001;
        /// The selection set was replaced.
        const SELECTION = 0b0000_0010;
    }
}
