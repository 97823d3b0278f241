// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural errors reported by [`NodeStore`](crate::NodeStore).

use core::fmt::Debug;

/// Errors returned when loading or restructuring a [`NodeStore`](crate::NodeStore).
///
/// Propagation itself never fails; only edits to the tree shape are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError<K: Debug> {
    /// A node with this id is already loaded.
    #[error("node {id:?} is already in the store")]
    DuplicateId {
        /// The rejected id.
        id: K,
    },
    /// The id does not name a loaded node.
    #[error("node {id:?} is not in the store")]
    UnknownNode {
        /// The missing id.
        id: K,
    },
    /// Linking `id` under `parent` would make `id` its own ancestor.
    #[error("making {parent:?} the parent of {id:?} would create a cycle")]
    Cycle {
        /// The node being linked.
        id: K,
        /// The requested parent.
        parent: K,
    },
}
