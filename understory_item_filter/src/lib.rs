// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Item Filter: non-destructive in-memory filtering of item lists.
//!
//! List and tree views often need a quick "only show X" switch over data that
//! is already loaded, for state that only exists in memory (a transient flag,
//! a selection) and so cannot be pushed down to whatever loaded the rows. This
//! crate provides that switch:
//!
//! - [`ItemSource`]: an ordered list of visible item handles that can be
//!   replaced. Implemented for `Vec<T>`, and for
//!   `understory_tree_select::NodeStore` with the `node_store_adapter` feature.
//! - [`SnapshotFilter`]: snapshots the visible items on first use, publishes
//!   filtered views computed from that snapshot, re-applies its active
//!   predicate on [`SnapshotFilter::refresh`], and publishes the untouched
//!   snapshot on [`SnapshotFilter::restore`].
//!
//! ## Example
//!
//! ```rust
//! use understory_item_filter::SnapshotFilter;
//!
//! let mut rows = vec!["alpha", "beta", "gamma", "delta"];
//! let mut filter = SnapshotFilter::new();
//!
//! // "Only short names"
//! assert!(filter.toggle(&mut rows, |_, name| name.len() <= 4));
//! assert_eq!(rows, ["beta"]);
//!
//! // "Show all"
//! assert!(!filter.toggle(&mut rows, |_, _| true));
//! assert_eq!(rows, ["alpha", "beta", "gamma", "delta"]);
//! ```
//!
//! ## Features
//!
//! - `node_store_adapter`: enables [`adapters::node_store`] so a
//!   `NodeStore`'s visible rows can be filtered by node state.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "node_store_adapter")]
pub mod adapters;

mod filter;
mod source;

pub use filter::SnapshotFilter;
pub use source::ItemSource;
