// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters to integrate with other Understory crates.
//!
//! ## Available Adapters
//!
//! - [`node_store`] (`node_store_adapter` feature): filter the visible rows of
//!   an [`understory_tree_select::NodeStore`].

#[cfg(feature = "node_store_adapter")]
pub mod node_store;
