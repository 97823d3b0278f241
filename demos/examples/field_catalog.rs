// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A field catalog with a checkbox column, an "only included" switch, and
//! multi-row selection.
//!
//! This example shows how to combine:
//! - `understory_tree_select` for include-flag and selection propagation,
//! - `understory_item_filter` for the "only included" / "show all" switch.
//!
//! Run:
//! - `cargo run -p understory_demos --example field_catalog`
//! - `RUST_LOG=debug cargo run -p understory_demos --example field_catalog`

use hashbrown::HashSet;
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_item_filter::SnapshotFilter;
use understory_item_filter::adapters::node_store::only_included;
use understory_tree_select::{
    CheckHandler, NodeStore, RowSurface, SelectionDelta, SelectionMirror, SelectionSurface,
    StoreError,
};

/// Catalog payload carried by each node.
#[derive(Debug)]
struct Field {
    name: &'static str,
    description: &'static str,
}

/// Stand-in for a tree grid: counts redraws and holds the selection.
#[derive(Debug, Default)]
struct Grid {
    redraws: u32,
    selected: HashSet<u32>,
}

impl RowSurface for Grid {
    fn refresh_all(&mut self) {
        self.redraws += 1;
    }
}

impl SelectionSurface<u32> for Grid {
    fn selection(&self) -> &HashSet<u32> {
        &self.selected
    }

    fn set_selection(&mut self, selection: HashSet<u32>) {
        self.selected = selection;
    }
}

fn load() -> Result<NodeStore<u32, Field>, StoreError<u32>> {
    let rows: [(u32, Option<u32>, &str, &str); 8] = [
        (1, None, "customer", "Customer record"),
        (2, Some(1), "name", "Legal name"),
        (3, Some(1), "address", "Postal address"),
        (4, Some(3), "street", "Street and number"),
        (5, Some(3), "city", "City"),
        (6, Some(3), "zip", "Postal code"),
        (7, None, "order", "Order header"),
        (8, Some(7), "total", "Order total"),
    ];
    let mut store = NodeStore::with_capacity(rows.len());
    for (id, parent, name, description) in rows {
        store.insert(id, parent, Field { name, description })?;
    }
    Ok(store)
}

fn print_rows(title: &str, store: &NodeStore<u32, Field>) {
    println!("-- {title}");
    for &id in store.items() {
        let Some(field) = store.data(id) else {
            continue;
        };
        let depth = store.ancestors(id).count();
        let mark = match store.included(id) {
            Some(true) => "[x]",
            Some(false) => "[ ]",
            None => "[?]",
        };
        println!(
            "{:indent$}{mark} {} ({})",
            "",
            field.name,
            field.description,
            indent = depth * 2
        );
    }
}

fn main() -> Result<(), StoreError<u32>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut store = load()?;
    let mut handler = CheckHandler::new(Grid::default());
    let mut filter = SnapshotFilter::new();
    print_rows("loaded", &store);

    // Ticking "city" pulls in "address" and "customer".
    handler.on_flag_change(&mut store, 5, true);
    handler.on_flag_change(&mut store, 8, true);
    print_rows("after ticking city and total", &store);

    let filtered = filter.toggle(&mut store, only_included);
    info!(filtered, "toggled only-included");
    print_rows("only included", &store);

    // Unticking "city" empties "address", which is no longer included.
    handler.on_flag_change(&mut store, 5, false);
    if filter.is_filtered() {
        filter.refresh(&mut store);
    }
    print_rows("after unticking city", &store);

    let filtered = filter.toggle(&mut store, only_included);
    info!(filtered, "toggled only-included");
    print_rows("show all", &store);

    // Multi-select: the user clicks "address".
    let mirror = SelectionMirror::new();
    let grid = handler.surface_mut();
    grid.selected.insert(3);
    let outcome = mirror.on_selection_delta(&store, grid, &SelectionDelta::user(vec![3], vec![]));
    let mut selected: Vec<&str> = grid
        .selected
        .iter()
        .filter_map(|&id| store.data(id).map(|f| f.name))
        .collect();
    selected.sort_unstable();
    info!(?outcome, ?selected, "selection after clicking address");

    info!(redraws = handler.surface().redraws, "done");
    Ok(())
}
