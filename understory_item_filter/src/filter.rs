// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot-backed filtering.

use alloc::boxed::Box;
use alloc::vec::Vec;

use tracing::debug;

use crate::source::ItemSource;

type Predicate<S> = Box<dyn Fn(&S, &<S as ItemSource>::Item) -> bool>;

/// Shows a filtered subset of an [`ItemSource`] and can put the full list back.
///
/// The first [`SnapshotFilter::filter`] copies the visible items into a
/// snapshot. From then on every filtered view is computed from that snapshot,
/// which is never modified, so [`SnapshotFilter::restore`] publishes exactly
/// the list that was visible before filtering, in the same order.
///
/// The predicate receives the source as well as the item, so id-like items can
/// be judged against live state. The last predicate is kept (the *active
/// predicate*) and [`SnapshotFilter::refresh`] re-applies it after that state
/// changes.
///
/// Items the source loads after the snapshot was taken (see
/// [`ItemSource::loaded`]) are appended to the snapshot by
/// [`SnapshotFilter::sync`], which `refresh`, `restore` and `filter` call first.
///
/// [`SnapshotFilter::restore`] keeps the active predicate:
/// [`SnapshotFilter::is_filtered`] turns false, `refresh` does nothing, and
/// [`SnapshotFilter::reapply`] filters again with the same predicate.
pub struct SnapshotFilter<S: ItemSource> {
    snapshot: Option<Vec<S::Item>>,
    /// [`ItemSource::loaded`] when the snapshot was last synced
    mark: usize,
    predicate: Option<Predicate<S>>,
}

impl<S: ItemSource> core::fmt::Debug for SnapshotFilter<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnapshotFilter")
            .field("snapshot_len", &self.snapshot.as_ref().map(Vec::len))
            .field("mark", &self.mark)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

impl<S: ItemSource> Default for SnapshotFilter<S> {
    fn default() -> Self {
        Self {
            snapshot: None,
            mark: 0,
            predicate: None,
        }
    }
}

impl<S: ItemSource> SnapshotFilter<S> {
    /// Create an inactive filter with no predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a snapshot exists.
    pub fn is_filtered(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Returns true if a predicate has been set and not cleared.
    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }

    /// The snapshot taken when filtering began, if filtering.
    pub fn snapshot(&self) -> Option<&[S::Item]> {
        self.snapshot.as_deref()
    }

    /// Publish the items of the snapshot that satisfy `predicate`.
    ///
    /// Takes a snapshot of the visible items first unless one already exists;
    /// filtering an already filtered source narrows from the full snapshot,
    /// not from the current view. `predicate` becomes the active predicate.
    pub fn filter<F>(&mut self, source: &mut S, predicate: F)
    where
        F: Fn(&S, &S::Item) -> bool + 'static,
    {
        self.take_snapshot(source);
        self.predicate = Some(Box::new(predicate));
        self.publish(source);
    }

    /// Publish the snapshot unchanged and drop it.
    ///
    /// Returns false, and leaves `source` alone, if not filtering. The active
    /// predicate is kept.
    pub fn restore(&mut self, source: &mut S) -> bool {
        self.sync(source);
        let Some(snapshot) = self.snapshot.take() else {
            return false;
        };
        debug!(restored = snapshot.len(), "restored items");
        source.set_items(snapshot);
        true
    }

    /// Same as [`SnapshotFilter::restore`].
    pub fn reset(&mut self, source: &mut S) -> bool {
        self.restore(source)
    }

    /// Restore if filtering, otherwise filter with `predicate`.
    ///
    /// Returns the resulting [`SnapshotFilter::is_filtered`]. When this
    /// restores, `predicate` is dropped and the active predicate is kept.
    pub fn toggle<F>(&mut self, source: &mut S, predicate: F) -> bool
    where
        F: Fn(&S, &S::Item) -> bool + 'static,
    {
        if self.is_filtered() {
            self.restore(source);
        } else {
            self.filter(source, predicate);
        }
        self.is_filtered()
    }

    /// Re-apply the active predicate to the snapshot.
    ///
    /// Call after editing state the predicate looks at. Does nothing and
    /// returns false unless filtering.
    pub fn refresh(&mut self, source: &mut S) -> bool {
        self.sync(source);
        self.publish(source)
    }

    /// Filter again with the active predicate after a restore.
    ///
    /// While filtering this is the same as [`SnapshotFilter::refresh`].
    /// Returns false if there is no active predicate.
    pub fn reapply(&mut self, source: &mut S) -> bool {
        if self.predicate.is_none() {
            return false;
        }
        self.take_snapshot(source);
        self.publish(source)
    }

    /// Forget the active predicate. A running filter stays in place until
    /// restored, but can no longer be refreshed.
    pub fn clear_predicate(&mut self) {
        self.predicate = None;
    }

    /// Append items loaded since the last sync to the snapshot.
    ///
    /// Returns how many were added; 0 when not filtering. The visible items
    /// are left alone until the next publish.
    pub fn sync(&mut self, source: &S) -> usize {
        let Some(snapshot) = &mut self.snapshot else {
            return 0;
        };
        let loaded = source.loaded();
        if loaded <= self.mark {
            return 0;
        }
        let late = source.loaded_since(self.mark);
        let added = late.len();
        self.mark = loaded;
        snapshot.extend(late);
        debug!(added, "synced snapshot with loaded items");
        added
    }

    /// Snapshot the visible items unless a snapshot exists, else sync it.
    fn take_snapshot(&mut self, source: &S) {
        if self.snapshot.is_some() {
            self.sync(source);
        } else {
            self.snapshot = Some(source.items().to_vec());
            self.mark = source.loaded();
        }
    }

    fn publish(&self, source: &mut S) -> bool {
        let (Some(snapshot), Some(predicate)) = (&self.snapshot, &self.predicate) else {
            return false;
        };
        let view: &S = source;
        let visible: Vec<S::Item> = snapshot
            .iter()
            .filter(|item| predicate(view, *item))
            .cloned()
            .collect();
        debug!(
            snapshot = snapshot.len(),
            visible = visible.len(),
            "filtered items"
        );
        source.set_items(visible);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    fn even<S>(_: &S, n: &u32) -> bool {
        n % 2 == 0
    }

    #[test]
    fn filter_then_restore_is_identity() {
        let mut items = vec![5_u32, 2, 8, 1, 4];
        let original = items.clone();
        let mut filter = SnapshotFilter::new();

        filter.filter(&mut items, even);
        assert_eq!(items, vec![2, 8, 4], "order of the snapshot is kept");
        assert!(filter.is_filtered());
        assert!(filter.refresh(&mut items));
        assert!(filter.refresh(&mut items));

        assert!(filter.restore(&mut items));
        assert_eq!(items, original);
        assert!(!filter.is_filtered());
        assert!(filter.snapshot().is_none());
    }

    #[test]
    fn second_filter_narrows_from_snapshot() {
        let mut items: Vec<u32> = (1..=10).collect();
        let mut filter = SnapshotFilter::new();
        filter.filter(&mut items, |_, n| *n > 6);
        assert_eq!(items, vec![7, 8, 9, 10]);
        filter.filter(&mut items, |_, n| *n < 3);
        assert_eq!(items, vec![1, 2], "not an intersection with the last view");
        filter.restore(&mut items);
        assert_eq!(items, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn toggle_reports_state() {
        let mut items = vec![1_u32, 2, 3];
        let mut filter = SnapshotFilter::new();
        assert!(filter.toggle(&mut items, even));
        assert_eq!(items, vec![2]);
        assert!(!filter.toggle(&mut items, even));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn refresh_and_restore_are_noops_when_inactive() {
        let mut items = vec![1_u32, 2, 3];
        let mut filter = SnapshotFilter::new();
        assert!(!filter.refresh(&mut items));
        assert!(!filter.restore(&mut items));
        assert!(!filter.reapply(&mut items));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn refresh_sees_edits_through_shared_handles() {
        let cells: Vec<Rc<Cell<bool>>> = (0..4).map(|i| Rc::new(Cell::new(i % 2 == 0))).collect();
        let mut items = cells.clone();
        let mut filter = SnapshotFilter::new();
        filter.filter(&mut items, |_, c: &Rc<Cell<bool>>| c.get());
        assert_eq!(items.len(), 2);

        cells[0].set(false);
        cells[3].set(true);
        filter.refresh(&mut items);
        assert_eq!(items.len(), 2);
        assert!(Rc::ptr_eq(&items[0], &cells[2]));
        assert!(Rc::ptr_eq(&items[1], &cells[3]));

        filter.restore(&mut items);
        assert_eq!(items.len(), 4);
        assert!(items.iter().zip(&cells).all(|(a, b)| Rc::ptr_eq(a, b)));
    }

    #[test]
    fn reset_puts_back_the_snapshot() {
        let mut items = vec![3_u32, 1, 2];
        let mut filter = SnapshotFilter::new();
        assert!(!filter.reset(&mut items), "nothing to reset");
        filter.filter(&mut items, |_, n| *n > 1);
        assert_eq!(items, vec![3, 2]);
        assert!(filter.reset(&mut items));
        assert_eq!(items, vec![3, 1, 2]);
        assert!(!filter.is_filtered());
        assert!(!filter.reset(&mut items), "second reset is a no-op");
    }

    /// A source that loads rows on its own and appends them to the view.
    #[derive(Default)]
    struct Feed {
        loaded: Vec<u32>,
        visible: Vec<u32>,
    }

    impl Feed {
        fn load(&mut self, row: u32) {
            self.loaded.push(row);
            self.visible.push(row);
        }
    }

    impl ItemSource for Feed {
        type Item = u32;

        fn items(&self) -> &[u32] {
            &self.visible
        }

        fn set_items(&mut self, items: Vec<u32>) {
            self.visible = items;
        }

        fn loaded(&self) -> usize {
            self.loaded.len()
        }

        fn loaded_since(&self, mark: usize) -> Vec<u32> {
            self.loaded[mark..].to_vec()
        }
    }

    #[test]
    fn rows_loaded_while_filtered_join_the_snapshot() {
        let mut feed = Feed::default();
        for row in 1..=4 {
            feed.load(row);
        }
        let mut filter = SnapshotFilter::new();
        filter.filter(&mut feed, even);
        assert_eq!(feed.visible, vec![2, 4]);

        feed.load(5);
        feed.load(6);
        assert_eq!(feed.visible, vec![2, 4, 5, 6], "loads land in the view");
        assert!(filter.refresh(&mut feed));
        assert_eq!(feed.visible, vec![2, 4, 6], "predicate applies to late rows");
        assert_eq!(filter.snapshot(), Some(&[1, 2, 3, 4, 5, 6][..]));

        feed.load(7);
        assert!(filter.restore(&mut feed));
        assert_eq!(feed.visible, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(filter.sync(&feed), 0, "nothing to sync while inactive");
    }

    #[test]
    fn refilter_picks_up_rows_loaded_between_filters() {
        let mut feed = Feed::default();
        feed.load(1);
        feed.load(2);
        let mut filter = SnapshotFilter::new();
        filter.filter(&mut feed, |_, n| *n > 1);
        feed.load(3);
        filter.filter(&mut feed, |_, n| *n != 2);
        assert_eq!(feed.visible, vec![1, 3]);
        assert_eq!(filter.sync(&feed), 0, "already synced by filter");
    }

    #[test]
    fn restore_keeps_predicate_for_reapply() {
        let mut items = vec![1_u32, 2, 3, 4];
        let mut filter = SnapshotFilter::new();
        filter.filter(&mut items, even);
        filter.restore(&mut items);
        assert!(filter.has_predicate());
        assert!(!filter.refresh(&mut items), "refresh needs an active snapshot");

        assert!(filter.reapply(&mut items));
        assert!(filter.is_filtered());
        assert_eq!(items, vec![2, 4]);

        filter.clear_predicate();
        assert!(!filter.refresh(&mut items));
        assert_eq!(items, vec![2, 4], "view stays until restored");
        assert!(filter.reset(&mut items));
        assert_eq!(items, vec![1, 2, 3, 4]);
    }
}
