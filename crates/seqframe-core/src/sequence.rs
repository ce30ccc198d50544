//! Sequences - append-only, strictly time-ordered lists of timed values

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{SyncError, SyncResult, Time, TimedValue};

/// Append-only sequence of timed values
/// INVARIANT: committed items are strictly increasing in time
#[derive(Clone, Debug)]
pub struct Sequence<T, V> {
    /// Committed items
    items: Vec<TimedValue<T, V>>,
    /// Pending out-of-order inserts
    staged: Vec<TimedValue<T, V>>,
}

impl<T: Time, V> Sequence<T, V> {
    pub fn new() -> Self {
        Sequence {
            items: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Build a sequence from items that must already be strictly ordered
    pub fn from_items<I>(items: I) -> SyncResult<Self>
    where
        I: IntoIterator<Item = TimedValue<T, V>>,
    {
        let mut seq = Sequence::new();
        for item in items {
            seq.push(item)?;
        }
        Ok(seq)
    }

    /// Append an item strictly after the last committed one
    pub fn add(&mut self, time: T, value: V) -> SyncResult<()> {
        self.push(TimedValue::new(time, value))
    }

    /// Append a prebuilt item; the sequence is unchanged on failure
    pub fn push(&mut self, item: TimedValue<T, V>) -> SyncResult<()> {
        if let Some(last) = self.items.last() {
            if item.time() <= last.time() {
                return Err(SyncError::time_order(last.time(), item.time()));
            }
        }
        self.items.push(item);
        Ok(())
    }

    /// Stage an item in any order; nothing is visible until accepted
    pub fn stage(&mut self, time: T, value: V) {
        self.staged.push(TimedValue::new(time, value));
    }

    /// Sort the staged batch and commit it item by item.
    ///
    /// The sort is stable, so two staged items with the same time keep their
    /// staging order and the second one fails the strict-order check. Items
    /// committed before a failure stay committed. The staging buffer is empty
    /// afterwards either way.
    pub fn accept_staged(&mut self) -> SyncResult<()> {
        let mut staged = std::mem::take(&mut self.staged);
        staged.sort_by(|a, b| a.time().cmp(b.time()));

        let total = staged.len();
        for (committed, item) in staged.into_iter().enumerate() {
            if let Err(e) = self.push(item) {
                tracing::warn!(committed, total, "staged batch rejected: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Drop staged items without committing
    pub fn clear_staged(&mut self) {
        self.staged.clear();
    }

    /// Read-only view of committed items
    #[inline]
    pub fn items(&self) -> &[TimedValue<T, V>] {
        &self.items
    }

    #[inline]
    pub fn last(&self) -> Option<&TimedValue<T, V>> {
        self.items.last()
    }

    #[inline]
    pub fn first(&self) -> Option<&TimedValue<T, V>> {
        self.items.first()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items waiting in the staging buffer
    #[inline]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimedValue<T, V>> {
        self.items.iter()
    }

    pub fn times(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| item.time())
    }

    /// Item with exactly this time, if any
    pub fn get_at(&self, time: &T) -> Option<&TimedValue<T, V>> {
        self.items
            .binary_search_by(|item| item.time().cmp(time))
            .ok()
            .map(|idx| &self.items[idx])
    }

    /// Items with `from <= time < to`
    pub fn range(&self, from: &T, to: &T) -> &[TimedValue<T, V>] {
        let start = self.items.partition_point(|item| item.time() < from);
        let end = self.items.partition_point(|item| item.time() < to);
        if start >= end {
            return &[];
        }
        &self.items[start..end]
    }

    /// Move into a shareable handle
    pub fn into_shared(self) -> SharedSequence<T, V> {
        SharedSequence::new(self)
    }
}

impl<T: Time, V> Default for Sequence<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, V> IntoIterator for &'a Sequence<T, V> {
    type Item = &'a TimedValue<T, V>;
    type IntoIter = std::slice::Iter<'a, TimedValue<T, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Shared handle to a sequence: one writer, many readers.
///
/// Frames and cubes hold handles rather than sequences so that a reshuffled
/// cube and every cursor point at the same underlying data.
pub struct SharedSequence<T, V> {
    inner: Arc<RwLock<Sequence<T, V>>>,
}

impl<T: Time, V> SharedSequence<T, V> {
    pub fn new(seq: Sequence<T, V>) -> Self {
        SharedSequence {
            inner: Arc::new(RwLock::new(seq)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Sequence::new())
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Sequence<T, V>> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Sequence<T, V>> {
        self.inner.write()
    }

    pub fn add(&self, time: T, value: V) -> SyncResult<()> {
        self.inner.write().add(time, value)
    }

    pub fn stage(&self, time: T, value: V) {
        self.inner.write().stage(time, value)
    }

    pub fn accept_staged(&self) -> SyncResult<()> {
        self.inner.write().accept_staged()
    }

    pub fn clear_staged(&self) {
        self.inner.write().clear_staged()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Snapshot of the committed items
    pub fn to_vec(&self) -> Vec<TimedValue<T, V>>
    where
        V: Clone,
    {
        self.inner.read().items().to_vec()
    }

    /// True if both handles point at the same sequence
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, V> Clone for SharedSequence<T, V> {
    fn clone(&self) -> Self {
        SharedSequence {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for SharedSequence<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedSequence").field(&*self.inner.read()).finish()
    }
}

impl<T: Time, V> From<Sequence<T, V>> for SharedSequence<T, V> {
    fn from(seq: Sequence<T, V>) -> Self {
        SharedSequence::new(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times<V>(seq: &Sequence<i64, V>) -> Vec<i64> {
        seq.times().copied().collect()
    }

    #[test]
    fn test_add_strict_order() {
        let mut seq = Sequence::new();
        seq.add(1, 10).unwrap();
        seq.add(2, 20).unwrap();
        seq.add(5, 50).unwrap();

        assert_eq!(times(&seq), vec![1, 2, 5]);
        assert_eq!(seq.last(), Some(&TimedValue::new(5, 50)));
    }

    #[test]
    fn test_add_out_of_order_leaves_sequence_unchanged() {
        let mut seq = Sequence::new();
        seq.add(1, 10).unwrap();
        seq.add(3, 30).unwrap();

        let err = seq.add(3, 31).unwrap_err();
        assert!(matches!(err, SyncError::TimeOrderViolation { .. }));
        let err = seq.add(2, 20).unwrap_err();
        assert!(matches!(err, SyncError::TimeOrderViolation { .. }));

        assert_eq!(times(&seq), vec![1, 3]);
        assert_eq!(*seq.last().unwrap().value(), 30);
    }

    #[test]
    fn test_stage_and_accept_sorts() {
        let mut seq = Sequence::new();
        seq.stage(5, "e");
        seq.stage(1, "a");
        seq.stage(3, "c");
        assert!(seq.is_empty());
        assert_eq!(seq.staged_len(), 3);

        seq.accept_staged().unwrap();
        assert_eq!(times(&seq), vec![1, 3, 5]);
        assert_eq!(seq.staged_len(), 0);
    }

    #[test]
    fn test_accept_staged_equal_times_fails_on_second() {
        let mut seq = Sequence::new();
        seq.stage(4, "first");
        seq.stage(4, "second");

        let err = seq.accept_staged().unwrap_err();
        assert!(matches!(err, SyncError::TimeOrderViolation { .. }));

        // Only the first commit went through
        assert_eq!(seq.len(), 1);
        assert_eq!(*seq.items()[0].value(), "first");
        assert_eq!(seq.staged_len(), 0);
    }

    #[test]
    fn test_accept_staged_before_last_committed_fails() {
        let mut seq = Sequence::new();
        seq.add(10, 1).unwrap();
        seq.stage(12, 2);
        seq.stage(8, 3);

        assert!(seq.accept_staged().is_err());
        assert_eq!(times(&seq), vec![10]);
    }

    #[test]
    fn test_clear_staged() {
        let mut seq: Sequence<i64, i64> = Sequence::new();
        seq.stage(2, 2);
        seq.clear_staged();
        seq.accept_staged().unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_lookup_and_range() {
        let seq = Sequence::from_items((1..=5).map(|t| TimedValue::new(t * 10, t))).unwrap();

        assert_eq!(seq.get_at(&30).map(|i| *i.value()), Some(3));
        assert!(seq.get_at(&35).is_none());

        let window: Vec<i64> = seq.range(&15, &40).iter().map(|i| *i.time()).collect();
        assert_eq!(window, vec![20, 30]);
        assert!(seq.range(&40, &15).is_empty());
    }

    #[test]
    fn test_from_items_rejects_unordered() {
        let items = vec![TimedValue::new(2, 0), TimedValue::new(1, 0)];
        assert!(Sequence::from_items(items).is_err());
    }

    #[test]
    fn test_shared_sequence_identity() {
        let a = SharedSequence::<i64, i64>::empty();
        let b = a.clone();
        let c = SharedSequence::<i64, i64>::empty();

        b.add(1, 1).unwrap();
        assert_eq!(a.len(), 1);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    mod props {
        use super::*;
        use crate::Sequence;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_accept_commits_sorted_prefix(batch in prop::collection::vec(-50i64..50, 0..40)) {
                let mut seq = Sequence::new();
                for &t in &batch {
                    seq.stage(t, ());
                }
                let result = seq.accept_staged();

                let mut sorted = batch.clone();
                sorted.sort();
                let has_dup = sorted.windows(2).any(|w| w[0] == w[1]);
                prop_assert_eq!(result.is_err(), has_dup);
                prop_assert_eq!(seq.staged_len(), 0);

                // Whatever got committed is the strictly increasing head of the batch
                let committed = times(&seq);
                prop_assert!(committed.windows(2).all(|w| w[0] < w[1]));
                prop_assert_eq!(&sorted[..committed.len()], committed.as_slice());
            }
        }
    }
}
