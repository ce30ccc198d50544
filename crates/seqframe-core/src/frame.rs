//! Frame - keyed collection of sequences

use std::hash::Hash;

use indexmap::IndexMap;

use crate::{SharedSequence, SyncError, SyncResult, Time};

/// Anything that can key a frame or cube
pub trait Key: Hash + Eq + Clone + std::fmt::Debug {}

impl<K: Hash + Eq + Clone + std::fmt::Debug> Key for K {}

/// Keyed sequences with no shared time grid.
/// Keys iterate in insertion order; a key holds at most one sequence.
#[derive(Clone, Debug)]
pub struct Frame<K, T, V> {
    seqs: IndexMap<K, SharedSequence<T, V>>,
}

impl<K: Key, T: Time, V> Frame<K, T, V> {
    pub fn new() -> Self {
        Frame {
            seqs: IndexMap::new(),
        }
    }

    /// Register an existing sequence under a new key
    pub fn add_seq(&mut self, key: K, seq: impl Into<SharedSequence<T, V>>) -> SyncResult<()> {
        if self.seqs.contains_key(&key) {
            return Err(SyncError::duplicate_key(&key));
        }
        self.seqs.insert(key, seq.into());
        Ok(())
    }

    /// Append to the sequence under `key`, creating it on first use
    pub fn add(&mut self, key: K, time: T, value: V) -> SyncResult<()> {
        self.entry(key).add(time, value)
    }

    /// Stage into the sequence under `key`, creating it on first use
    pub fn stage(&mut self, key: K, time: T, value: V) {
        self.entry(key).stage(time, value)
    }

    /// Accept staged items in every sequence.
    ///
    /// Every sequence is processed even if an earlier one fails; the first
    /// failure is returned.
    pub fn accept_staged(&mut self) -> SyncResult<()> {
        let mut first_err = None;
        for seq in self.seqs.values() {
            if let Err(e) = seq.accept_staged() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn clear_staged(&mut self) {
        for seq in self.seqs.values() {
            seq.clear_staged();
        }
    }

    /// Lookup that tolerates unknown keys
    pub fn get_seq(&self, key: &K) -> Option<&SharedSequence<T, V>> {
        self.seqs.get(key)
    }

    /// Lookup that fails on unknown keys
    pub fn require_seq(&self, key: &K) -> SyncResult<&SharedSequence<T, V>> {
        self.seqs.get(key).ok_or_else(|| SyncError::unknown_key(key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.seqs.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.seqs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &SharedSequence<T, V>)> {
        self.seqs.iter()
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Total committed items across all sequences
    pub fn item_count(&self) -> usize {
        self.seqs.values().map(|seq| seq.len()).sum()
    }

    /// Reorder sequences by key
    pub fn sort_keys(&mut self)
    where
        K: Ord,
    {
        self.seqs.sort_keys();
    }

    pub(crate) fn insert_seq(&mut self, key: K, seq: SharedSequence<T, V>) {
        self.seqs.insert(key, seq);
    }

    fn entry(&mut self, key: K) -> &SharedSequence<T, V> {
        self.seqs.entry(key).or_insert_with(SharedSequence::empty)
    }
}

impl<K: Key, T: Time, V> Default for Frame<K, T, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sequence;

    #[test]
    fn test_frame_add_creates_sequences_in_order() {
        let mut frame = Frame::new();
        frame.add("b", 1, 1.0).unwrap();
        frame.add("a", 2, 2.0).unwrap();
        frame.add("b", 3, 3.0).unwrap();

        let keys: Vec<_> = frame.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(frame.require_seq(&"b").unwrap().len(), 2);
        assert_eq!(frame.item_count(), 3);
    }

    #[test]
    fn test_frame_duplicate_key() {
        let mut frame: Frame<&str, i64, i64> = Frame::new();
        frame.add_seq("x", Sequence::new()).unwrap();

        let err = frame.add_seq("x", Sequence::new()).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateKey(_)));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_frame_lookup() {
        let mut frame: Frame<&str, i64, i64> = Frame::new();
        frame.add("x", 1, 1).unwrap();

        assert!(frame.get_seq(&"missing").is_none());
        assert!(matches!(
            frame.require_seq(&"missing"),
            Err(SyncError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_frame_stage_accept() {
        let mut frame: Frame<&str, i64, i64> = Frame::new();
        frame.stage("x", 3, 3);
        frame.stage("x", 1, 1);
        frame.stage("y", 2, 2);
        frame.stage("y", 2, 2);

        assert!(frame.accept_staged().is_err());
        assert_eq!(frame.require_seq(&"x").unwrap().len(), 2);
        assert_eq!(frame.require_seq(&"y").unwrap().len(), 1);
    }
}
