//! Cube - two-level keyed collection of frames

use indexmap::IndexMap;

use crate::{Frame, Key, SharedSequence, SyncError, SyncResult, Time};

/// Frames keyed by an outer key; each frame keys sequences by an inner key
#[derive(Clone, Debug)]
pub struct Cube<K1, K2, T, V> {
    frames: IndexMap<K1, Frame<K2, T, V>>,
}

impl<K1: Key, K2: Key, T: Time, V> Cube<K1, K2, T, V> {
    pub fn new() -> Self {
        Cube {
            frames: IndexMap::new(),
        }
    }

    pub fn add(&mut self, k1: K1, k2: K2, time: T, value: V) -> SyncResult<()> {
        self.frame_entry(k1).add(k2, time, value)
    }

    pub fn stage(&mut self, k1: K1, k2: K2, time: T, value: V) {
        self.frame_entry(k1).stage(k2, time, value)
    }

    /// Register an existing sequence at (k1, k2)
    pub fn add_seq(
        &mut self,
        k1: K1,
        k2: K2,
        seq: impl Into<SharedSequence<T, V>>,
    ) -> SyncResult<()> {
        self.frame_entry(k1).add_seq(k2, seq)
    }

    /// Accept staged items in every frame; the first failure is returned
    pub fn accept_staged(&mut self) -> SyncResult<()> {
        let mut first_err = None;
        for frame in self.frames.values_mut() {
            if let Err(e) = frame.accept_staged() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn clear_staged(&mut self) {
        for frame in self.frames.values_mut() {
            frame.clear_staged();
        }
    }

    pub fn get_frame(&self, k1: &K1) -> Option<&Frame<K2, T, V>> {
        self.frames.get(k1)
    }

    pub fn require_frame(&self, k1: &K1) -> SyncResult<&Frame<K2, T, V>> {
        self.frames.get(k1).ok_or_else(|| SyncError::unknown_key(k1))
    }

    pub fn get_seq(&self, k1: &K1, k2: &K2) -> Option<&SharedSequence<T, V>> {
        self.frames.get(k1).and_then(|frame| frame.get_seq(k2))
    }

    pub fn require_seq(&self, k1: &K1, k2: &K2) -> SyncResult<&SharedSequence<T, V>> {
        self.require_frame(k1)?.require_seq(k2)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K1> {
        self.frames.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K1, &Frame<K2, T, V>)> {
        self.frames.iter()
    }

    /// Every (k1, k2, sequence) edge, outer key major
    pub fn edges(&self) -> impl Iterator<Item = (&K1, &K2, &SharedSequence<T, V>)> {
        self.frames
            .iter()
            .flat_map(|(k1, frame)| frame.iter().map(move |(k2, seq)| (k1, k2, seq)))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Transpose the two key levels.
    ///
    /// Every (k1, k2) edge becomes (k2, k1) and keeps pointing at the same
    /// sequence; no items are copied. Both key levels of the result are in
    /// sorted order, so a cube whose keys are sorted comes back unchanged,
    /// key order included, from `reshuffle().reshuffle()`.
    pub fn reshuffle(&self) -> Cube<K2, K1, T, V>
    where
        K1: Ord,
        K2: Ord,
    {
        let mut out = Cube::new();
        for (k1, k2, seq) in self.edges() {
            // (k1, k2) pairs are unique, so (k2, k1) is never taken twice
            out.frame_entry(k2.clone()).insert_seq(k1.clone(), seq.clone());
        }
        out.sort_keys();
        tracing::debug!(frames = self.len(), reshuffled = out.len(), "cube reshuffled");
        out
    }

    /// Reorder both key levels
    pub fn sort_keys(&mut self)
    where
        K1: Ord,
        K2: Ord,
    {
        self.frames.sort_keys();
        for frame in self.frames.values_mut() {
            frame.sort_keys();
        }
    }

    fn frame_entry(&mut self, k1: K1) -> &mut Frame<K2, T, V> {
        self.frames.entry(k1).or_default()
    }
}

impl<K1: Key, K2: Key, T: Time, V> Default for Cube<K1, K2, T, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cube() -> Cube<&'static str, u32, i64, f64> {
        let mut cube = Cube::new();
        cube.add("a", 1, 10, 1.0).unwrap();
        cube.add("a", 2, 11, 2.0).unwrap();
        cube.add("b", 2, 12, 3.0).unwrap();
        cube.add("b", 3, 13, 4.0).unwrap();
        cube
    }

    fn edge_keys<K1: Key + Copy, K2: Key + Copy, T: Time, V>(cube: &Cube<K1, K2, T, V>) -> Vec<(K1, K2)> {
        cube.edges().map(|(k1, k2, _)| (*k1, *k2)).collect()
    }

    #[test]
    fn test_cube_add_creates_frames() {
        let cube = sample_cube();
        assert_eq!(cube.len(), 2);
        assert_eq!(cube.require_frame(&"a").unwrap().len(), 2);
        assert!(cube.get_seq(&"a", &3).is_none());
        assert!(matches!(cube.require_frame(&"z"), Err(SyncError::UnknownKey(_))));
    }

    #[test]
    fn test_reshuffle_swaps_keys_and_shares_sequences() {
        let cube = sample_cube();
        let flipped = cube.reshuffle();

        let keys: Vec<u32> = flipped.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(flipped.require_frame(&2).unwrap().len(), 2);

        for (k1, k2, seq) in cube.edges() {
            let other = flipped.require_seq(k2, k1).unwrap();
            assert!(seq.ptr_eq(other));
        }
    }

    #[test]
    fn test_reshuffle_involution() {
        let cube = sample_cube();
        let back = cube.reshuffle().reshuffle();

        assert_eq!(back.edges().count(), cube.edges().count());
        for (k1, k2, seq) in cube.edges() {
            assert!(seq.ptr_eq(back.require_seq(k1, k2).unwrap()));
        }
    }

    #[test]
    fn test_reshuffle_restores_key_order() {
        let mut cube: Cube<&str, &str, i64, i64> = Cube::new();
        cube.add("a", "y", 1, 1).unwrap();
        cube.add("b", "x", 2, 2).unwrap();
        cube.add("b", "y", 3, 3).unwrap();

        let back = cube.reshuffle().reshuffle();
        assert_eq!(edge_keys(&back), vec![("a", "y"), ("b", "x"), ("b", "y")]);
        assert_eq!(edge_keys(&back), edge_keys(&cube));
    }

    #[test]
    fn test_reshuffle_sorts_unsorted_cube() {
        let mut cube: Cube<u32, u32, i64, i64> = Cube::new();
        cube.add(2, 9, 1, 1).unwrap();
        cube.add(1, 9, 1, 1).unwrap();
        cube.add(1, 3, 1, 1).unwrap();

        let flipped = cube.reshuffle();
        assert_eq!(flipped.keys().copied().collect::<Vec<_>>(), vec![3, 9]);
        assert_eq!(flipped.require_frame(&9).unwrap().keys().copied().collect::<Vec<_>>(), vec![1, 2]);

        let mut sorted = cube.clone();
        sorted.sort_keys();
        assert_eq!(edge_keys(&sorted), vec![(1, 3), (1, 9), (2, 9)]);
        assert_eq!(edge_keys(&flipped.reshuffle()), edge_keys(&sorted));
    }

    #[test]
    fn test_cube_stage_accept() {
        let mut cube: Cube<&str, &str, i64, i64> = Cube::new();
        cube.stage("a", "x", 2, 2);
        cube.stage("a", "x", 1, 1);
        cube.accept_staged().unwrap();

        let times: Vec<i64> = cube
            .require_seq(&"a", &"x")
            .unwrap()
            .to_vec()
            .iter()
            .map(|item| *item.time())
            .collect();
        assert_eq!(times, vec![1, 2]);
    }
}
