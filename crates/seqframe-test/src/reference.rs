//! Reference checks - naive versions of the engine's merges and filters
//!
//! Everything here favours obviousness over speed, so the real cursors and
//! filters can be compared against it on generated workloads.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use seqframe_core::{Frame, Key, Scalar, Sequence, SyncResult, Time};
use seqframe_cursor::{drive, FrameSource, SeqSource};

/// What a source reported at one step
#[derive(Clone, Debug, PartialEq)]
pub struct StepRecord<K, T, V> {
    pub time: T,
    /// Current items in key order
    pub current: Vec<(K, V)>,
    /// Number of items swept, over all keys
    pub moved: usize,
}

/// Drive a frame source to the end, recording every step
pub fn record_frame<K, T, V, S>(source: &mut S) -> SyncResult<Vec<StepRecord<K, T, V>>>
where
    K: Key,
    T: Time,
    V: Clone,
    S: FrameSource<K, T, V>,
{
    let mut steps = Vec::new();
    drive(source, |s| {
        let current = s
            .current_items()?
            .iter()
            .map(|(key, item)| (key.clone(), item.value().clone()))
            .collect();
        steps.push(StepRecord {
            time: s.current_time()?.clone(),
            current,
            moved: s.moved_items().values().map(Vec::len).sum(),
        });
        Ok(())
    })?;
    Ok(steps)
}

/// Drive a sequence source to the end, collecting its current items
pub fn record_seq<T, V, S>(source: &mut S) -> SyncResult<Vec<(T, V)>>
where
    T: Time,
    V: Clone,
    S: SeqSource<T, V>,
{
    let mut out = Vec::new();
    drive(source, |s| {
        if let Some(item) = s.current_item()? {
            out.push((item.time().clone(), item.value().clone()));
        }
        Ok(())
    })?;
    Ok(out)
}

/// Every distinct time in the frame, ascending
pub fn union_times<K: Key, T: Time, V: Clone>(frame: &Frame<K, T, V>) -> Vec<T> {
    let mut times = BTreeSet::new();
    for (_, seq) in frame.iter() {
        times.extend(seq.read().times().cloned());
    }
    times.into_iter().collect()
}

/// The merge a frame cursor must reproduce: per time, the keys holding an
/// item there, in frame key order
pub fn reference_merge<K: Key, T: Time, V: Clone>(
    frame: &Frame<K, T, V>,
) -> Vec<(T, IndexMap<K, V>)> {
    union_times(frame)
        .into_iter()
        .map(|time| {
            let at: IndexMap<K, V> = frame
                .iter()
                .filter_map(|(key, seq)| {
                    seq.read()
                        .get_at(&time)
                        .map(|item| (key.clone(), item.value().clone()))
                })
                .collect();
            (time, at)
        })
        .collect()
}

/// Prefix sums
pub fn reference_cumsum<T: Time, V: Scalar>(seq: &Sequence<T, V>) -> Vec<(T, V)> {
    let mut total = V::default();
    seq.iter()
        .map(|item| {
            total = total + *item.value();
            (item.time().clone(), total)
        })
        .collect()
}

/// Sums over every full window of `window` consecutive items
pub fn reference_rolling_sum<T: Time, V: Scalar>(seq: &Sequence<T, V>, window: usize) -> Vec<(T, V)> {
    let window = window.max(1);
    let items = seq.items();
    items
        .windows(window)
        .map(|w| {
            let sum = w.iter().fold(V::default(), |acc, item| acc + *item.value());
            (w[window - 1].time().clone(), sum)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqframe_core::TimedValue;

    fn frame() -> Frame<&'static str, i64, i64> {
        let mut frame = Frame::new();
        for t in [1, 3, 5] {
            frame.add("A", t, t * 10).unwrap();
        }
        for t in [2, 3, 6] {
            frame.add("B", t, t * 100).unwrap();
        }
        frame
    }

    #[test]
    fn test_union_times() {
        assert_eq!(union_times(&frame()), vec![1, 2, 3, 5, 6]);
    }

    #[test]
    fn test_reference_merge_at_shared_time() {
        let merged = reference_merge(&frame());
        let (time, at) = &merged[2];
        assert_eq!(*time, 3);
        assert_eq!(at.keys().copied().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(at["B"], 300);
    }

    #[test]
    fn test_reference_filters() {
        let seq = Sequence::<i64, i64>::from_items([(1, 1), (2, 2), (3, 3)].map(TimedValue::from)).unwrap();
        assert_eq!(reference_cumsum(&seq), vec![(1, 1), (2, 3), (3, 6)]);
        assert_eq!(reference_rolling_sum(&seq, 2), vec![(2, 3), (3, 5)]);
        assert!(reference_rolling_sum(&seq, 4).is_empty());
    }
}
