//! One-shot filtering helpers

use seqframe_core::{Frame, Key, Scalar, Sequence, SharedSequence, SyncResult, Time};
use seqframe_cursor::{FrameCursorExt, SeqCursorExt};
use seqframe_filter::{CumSum, FilterSpec, FrameFilter, SeqFilter};

use crate::{FrameOutput, SeqOutput};

/// Run a filter over a whole sequence and collect its output
pub trait SequenceExt<T: Time + 'static, V: Clone + 'static> {
    fn apply(&self, spec: &dyn FilterSpec<T, V>) -> SyncResult<Sequence<T, V>>;

    /// Running total at every item
    fn cumsum(&self) -> SyncResult<Sequence<T, V>>
    where
        V: Scalar,
    {
        self.apply(&CumSum)
    }
}

impl<T: Time + 'static, V: Clone + 'static> SequenceExt<T, V> for SharedSequence<T, V> {
    fn apply(&self, spec: &dyn FilterSpec<T, V>) -> SyncResult<Sequence<T, V>> {
        let mut sink = SeqOutput::new(SeqFilter::new(self.cursor()).with_filter(spec));
        sink.run_to_end()?;
        Ok(sink.into_sequence())
    }
}

impl<T: Time + 'static, V: Clone + 'static> SequenceExt<T, V> for Sequence<T, V> {
    fn apply(&self, spec: &dyn FilterSpec<T, V>) -> SyncResult<Sequence<T, V>> {
        self.clone().into_shared().apply(spec)
    }
}

/// Run a filter over every sequence of a frame and collect the output frame
pub trait FrameExt<K: Key, T: Time + 'static, V: Clone + 'static> {
    fn apply(&self, spec: &dyn FilterSpec<T, V>) -> SyncResult<Frame<K, T, V>>;

    fn cumsum(&self) -> SyncResult<Frame<K, T, V>>
    where
        V: Scalar,
    {
        self.apply(&CumSum)
    }
}

impl<K: Key, T: Time + 'static, V: Clone + 'static> FrameExt<K, T, V> for Frame<K, T, V> {
    fn apply(&self, spec: &dyn FilterSpec<T, V>) -> SyncResult<Frame<K, T, V>> {
        let mut sink = FrameOutput::new(FrameFilter::new(self.cursor()).with_filter(spec));
        sink.run_to_end()?;
        Ok(sink.into_frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqframe_core::TimedValue;
    use seqframe_filter::{Lag, RollingMean};

    fn pairs<V: Copy>(seq: &Sequence<i64, V>) -> Vec<(i64, V)> {
        seq.iter().map(|i| (*i.time(), *i.value())).collect()
    }

    #[test]
    fn test_sequence_cumsum() {
        let seq = Sequence::<i64, i64>::from_items([(1, 10), (3, 5), (7, -2)].map(TimedValue::from)).unwrap();

        let out = seq.cumsum().unwrap();
        assert_eq!(pairs(&out), vec![(1, 10), (3, 15), (7, 13)]);
        // Input untouched
        assert_eq!(pairs(&seq), vec![(1, 10), (3, 5), (7, -2)]);
    }

    #[test]
    fn test_shared_sequence_apply() {
        let seq = Sequence::<i64, f64>::from_items([(1, 2.0), (2, 4.0), (3, 9.0)].map(TimedValue::from))
            .unwrap()
            .into_shared();

        let out = seq.apply(&RollingMean::new(2)).unwrap();
        assert_eq!(pairs(&out), vec![(2, 3.0), (3, 6.5)]);
    }

    #[test]
    fn test_empty_sequence_apply() {
        let seq: Sequence<i64, i64> = Sequence::new();
        assert!(seq.cumsum().unwrap().is_empty());
    }

    #[test]
    fn test_frame_apply() {
        let mut frame: Frame<&'static str, i64, i64> = Frame::new();
        for (t, v) in [(1, 1), (2, 2), (3, 3)] {
            frame.add("a", t, v).unwrap();
            frame.add("b", t + 10, v * 100).unwrap();
        }

        let lagged = frame.apply(&Lag::new(1)).unwrap();
        let a: Vec<(i64, i64)> = lagged
            .require_seq(&"a")
            .unwrap()
            .to_vec()
            .iter()
            .map(|i| (*i.time(), *i.value()))
            .collect();
        assert_eq!(a, vec![(2, 1), (3, 2)]);

        let sums = frame.cumsum().unwrap();
        assert_eq!(sums.require_seq(&"b").unwrap().read().last().map(|i| *i.value()), Some(600));
    }
}
