//! Sequence sinks

use seqframe_core::{Sequence, SyncResult, Time};
use seqframe_cursor::{drive, SeqSource};

/// Collects every current item a source emits into a new sequence
pub struct SeqOutput<T, V, S> {
    source: S,
    output: Sequence<T, V>,
}

impl<T: Time, V: Clone, S: SeqSource<T, V>> SeqOutput<T, V, S> {
    pub fn new(source: S) -> Self {
        SeqOutput {
            source,
            output: Sequence::new(),
        }
    }

    /// Drive the source until exhausted; returns the number of steps
    pub fn run_to_end(&mut self) -> SyncResult<usize> {
        let output = &mut self.output;
        let steps = drive(&mut self.source, |source| {
            if let Some(item) = source.current_item()? {
                output.push(item.clone())?;
            }
            Ok(())
        })?;
        tracing::debug!(steps, items = self.output.len(), "seq output drained");
        Ok(steps)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sequence(&self) -> &Sequence<T, V> {
        &self.output
    }

    pub fn into_sequence(self) -> Sequence<T, V> {
        self.output
    }
}

/// Collects every swept item a source reports into a new sequence.
///
/// Unlike `SeqOutput`, intermediate items (a filter's moved items, or the
/// items a cursor skipped over) are kept too.
pub struct SeqSampler<T, V, S> {
    source: S,
    output: Sequence<T, V>,
}

impl<T: Time, V: Clone, S: SeqSource<T, V>> SeqSampler<T, V, S> {
    pub fn new(source: S) -> Self {
        SeqSampler {
            source,
            output: Sequence::new(),
        }
    }

    /// Drive the source until exhausted; returns the number of steps
    pub fn run_to_end(&mut self) -> SyncResult<usize> {
        let output = &mut self.output;
        let steps = drive(&mut self.source, |source| {
            for item in source.moved_items() {
                output.push(item.clone())?;
            }
            Ok(())
        })?;
        tracing::debug!(steps, items = self.output.len(), "seq sampler drained");
        Ok(steps)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sequence(&self) -> &Sequence<T, V> {
        &self.output
    }

    pub fn into_sequence(self) -> Sequence<T, V> {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqframe_core::{SharedSequence, TimedValue};
    use seqframe_cursor::{SeqCursorExt, Synchronizable};
    use seqframe_filter::{CumSum, Passthrough, RollingSum, SeqFilter};

    fn shared(items: &[(i64, i64)]) -> SharedSequence<i64, i64> {
        let mut seq = Sequence::new();
        for &(t, v) in items {
            seq.add(t, v).unwrap();
        }
        seq.into_shared()
    }

    fn pairs(seq: &Sequence<i64, i64>) -> Vec<(i64, i64)> {
        seq.iter().map(|i| (*i.time(), *i.value())).collect()
    }

    #[test]
    fn test_output_copies_plain_cursor() {
        let seq = shared(&[(1, 1), (2, 4), (3, 9)]);
        let mut sink = SeqOutput::new(seq.cursor());

        assert_eq!(sink.run_to_end().unwrap(), 3);
        assert_eq!(pairs(sink.sequence()), vec![(1, 1), (2, 4), (3, 9)]);
        // The source is read, never written
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_output_of_cumsum() {
        let seq = shared(&[(1, 10), (3, 5), (7, -2)]);
        let mut sink = SeqOutput::new(SeqFilter::new(seq.cursor()).with_filter(&CumSum));
        sink.run_to_end().unwrap();

        assert_eq!(pairs(&sink.into_sequence()), vec![(1, 10), (3, 15), (7, 13)]);
    }

    #[test]
    fn test_output_skips_silent_steps() {
        let seq = shared(&[(1, 1), (2, 2), (3, 3), (4, 4)]);
        let mut sink = SeqOutput::new(SeqFilter::new(seq.cursor()).with_filter(&RollingSum::new(3)));

        assert_eq!(sink.run_to_end().unwrap(), 4);
        assert_eq!(pairs(sink.sequence()), vec![(3, 6), (4, 9)]);
    }

    #[test]
    fn test_sampler_keeps_swept_items() {
        let seq = shared(&[(1, 1), (2, 2), (5, 5)]);
        let mut cursor = SeqFilter::new(seq.cursor()).with_filter(&Passthrough);
        // Jump past the first two items by hand, then let the sampler finish
        cursor.move_to_time(3).unwrap();
        assert_eq!(cursor.moved_items().len(), 2);

        let mut sampler = SeqSampler::new(cursor);
        assert_eq!(sampler.run_to_end().unwrap(), 1);
        assert_eq!(
            sampler.sequence().items(),
            &[TimedValue::new(5, 5)]
        );
    }

    #[test]
    fn test_sampler_over_full_run_matches_source() {
        let seq = shared(&[(1, 1), (2, 2), (5, 5)]);
        let mut sampler = SeqSampler::new(seq.cursor());
        sampler.run_to_end().unwrap();
        assert_eq!(pairs(sampler.sequence()), vec![(1, 1), (2, 2), (5, 5)]);
    }
}
