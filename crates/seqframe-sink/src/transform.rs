//! Externally driven frame transform

use indexmap::IndexMap;
use seqframe_core::{Frame, Key, SyncError, SyncResult, Time, TimedValue};
use seqframe_cursor::{check_advance, drive, FrameSource, Synchronizable};

/// What a transform does when asked to move to its current time again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SameTimePolicy {
    /// Treat the call as a no-op
    #[default]
    Ignore,
    /// Fail like every other cursor
    Reject,
}

/// Frame transform configuration
#[derive(Clone, Debug, Default)]
pub struct TransformConfig {
    /// Re-entry at the current time
    pub same_time: SameTimePolicy,
}

impl TransformConfig {
    /// Strictly monotonic, matching plain cursors
    pub fn strict() -> Self {
        TransformConfig {
            same_time: SameTimePolicy::Reject,
        }
    }
}

/// Frame sink driven step by step from outside.
///
/// Each move advances the source and appends its current items to the
/// output frame. By default a repeated move to the current time is
/// tolerated and does nothing, so an external driver can re-issue the same
/// instant safely.
pub struct FrameTransform<K, T, V, S> {
    source: S,
    output: Frame<K, T, V>,
    last_time: Option<T>,
    config: TransformConfig,
}

impl<K: Key, T: Time, V: Clone, S: FrameSource<K, T, V>> FrameTransform<K, T, V, S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, TransformConfig::default())
    }

    pub fn with_config(source: S, config: TransformConfig) -> Self {
        FrameTransform {
            source,
            output: Frame::new(),
            last_time: None,
            config,
        }
    }

    /// Drive the source until exhausted; returns the number of steps
    pub fn run_to_end(&mut self) -> SyncResult<usize> {
        let steps = drive(self, |_| Ok(()))?;
        tracing::debug!(
            steps,
            keys = self.output.len(),
            items = self.output.item_count(),
            "frame transform drained"
        );
        Ok(steps)
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn frame(&self) -> &Frame<K, T, V> {
        &self.output
    }

    pub fn into_frame(self) -> Frame<K, T, V> {
        self.output
    }
}

impl<K: Key, T: Time, V: Clone, S: FrameSource<K, T, V>> Synchronizable<T>
    for FrameTransform<K, T, V, S>
{
    fn next_time(&self) -> Option<T> {
        self.source.next_time()
    }

    fn move_to_time(&mut self, time: T) -> SyncResult<()> {
        if self.config.same_time == SameTimePolicy::Ignore
            && self.last_time.as_ref() == Some(&time)
        {
            tracing::trace!(time = ?time, "transform re-entered at current time");
            return Ok(());
        }
        check_advance(self.last_time.as_ref(), &time)?;

        self.source.move_to_time(time.clone())?;
        for (key, item) in self.source.current_items()? {
            self.output
                .add(key.clone(), item.time().clone(), item.value().clone())?;
        }
        self.last_time = Some(time);
        Ok(())
    }

    fn current_time(&self) -> SyncResult<&T> {
        self.last_time.as_ref().ok_or(SyncError::CursorNotStarted)
    }
}

impl<K: Key, T: Time, V: Clone, S: FrameSource<K, T, V>> FrameSource<K, T, V>
    for FrameTransform<K, T, V, S>
{
    fn current_items(&self) -> SyncResult<&IndexMap<K, TimedValue<T, V>>> {
        self.source.current_items()
    }

    fn moved_items(&self) -> &IndexMap<K, Vec<TimedValue<T, V>>> {
        self.source.moved_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqframe_cursor::FrameCursorExt;
    use seqframe_filter::{Diff, FrameFilter};

    fn frame() -> Frame<&'static str, i64, i64> {
        let mut frame = Frame::new();
        for (t, v) in [(1, 1), (2, 4), (4, 16)] {
            frame.add("sq", t, v).unwrap();
        }
        frame
    }

    #[test]
    fn test_transform_same_time_is_noop() {
        let source = frame();
        let mut transform = FrameTransform::new(source.cursor());

        transform.move_to_time(1).unwrap();
        transform.move_to_time(1).unwrap();
        transform.move_to_time(2).unwrap();

        assert_eq!(transform.frame().require_seq(&"sq").unwrap().len(), 2);
        assert!(matches!(
            transform.move_to_time(1),
            Err(SyncError::NonMonotonicAdvance { .. })
        ));
    }

    #[test]
    fn test_transform_strict_policy() {
        let source = frame();
        let mut transform = FrameTransform::with_config(source.cursor(), TransformConfig::strict());

        transform.move_to_time(1).unwrap();
        assert!(matches!(
            transform.move_to_time(1),
            Err(SyncError::NonMonotonicAdvance { .. })
        ));
    }

    #[test]
    fn test_transform_run_to_end_after_manual_steps() {
        let source = frame();
        let mut transform = FrameTransform::new(FrameFilter::new(source.cursor()).with_filter(&Diff));

        transform.move_to_time(2).unwrap();
        transform.move_to_time(2).unwrap();
        assert_eq!(transform.run_to_end().unwrap(), 1);

        let values: Vec<(i64, i64)> = transform
            .into_frame()
            .require_seq(&"sq")
            .unwrap()
            .to_vec()
            .iter()
            .map(|i| (*i.time(), *i.value()))
            .collect();
        assert_eq!(values, vec![(2, 3), (4, 12)]);
    }

    #[test]
    fn test_transform_not_started() {
        let source = frame();
        let transform = FrameTransform::new(source.cursor());
        assert!(matches!(transform.current_time(), Err(SyncError::CursorNotStarted)));
    }
}
