//! Frame sinks

use seqframe_core::{Frame, Key, SyncResult, Time};
use seqframe_cursor::{drive, FrameSource};

/// Collects every current item a frame source emits into a new frame
pub struct FrameOutput<K, T, V, S> {
    source: S,
    output: Frame<K, T, V>,
}

impl<K: Key, T: Time, V: Clone, S: FrameSource<K, T, V>> FrameOutput<K, T, V, S> {
    pub fn new(source: S) -> Self {
        FrameOutput {
            source,
            output: Frame::new(),
        }
    }

    /// Drive the source until exhausted; returns the number of steps
    pub fn run_to_end(&mut self) -> SyncResult<usize> {
        let output = &mut self.output;
        let steps = drive(&mut self.source, |source| {
            for (key, item) in source.current_items()? {
                output.add(key.clone(), item.time().clone(), item.value().clone())?;
            }
            Ok(())
        })?;
        tracing::debug!(
            steps,
            keys = self.output.len(),
            items = self.output.item_count(),
            "frame output drained"
        );
        Ok(steps)
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

/// Collects every swept item a frame source reports into a new frame
pub struct FrameSampler<K, T, V, S> {
    source: S,
    output: Frame<K, T, V>,
}

impl<K: Key, T: Time, V: Clone, S: FrameSource<K, T, V>> FrameSampler<K, T, V, S> {
    pub fn new(source: S) -> Self {
        FrameSampler {
            source,
            output: Frame::new(),
        }
    }

    /// Drive the source until exhausted; returns the number of steps
    pub fn run_to_end(&mut self) -> SyncResult<usize> {
        let output = &mut self.output;
        let steps = drive(&mut self.source, |source| {
            for (key, items) in source.moved_items() {
                for item in items {
                    output.add(key.clone(), item.time().clone(), item.value().clone())?;
                }
            }
            Ok(())
        })?;
        tracing::debug!(
            steps,
            keys = self.output.len(),
            items = self.output.item_count(),
            "frame sampler drained"
        );
        Ok(steps)
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
