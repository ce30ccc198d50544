//! Frame cursor - k-way time merge over every sequence of a frame

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use indexmap::IndexMap;
use seqframe_core::{Frame, Key, SyncError, SyncResult, Time, TimedValue};

use crate::{check_advance, FrameSource, SeqCursor, SeqSource, Synchronizable};

/// How the frame cursor finds the global next time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Scan every child on each step, O(keys)
    #[default]
    LinearScan,
    /// Binary heap of pending child times, O(log keys) per advanced child
    Heap,
}

/// Frame cursor configuration
#[derive(Clone, Debug, Default)]
pub struct FrameCursorConfig {
    /// Merge strategy
    pub strategy: MergeStrategy,
}

impl FrameCursorConfig {
    /// Configuration for frames with many keys
    pub fn heap() -> Self {
        FrameCursorConfig {
            strategy: MergeStrategy::Heap,
        }
    }
}

/// Merge bookkeeping
enum MergeQueue<T> {
    Scan,
    Heap {
        /// (next time, child index) for children with a pending item
        pending: BinaryHeap<Reverse<(T, usize)>>,
        /// Children that had nothing pending when last checked.
        /// Their sequences may have grown since, so they are re-polled.
        idle: Vec<usize>,
    },
}

/// Cursor over a whole frame.
///
/// Advancing to `t` moves every child whose next time is at or before `t`;
/// later children stay where they are and contribute nothing at `t`.
pub struct FrameCursor<K, T, V> {
    /// One cursor per frame key, in frame key order
    children: Vec<(K, SeqCursor<T, V>)>,
    /// Merge bookkeeping
    queue: MergeQueue<T>,
    /// Time of the last move
    current_time: Option<T>,
    /// Children advanced at the last move, ascending
    advanced: Vec<usize>,
    /// Keys with an item exactly at the current time
    current_items: IndexMap<K, TimedValue<T, V>>,
    /// Keys with a non-empty sweep
    moved_items: IndexMap<K, Vec<TimedValue<T, V>>>,
    /// Configuration
    config: FrameCursorConfig,
}

impl<K: Key, T: Time, V: Clone> FrameCursor<K, T, V> {
    /// Cursor with the default linear-scan merge
    pub fn new(frame: &Frame<K, T, V>) -> Self {
        Self::with_config(frame, FrameCursorConfig::default())
    }

    pub fn with_config(frame: &Frame<K, T, V>, config: FrameCursorConfig) -> Self {
        let children: Vec<_> = frame
            .iter()
            .map(|(key, seq)| (key.clone(), SeqCursor::new(seq.clone())))
            .collect();

        let queue = match config.strategy {
            MergeStrategy::LinearScan => MergeQueue::Scan,
            MergeStrategy::Heap => {
                let mut pending = BinaryHeap::with_capacity(children.len());
                let mut idle = Vec::new();
                for (idx, (_, child)) in children.iter().enumerate() {
                    match child.next_time() {
                        Some(t) => pending.push(Reverse((t, idx))),
                        None => idle.push(idx),
                    }
                }
                MergeQueue::Heap { pending, idle }
            }
        };

        FrameCursor {
            children,
            queue,
            current_time: None,
            advanced: Vec::new(),
            current_items: IndexMap::new(),
            moved_items: IndexMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &FrameCursorConfig {
        &self.config
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.children.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child cursor for one key
    pub fn child(&self, key: &K) -> Option<&SeqCursor<T, V>> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cursor)| cursor)
    }

    /// Children moved by the last advance, in frame key order
    pub fn advanced(&self) -> impl Iterator<Item = (&K, &SeqCursor<T, V>)> {
        self.advanced.iter().map(move |&idx| {
            let (key, cursor) = &self.children[idx];
            (key, cursor)
        })
    }

    /// Children due at `time`, ascending by index
    fn collect_due(&mut self, time: &T) -> Vec<usize> {
        let mut due = Vec::new();
        match &mut self.queue {
            MergeQueue::Scan => {
                for (idx, (_, child)) in self.children.iter().enumerate() {
                    if matches!(child.next_time(), Some(t) if t <= *time) {
                        due.push(idx);
                    }
                }
            }
            MergeQueue::Heap { pending, idle } => {
                while let Some(Reverse((t, _))) = pending.peek() {
                    if t > time {
                        break;
                    }
                    if let Some(Reverse((_, idx))) = pending.pop() {
                        due.push(idx);
                    }
                }

                let children = &self.children;
                idle.retain(|&idx| match children[idx].1.next_time() {
                    None => true,
                    Some(t) if t <= *time => {
                        due.push(idx);
                        false
                    }
                    Some(t) => {
                        pending.push(Reverse((t, idx)));
                        false
                    }
                });
                due.sort_unstable();
            }
        }
        due
    }

    /// Move every due child and gather its items
    fn advance_due(&mut self, time: &T) -> SyncResult<()> {
        for &idx in &self.advanced {
            let (key, child) = &mut self.children[idx];
            child.move_to_time(time.clone())?;

            if let Some(item) = child.current_item()? {
                self.current_items.insert(key.clone(), item.clone());
            }
            if !child.moved_items().is_empty() {
                self.moved_items
                    .insert(key.clone(), child.moved_items().to_vec());
            }
        }
        Ok(())
    }

    /// Put advanced children back into the merge queue
    fn requeue(&mut self) {
        if let MergeQueue::Heap { pending, idle } = &mut self.queue {
            for &idx in &self.advanced {
                match self.children[idx].1.next_time() {
                    Some(t) => pending.push(Reverse((t, idx))),
                    None => idle.push(idx),
                }
            }
        }
    }
}

impl<K: Key, T: Time, V: Clone> Synchronizable<T> for FrameCursor<K, T, V> {
    fn next_time(&self) -> Option<T> {
        match &self.queue {
            MergeQueue::Scan => self
                .children
                .iter()
                .filter_map(|(_, child)| child.next_time())
                .min(),
            MergeQueue::Heap { pending, idle } => {
                let queued = pending.peek().map(|Reverse((t, _))| t.clone());
                let polled = idle
                    .iter()
                    .filter_map(|&idx| self.children[idx].1.next_time())
                    .min();
                match (queued, polled) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                }
            }
        }
    }

    fn move_to_time(&mut self, time: T) -> SyncResult<()> {
        check_advance(self.current_time.as_ref(), &time)?;

        self.advanced = self.collect_due(&time);
        self.current_items.clear();
        self.moved_items.clear();

        let stepped = self.advance_due(&time);
        // Due children left the queue, so they go back even after a failure
        self.requeue();
        self.current_time = Some(time.clone());

        if let Err(e) = stepped {
            self.current_items.clear();
            self.moved_items.clear();
            return Err(e);
        }

        tracing::trace!(
            time = ?time,
            advanced = self.advanced.len(),
            current = self.current_items.len(),
            "frame cursor advanced"
        );
        Ok(())
    }

    fn current_time(&self) -> SyncResult<&T> {
        self.current_time.as_ref().ok_or(SyncError::CursorNotStarted)
    }
}

impl<K: Key, T: Time, V: Clone> FrameSource<K, T, V> for FrameCursor<K, T, V> {
    fn current_items(&self) -> SyncResult<&IndexMap<K, TimedValue<T, V>>> {
        if self.current_time.is_none() {
            return Err(SyncError::CursorNotStarted);
        }
        Ok(&self.current_items)
    }

    fn moved_items(&self) -> &IndexMap<K, Vec<TimedValue<T, V>>> {
        &self.moved_items
    }
}

/// Build a frame cursor straight from a frame
pub trait FrameCursorExt<K, T, V> {
    fn cursor(&self) -> FrameCursor<K, T, V>;

    fn cursor_with(&self, config: FrameCursorConfig) -> FrameCursor<K, T, V>;
}

impl<K: Key, T: Time, V: Clone> FrameCursorExt<K, T, V> for Frame<K, T, V> {
    fn cursor(&self) -> FrameCursor<K, T, V> {
        FrameCursor::new(self)
    }

    fn cursor_with(&self, config: FrameCursorConfig) -> FrameCursor<K, T, V> {
        FrameCursor::with_config(self, config)
    }
}
