//! Sequence cursor - a forward-only position over one sequence

use seqframe_core::{SharedSequence, SyncError, SyncResult, Time, TimedValue};

use crate::{check_advance, SeqSource, Synchronizable};

/// Cursor over a single sequence
/// INVARIANT: current time only moves forward; position never rewinds
pub struct SeqCursor<T, V> {
    /// Sequence being read
    seq: SharedSequence<T, V>,
    /// Index of the first item not yet swept
    pos: usize,
    /// Time of the last move
    current_time: Option<T>,
    /// Item exactly at the current time
    current: Option<TimedValue<T, V>>,
    /// Sweep of the last move, reused across steps
    moved: Vec<TimedValue<T, V>>,
}

impl<T: Time, V: Clone> SeqCursor<T, V> {
    pub fn new(seq: SharedSequence<T, V>) -> Self {
        SeqCursor {
            seq,
            pos: 0,
            current_time: None,
            current: None,
            moved: Vec::new(),
        }
    }

    /// The sequence this cursor reads
    pub fn sequence(&self) -> &SharedSequence<T, V> {
        &self.seq
    }

    /// Number of items swept so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_started(&self) -> bool {
        self.current_time.is_some()
    }

    /// True once every committed item has been swept
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.seq.len()
    }
}

impl<T: Time, V: Clone> Synchronizable<T> for SeqCursor<T, V> {
    fn next_time(&self) -> Option<T> {
        self.seq
            .read()
            .items()
            .get(self.pos)
            .map(|item| item.time().clone())
    }

    fn move_to_time(&mut self, time: T) -> SyncResult<()> {
        check_advance(self.current_time.as_ref(), &time)?;

        self.moved.clear();
        self.current = None;

        let seq = self.seq.read();
        let items = seq.items();
        while let Some(item) = items.get(self.pos) {
            if *item.time() > time {
                break;
            }
            if *item.time() == time {
                // Sequences never hold equal times; the cursor checks anyway
                if self.current.is_some() {
                    return Err(SyncError::duplicate_time(&time));
                }
                self.current = Some(item.clone());
            }
            self.moved.push(item.clone());
            self.pos += 1;
        }
        drop(seq);

        tracing::trace!(time = ?time, moved = self.moved.len(), "seq cursor advanced");
        self.current_time = Some(time);
        Ok(())
    }

    fn current_time(&self) -> SyncResult<&T> {
        self.current_time.as_ref().ok_or(SyncError::CursorNotStarted)
    }
}

impl<T: Time, V: Clone> SeqSource<T, V> for SeqCursor<T, V> {
    fn current_item(&self) -> SyncResult<Option<&TimedValue<T, V>>> {
        if self.current_time.is_none() {
            return Err(SyncError::CursorNotStarted);
        }
        Ok(self.current.as_ref())
    }

    fn moved_items(&self) -> &[TimedValue<T, V>] {
        &self.moved
    }
}

/// Build a cursor straight from a sequence handle
pub trait SeqCursorExt<T, V> {
    fn cursor(&self) -> SeqCursor<T, V>;
}

impl<T: Time, V: Clone> SeqCursorExt<T, V> for SharedSequence<T, V> {
    fn cursor(&self) -> SeqCursor<T, V> {
        SeqCursor::new(self.clone())
    }
}
