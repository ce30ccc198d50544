//! The synchronization protocol shared by every cursor, filter and sink

use indexmap::IndexMap;
use seqframe_core::{SyncError, SyncResult, Time, TimedValue};

/// Anything positioned on a monotonically advancing clock.
///
/// The whole protocol is two calls: peek the earliest pending time, then
/// move to a time strictly after the current one.
pub trait Synchronizable<T> {
    /// Earliest time not yet visited; `None` once exhausted
    fn next_time(&self) -> Option<T>;

    /// Advance to `time`
    /// Fails with `NonMonotonicAdvance` unless `time` is after the current time
    fn move_to_time(&mut self, time: T) -> SyncResult<()>;

    /// Time of the last move; `CursorNotStarted` before the first one
    fn current_time(&self) -> SyncResult<&T>;
}

/// A synchronizable source of one stream of items
pub trait SeqSource<T, V>: Synchronizable<T> {
    /// Item landing exactly on the current time, if any
    fn current_item(&self) -> SyncResult<Option<&TimedValue<T, V>>>;

    /// Items swept by the last move, current item included
    fn moved_items(&self) -> &[TimedValue<T, V>];
}

/// A synchronizable source of keyed streams
pub trait FrameSource<K, T, V>: Synchronizable<T> {
    /// Keys with an item exactly at the current time
    fn current_items(&self) -> SyncResult<&IndexMap<K, TimedValue<T, V>>>;

    /// Keys with a non-empty sweep at the last move
    fn moved_items(&self) -> &IndexMap<K, Vec<TimedValue<T, V>>>;
}

/// Check that a move to `requested` keeps the clock strictly increasing
#[inline]
pub fn check_advance<T: Time>(current: Option<&T>, requested: &T) -> SyncResult<()> {
    match current {
        Some(current) if requested <= current => {
            Err(SyncError::non_monotonic(current, requested))
        }
        _ => Ok(()),
    }
}

/// Drive a source until exhausted, calling `on_step` after every move.
/// Returns the number of steps taken.
pub fn drive<T, S, F>(source: &mut S, mut on_step: F) -> SyncResult<usize>
where
    S: Synchronizable<T> + ?Sized,
    F: FnMut(&S) -> SyncResult<()>,
{
    let mut steps = 0;
    while let Some(time) = source.next_time() {
        source.move_to_time(time)?;
        on_step(source)?;
        steps += 1;
    }
    Ok(steps)
}
