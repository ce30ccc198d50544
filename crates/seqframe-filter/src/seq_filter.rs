//! Filtered sequence cursor

use seqframe_core::{SyncError, SyncResult, Time, TimedValue};
use seqframe_cursor::{SeqCursor, SeqSource, Synchronizable};

use crate::{Emission, FilterChain, FilterSpec};

/// A sequence source bound to a chain of filters.
///
/// Each advance moves the source, steps every filter in registration order
/// and exposes the single merged emission. Because it is itself a
/// `SeqSource`, filtered cursors stack: a lag over a cumulative sum is a
/// `SeqFilter` wrapping another `SeqFilter`.
pub struct SeqFilter<T, V, S = SeqCursor<T, V>> {
    /// Underlying source
    source: S,
    /// Attached filters
    chain: FilterChain<T, V>,
    /// Time of the last move
    current_time: Option<T>,
    /// Merged output of the last move
    emission: Emission<T, V>,
}

impl<T, V, S> SeqFilter<T, V, S>
where
    T: Time,
    V: Clone,
    S: SeqSource<T, V>,
{
    pub fn new(source: S) -> Self {
        SeqFilter {
            source,
            chain: FilterChain::new(),
            current_time: None,
            emission: Emission::empty(),
        }
    }

    /// Attach a fresh filter built from `spec`
    pub fn add_filter(&mut self, spec: &dyn FilterSpec<T, V>) -> &mut Self {
        self.chain.add(spec);
        self
    }

    /// Builder form of `add_filter`
    pub fn with_filter(mut self, spec: &dyn FilterSpec<T, V>) -> Self {
        self.chain.add(spec);
        self
    }

    pub fn filter_count(&self) -> usize {
        self.chain.len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Merged output of the last move
    pub fn emission(&self) -> &Emission<T, V> {
        &self.emission
    }
}

impl<T, V, S> Synchronizable<T> for SeqFilter<T, V, S>
where
    T: Time,
    V: Clone,
    S: SeqSource<T, V>,
{
    fn next_time(&self) -> Option<T> {
        self.source.next_time()
    }

    fn move_to_time(&mut self, time: T) -> SyncResult<()> {
        if self.chain.is_empty() {
            return Err(SyncError::NoFiltersConfigured);
        }

        self.source.move_to_time(time.clone())?;
        // The source has consumed this step, so report it even if the chain fails
        self.current_time = Some(time.clone());
        match self.chain.step(&time, &self.source) {
            Ok(emission) => {
                self.emission = emission;
                Ok(())
            }
            Err(e) => {
                self.emission = Emission::empty();
                Err(e)
            }
        }
    }

    fn current_time(&self) -> SyncResult<&T> {
        self.current_time.as_ref().ok_or(SyncError::CursorNotStarted)
    }
}

impl<T, V, S> SeqSource<T, V> for SeqFilter<T, V, S>
where
    T: Time,
    V: Clone,
    S: SeqSource<T, V>,
{
    fn current_item(&self) -> SyncResult<Option<&TimedValue<T, V>>> {
        if self.current_time.is_none() {
            return Err(SyncError::CursorNotStarted);
        }
        Ok(self.emission.current.as_ref())
    }

    fn moved_items(&self) -> &[TimedValue<T, V>] {
        &self.emission.moved
    }
}
