//! Filtered frame cursor - per-key filter chains over one shared merge

use indexmap::IndexMap;
use seqframe_core::{Key, SyncError, SyncResult, Time, TimedValue};
use seqframe_cursor::{FrameCursor, FrameSource, Synchronizable};

use crate::{FilterChain, FilterSpec};

/// A frame cursor with one filter chain per key.
///
/// All chains share the frame cursor's clock. On each advance only the keys
/// the cursor actually moved have their filters stepped, and the
/// single-producer rule is checked for each key on its own.
pub struct FrameFilter<K, T, V> {
    /// Shared merge over every key
    cursor: FrameCursor<K, T, V>,
    /// Filters per key
    chains: IndexMap<K, FilterChain<T, V>>,
    /// Time of the last move
    current_time: Option<T>,
    /// Keys whose filters emitted a current item
    current_items: IndexMap<K, TimedValue<T, V>>,
    /// Keys whose filters emitted moved items
    moved_items: IndexMap<K, Vec<TimedValue<T, V>>>,
}

impl<K: Key, T: Time, V: Clone> FrameFilter<K, T, V> {
    pub fn new(cursor: FrameCursor<K, T, V>) -> Self {
        let chains = cursor
            .keys()
            .map(|key| (key.clone(), FilterChain::new()))
            .collect();

        FrameFilter {
            cursor,
            chains,
            current_time: None,
            current_items: IndexMap::new(),
            moved_items: IndexMap::new(),
        }
    }

    /// Attach a fresh filter built from `spec` to every key
    pub fn add_filter(&mut self, spec: &dyn FilterSpec<T, V>) -> &mut Self {
        for chain in self.chains.values_mut() {
            chain.add(spec);
        }
        self
    }

    /// Builder form of `add_filter`
    pub fn with_filter(mut self, spec: &dyn FilterSpec<T, V>) -> Self {
        self.add_filter(spec);
        self
    }

    /// Attach a fresh filter to one key only
    pub fn add_key_filter(&mut self, key: &K, spec: &dyn FilterSpec<T, V>) -> SyncResult<()> {
        let chain = self
            .chains
            .get_mut(key)
            .ok_or_else(|| SyncError::unknown_key(key))?;
        chain.add(spec);
        Ok(())
    }

    /// Number of filters attached to `key`
    pub fn filter_count(&self, key: &K) -> Option<usize> {
        self.chains.get(key).map(FilterChain::len)
    }

    pub fn cursor(&self) -> &FrameCursor<K, T, V> {
        &self.cursor
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.chains.keys()
    }

    /// Step the chains of every key the cursor just moved
    fn step_chains(&mut self, time: &T) -> SyncResult<()> {
        for (key, child) in self.cursor.advanced() {
            let Some(chain) = self.chains.get_mut(key) else {
                continue;
            };
            let emission = chain.step(time, child)?;
            if let Some(item) = emission.current {
                self.current_items.insert(key.clone(), item);
            }
            if !emission.moved.is_empty() {
                self.moved_items.insert(key.clone(), emission.moved);
            }
        }
        Ok(())
    }
}

impl<K: Key, T: Time, V: Clone> Synchronizable<T> for FrameFilter<K, T, V> {
    fn next_time(&self) -> Option<T> {
        self.cursor.next_time()
    }

    fn move_to_time(&mut self, time: T) -> SyncResult<()> {
        if self.chains.is_empty() || self.chains.values().any(FilterChain::is_empty) {
            return Err(SyncError::NoFiltersConfigured);
        }

        self.cursor.move_to_time(time.clone())?;
        self.current_time = Some(time.clone());
        self.current_items.clear();
        self.moved_items.clear();

        if let Err(e) = self.step_chains(&time) {
            // No partial step: keys stepped before the failure are dropped too
            self.current_items.clear();
            self.moved_items.clear();
            return Err(e);
        }
        Ok(())
    }

    fn current_time(&self) -> SyncResult<&T> {
        self.current_time.as_ref().ok_or(SyncError::CursorNotStarted)
    }
}

impl<K: Key, T: Time, V: Clone> FrameSource<K, T, V> for FrameFilter<K, T, V> {
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
