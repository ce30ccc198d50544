//! Filter protocol and filter factories

use seqframe_core::{SyncError, SyncResult, TimedValue};
use seqframe_cursor::SeqSource;

use crate::{resolve_emissions, Emission};

/// Stateful rolling computation stepped once per cursor advance
pub trait Filter<T, V> {
    /// Consume one step. `source` is already positioned at `time`.
    fn next(&mut self, time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()>;

    /// Proposed item at the step time
    fn current_item(&self) -> Option<&TimedValue<T, V>>;

    /// Proposed intermediate items for the step
    fn moved_items(&self) -> &[TimedValue<T, V>] {
        &[]
    }

    fn name(&self) -> &'static str;
}

/// Factory for filters.
///
/// One spec seeds any number of keys; every `build` returns a filter with
/// fresh state, so rolling state never leaks between keys.
pub trait FilterSpec<T, V> {
    fn build(&self) -> Box<dyn Filter<T, V>>;
}

impl<T, V, F> FilterSpec<T, V> for F
where
    F: Fn() -> Box<dyn Filter<T, V>>,
{
    fn build(&self) -> Box<dyn Filter<T, V>> {
        self()
    }
}

/// Ordered list of filters attached to one stream
pub struct FilterChain<T, V> {
    filters: Vec<Box<dyn Filter<T, V>>>,
}

impl<T: Clone, V: Clone> FilterChain<T, V> {
    pub fn new() -> Self {
        FilterChain {
            filters: Vec::new(),
        }
    }

    /// Instantiate `spec` and append it
    pub fn add(&mut self, spec: &dyn FilterSpec<T, V>) {
        self.filters.push(spec.build());
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|f| f.name())
    }

    /// Step every filter in registration order and merge their proposals.
    /// The merged sweep always includes the current item, so chains stack.
    pub fn step(&mut self, time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<Emission<T, V>> {
        if self.filters.is_empty() {
            return Err(SyncError::NoFiltersConfigured);
        }

        for filter in self.filters.iter_mut() {
            filter.next(time, source)?;
        }

        let mut emission = resolve_emissions(
            self.filters
                .iter()
                .map(|f| (f.current_item(), f.moved_items())),
        )
        .map_err(|e| {
            tracing::warn!(filters = ?self.names().collect::<Vec<_>>(), "{}", e);
            e
        })?;
        emission.sweep_current();
        Ok(emission)
    }
}

impl<T: Clone, V: Clone> Default for FilterChain<T, V> {
    fn default() -> Self {
        Self::new()
    }
}
