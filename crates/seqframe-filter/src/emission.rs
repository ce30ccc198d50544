//! Single-producer emission resolution

use seqframe_core::{EmissionKind, SyncError, SyncResult, TimedValue};

/// What a set of filters emitted for one step
#[derive(Clone, Debug, PartialEq)]
pub struct Emission<T, V> {
    pub current: Option<TimedValue<T, V>>,
    pub moved: Vec<TimedValue<T, V>>,
}

impl<T, V> Emission<T, V> {
    pub fn empty() -> Self {
        Emission {
            current: None,
            moved: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.moved.is_empty()
    }

    /// A current item with no moved items counts as a one-item sweep
    pub fn sweep_current(&mut self)
    where
        T: Clone,
        V: Clone,
    {
        if self.moved.is_empty() {
            if let Some(item) = &self.current {
                self.moved.push(item.clone());
            }
        }
    }
}

impl<T, V> Default for Emission<T, V> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Merge per-filter proposals, in registration order, into one emission.
///
/// At most one proposal may carry a current item and at most one may carry
/// moved items. Anything else is `AmbiguousEmission`, naming the first two
/// colliding filter positions.
pub fn resolve_emissions<'a, T, V, I>(proposals: I) -> SyncResult<Emission<T, V>>
where
    T: Clone + 'a,
    V: Clone + 'a,
    I: IntoIterator<Item = (Option<&'a TimedValue<T, V>>, &'a [TimedValue<T, V>])>,
{
    let mut current: Option<(usize, &TimedValue<T, V>)> = None;
    let mut moved: Option<(usize, &[TimedValue<T, V>])> = None;

    for (idx, (item, items)) in proposals.into_iter().enumerate() {
        if let Some(item) = item {
            if let Some((first, _)) = current {
                return Err(SyncError::AmbiguousEmission {
                    kind: EmissionKind::CurrentItem,
                    first,
                    second: idx,
                });
            }
            current = Some((idx, item));
        }
        if !items.is_empty() {
            if let Some((first, _)) = moved {
                return Err(SyncError::AmbiguousEmission {
                    kind: EmissionKind::MovedItems,
                    first,
                    second: idx,
                });
            }
            moved = Some((idx, items));
        }
    }

    Ok(Emission {
        current: current.map(|(_, item)| item.clone()),
        moved: moved.map(|(_, items)| items.to_vec()).unwrap_or_default(),
    })
}
