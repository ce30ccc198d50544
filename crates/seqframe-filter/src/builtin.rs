//! Built-in filters
//!
//! Each filter comes as a small spec type (its configuration) and a state
//! type built from it. Numeric filters read values through `Scalar`.

use std::collections::VecDeque;
use std::sync::Arc;

use seqframe_core::{Scalar, SyncResult, Time, TimedValue};
use seqframe_cursor::SeqSource;

use crate::{Filter, FilterSpec};

// ============================================================================
// CUMULATIVE SUM
// ============================================================================

/// Running total of every swept value
#[derive(Clone, Copy, Debug, Default)]
pub struct CumSum;

pub struct CumSumFilter<T, V> {
    total: V,
    current: Option<TimedValue<T, V>>,
}

impl<T: Time + 'static, V: Scalar + 'static> FilterSpec<T, V> for CumSum {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(CumSumFilter::<T, V> {
            total: V::default(),
            current: None,
        })
    }
}

impl<T: Time, V: Scalar> Filter<T, V> for CumSumFilter<T, V> {
    fn next(&mut self, time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()> {
        self.current = None;
        let moved = source.moved_items();
        if moved.is_empty() {
            return Ok(());
        }
        for item in moved {
            self.total = self.total + *item.value();
        }
        self.current = Some(TimedValue::new(time.clone(), self.total));
        Ok(())
    }

    fn current_item(&self) -> Option<&TimedValue<T, V>> {
        self.current.as_ref()
    }

    fn name(&self) -> &'static str {
        "cumsum"
    }
}

// ============================================================================
// LAG
// ============================================================================

/// Value observed `periods` items before the current one
#[derive(Clone, Copy, Debug)]
pub struct Lag {
    pub periods: usize,
}

impl Lag {
    pub fn new(periods: usize) -> Self {
        Lag { periods }
    }
}

pub struct LagFilter<T, V> {
    periods: usize,
    /// Last `periods` values, oldest first
    history: VecDeque<V>,
    current: Option<TimedValue<T, V>>,
}

impl<T: Time + 'static, V: Clone + 'static> FilterSpec<T, V> for Lag {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(LagFilter::<T, V> {
            periods: self.periods,
            history: VecDeque::with_capacity(self.periods + 1),
            current: None,
        })
    }
}

impl<T: Time, V: Clone> Filter<T, V> for LagFilter<T, V> {
    fn next(&mut self, time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()> {
        self.current = None;
        for item in source.moved_items() {
            if item.time() == time {
                let lagged = if self.periods == 0 {
                    Some(item.value().clone())
                } else if self.history.len() == self.periods {
                    self.history.front().cloned()
                } else {
                    None
                };
                self.current = lagged.map(|v| TimedValue::new(time.clone(), v));
            }
            if self.periods > 0 {
                self.history.push_back(item.value().clone());
                if self.history.len() > self.periods {
                    self.history.pop_front();
                }
            }
        }
        Ok(())
    }

    fn current_item(&self) -> Option<&TimedValue<T, V>> {
        self.current.as_ref()
    }

    fn name(&self) -> &'static str {
        "lag"
    }
}

// ============================================================================
// DIFF
// ============================================================================

/// Difference between the current value and the one before it
#[derive(Clone, Copy, Debug, Default)]
pub struct Diff;

pub struct DiffFilter<T, V> {
    previous: Option<V>,
    current: Option<TimedValue<T, V>>,
}

impl<T: Time + 'static, V: Scalar + 'static> FilterSpec<T, V> for Diff {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(DiffFilter::<T, V> {
            previous: None,
            current: None,
        })
    }
}

impl<T: Time, V: Scalar> Filter<T, V> for DiffFilter<T, V> {
    fn next(&mut self, time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()> {
        self.current = None;
        for item in source.moved_items() {
            let value = *item.value();
            if item.time() == time {
                self.current = self
                    .previous
                    .map(|prev| TimedValue::new(time.clone(), value - prev));
            }
            self.previous = Some(value);
        }
        Ok(())
    }

    fn current_item(&self) -> Option<&TimedValue<T, V>> {
        self.current.as_ref()
    }

    fn name(&self) -> &'static str {
        "diff"
    }
}

// ============================================================================
// ROLLING WINDOWS
// ============================================================================

/// How a full window is reduced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reduce {
    Sum,
    Mean,
}

/// Sum of the last `window` items
#[derive(Clone, Copy, Debug)]
pub struct RollingSum {
    pub window: usize,
}

impl RollingSum {
    /// A zero window is treated as one
    pub fn new(window: usize) -> Self {
        RollingSum {
            window: window.max(1),
        }
    }
}

/// Mean of the last `window` items
#[derive(Clone, Copy, Debug)]
pub struct RollingMean {
    pub window: usize,
}

impl RollingMean {
    /// A zero window is treated as one
    pub fn new(window: usize) -> Self {
        RollingMean {
            window: window.max(1),
        }
    }
}

pub struct RollingFilter<T, V> {
    window: usize,
    reduce: Reduce,
    values: VecDeque<V>,
    current: Option<TimedValue<T, V>>,
}

impl<T, V: Scalar> RollingFilter<T, V> {
    fn new(window: usize, reduce: Reduce) -> Self {
        let window = window.max(1);
        RollingFilter {
            window,
            reduce,
            values: VecDeque::with_capacity(window + 1),
            current: None,
        }
    }

    fn reduced(&self) -> V {
        let sum = self
            .values
            .iter()
            .fold(V::default(), |acc, v| acc + *v);
        match self.reduce {
            Reduce::Sum => sum,
            Reduce::Mean => V::from_f64(sum.to_f64() / self.values.len() as f64),
        }
    }
}

impl<T: Time + 'static, V: Scalar + 'static> FilterSpec<T, V> for RollingSum {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(RollingFilter::<T, V>::new(self.window, Reduce::Sum))
    }
}

impl<T: Time + 'static, V: Scalar + 'static> FilterSpec<T, V> for RollingMean {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(RollingFilter::<T, V>::new(self.window, Reduce::Mean))
    }
}

impl<T: Time, V: Scalar> Filter<T, V> for RollingFilter<T, V> {
    fn next(&mut self, time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()> {
        self.current = None;
        for item in source.moved_items() {
            self.values.push_back(*item.value());
            if self.values.len() > self.window {
                self.values.pop_front();
            }
            if item.time() == time && self.values.len() == self.window {
                self.current = Some(TimedValue::new(time.clone(), self.reduced()));
            }
        }
        Ok(())
    }

    fn current_item(&self) -> Option<&TimedValue<T, V>> {
        self.current.as_ref()
    }

    fn name(&self) -> &'static str {
        match self.reduce {
            Reduce::Sum => "rolling_sum",
            Reduce::Mean => "rolling_mean",
        }
    }
}

// ============================================================================
// EWMA
// ============================================================================

/// Exponentially weighted moving average, seeded by the first value
#[derive(Clone, Copy, Debug)]
pub struct Ewma {
    pub alpha: f64,
}

impl Ewma {
    /// `alpha` is clamped to [0, 1]
    pub fn new(alpha: f64) -> Self {
        Ewma {
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

pub struct EwmaFilter<T, V> {
    alpha: f64,
    state: Option<f64>,
    current: Option<TimedValue<T, V>>,
}

impl<T: Time + 'static, V: Scalar + 'static> FilterSpec<T, V> for Ewma {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(EwmaFilter::<T, V> {
            alpha: self.alpha,
            state: None,
            current: None,
        })
    }
}

impl<T: Time, V: Scalar> Filter<T, V> for EwmaFilter<T, V> {
    fn next(&mut self, time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()> {
        self.current = None;
        let moved = source.moved_items();
        if moved.is_empty() {
            return Ok(());
        }
        for item in moved {
            let x = item.value().to_f64();
            self.state = Some(match self.state {
                Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
                None => x,
            });
        }
        self.current = self
            .state
            .map(|s| TimedValue::new(time.clone(), V::from_f64(s)));
        Ok(())
    }

    fn current_item(&self) -> Option<&TimedValue<T, V>> {
        self.current.as_ref()
    }

    fn name(&self) -> &'static str {
        "ewma"
    }
}

// ============================================================================
// PASSTHROUGH / MAP
// ============================================================================

/// Re-emits the source's own current and moved items
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

pub struct PassthroughFilter<T, V> {
    current: Option<TimedValue<T, V>>,
    moved: Vec<TimedValue<T, V>>,
}

impl<T: Time + 'static, V: Clone + 'static> FilterSpec<T, V> for Passthrough {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(PassthroughFilter::<T, V> {
            current: None,
            moved: Vec::new(),
        })
    }
}

impl<T: Time, V: Clone> Filter<T, V> for PassthroughFilter<T, V> {
    fn next(&mut self, _time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()> {
        self.current = source.current_item()?.cloned();
        self.moved.clear();
        self.moved.extend_from_slice(source.moved_items());
        Ok(())
    }

    fn current_item(&self) -> Option<&TimedValue<T, V>> {
        self.current.as_ref()
    }

    fn moved_items(&self) -> &[TimedValue<T, V>] {
        &self.moved
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Applies a function to the current item's value
pub struct Map<V> {
    f: Arc<dyn Fn(&V) -> V + Send + Sync>,
}

impl<V> Map<V> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&V) -> V + Send + Sync + 'static,
    {
        Map { f: Arc::new(f) }
    }
}

impl<V> Clone for Map<V> {
    fn clone(&self) -> Self {
        Map {
            f: Arc::clone(&self.f),
        }
    }
}

pub struct MapFilter<T, V> {
    f: Arc<dyn Fn(&V) -> V + Send + Sync>,
    current: Option<TimedValue<T, V>>,
}

impl<T: Time + 'static, V: 'static> FilterSpec<T, V> for Map<V> {
    fn build(&self) -> Box<dyn Filter<T, V>> {
        Box::new(MapFilter::<T, V> {
            f: Arc::clone(&self.f),
            current: None,
        })
    }
}

impl<T: Time, V> Filter<T, V> for MapFilter<T, V> {
    fn next(&mut self, _time: &T, source: &dyn SeqSource<T, V>) -> SyncResult<()> {
        self.current = source
            .current_item()?
            .map(|item| item.with_value((self.f)(item.value())));
        Ok(())
    }

    fn current_item(&self) -> Option<&TimedValue<T, V>> {
        self.current.as_ref()
    }

    fn name(&self) -> &'static str {
        "map"
    }
}
