//! Timed values and the numeric value trait

use std::ops::{Add, Sub};

/// A single observation: an immutable (time, value) pair.
///
/// There is no "empty" timed value. A missing observation is the absence of
/// a `TimedValue` at that time, never a value-less one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimedValue<T, V> {
    time: T,
    value: V,
}

impl<T, V> TimedValue<T, V> {
    #[inline]
    pub fn new(time: T, value: V) -> Self {
        TimedValue { time, value }
    }

    #[inline]
    pub fn time(&self) -> &T {
        &self.time
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Same time, new value
    pub fn with_value<U>(&self, value: U) -> TimedValue<T, U>
    where
        T: Clone,
    {
        TimedValue::new(self.time.clone(), value)
    }

    pub fn into_parts(self) -> (T, V) {
        (self.time, self.value)
    }
}

impl<T, V> From<(T, V)> for TimedValue<T, V> {
    fn from((time, value): (T, V)) -> Self {
        TimedValue::new(time, value)
    }
}

/// Values a filter can interpret numerically
pub trait Scalar:
    Copy + PartialOrd + Default + std::fmt::Debug + Add<Output = Self> + Sub<Output = Self>
{
    fn to_f64(self) -> f64;

    /// Lossy for integer types: truncates toward zero
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_scalar!(f64, f32, i64, i32);
