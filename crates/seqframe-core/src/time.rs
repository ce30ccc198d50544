//! Time primitives for seqframe
//!
//! The engine is generic over any totally ordered time type. `Timestamp` is
//! the stock calendar stand-in: microseconds relative to the Unix epoch.

/// Anything that can index a sequence: totally ordered, cloneable, printable
pub trait Time: Ord + Clone + std::fmt::Debug {}

impl<T: Ord + Clone + std::fmt::Debug> Time for T {}

/// Timestamp - microseconds since the Unix epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ts({}us)", self.0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}us", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_micros() {
        let t = Timestamp::from_micros(1_500_000);
        assert_eq!(t.as_micros(), 1_500_000);
        assert_eq!(Timestamp::from_micros(0), Timestamp::EPOCH);
        assert!(Timestamp::from_micros(-1) < Timestamp::EPOCH);
    }

    #[test]
    fn test_timestamp_formatting() {
        let t = Timestamp::from_micros(42);
        assert_eq!(format!("{:?}", t), "ts(42us)");
        assert_eq!(t.to_string(), "42us");
    }
}
