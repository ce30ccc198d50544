//! Error types for the seqframe engine
//!
//! Every variant is a programmer-error invariant violation. None is retried
//! internally; all surface to the caller of the failing operation.

use thiserror::Error;

/// Which half of a filter emission collided
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmissionKind {
    /// A current item at the step time
    CurrentItem,
    /// A list of moved (intermediate) items
    MovedItems,
}

impl std::fmt::Display for EmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmissionKind::CurrentItem => f.write_str("current item"),
            EmissionKind::MovedItems => f.write_str("moved items"),
        }
    }
}

/// Core seqframe errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    // Sequence errors
    #[error("Time order violation: {attempted} is not after {last}")]
    TimeOrderViolation { last: String, attempted: String },

    // Cursor errors
    #[error("Duplicate time collision at {0}")]
    DuplicateTimeCollision(String),

    #[error("Non-monotonic advance: {requested} is not after {current}")]
    NonMonotonicAdvance { current: String, requested: String },

    #[error("Cursor not started")]
    CursorNotStarted,

    // Filter errors
    #[error("Ambiguous emission: filters {first} and {second} both propose a {kind}")]
    AmbiguousEmission {
        kind: EmissionKind,
        first: usize,
        second: usize,
    },

    #[error("No filters configured")]
    NoFiltersConfigured,

    // Container errors
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
}

impl SyncError {
    pub fn time_order<T: std::fmt::Debug>(last: &T, attempted: &T) -> Self {
        SyncError::TimeOrderViolation {
            last: format!("{:?}", last),
            attempted: format!("{:?}", attempted),
        }
    }

    pub fn non_monotonic<T: std::fmt::Debug>(current: &T, requested: &T) -> Self {
        SyncError::NonMonotonicAdvance {
            current: format!("{:?}", current),
            requested: format!("{:?}", requested),
        }
    }

    pub fn duplicate_time<T: std::fmt::Debug>(time: &T) -> Self {
        SyncError::DuplicateTimeCollision(format!("{:?}", time))
    }

    pub fn unknown_key<K: std::fmt::Debug>(key: &K) -> Self {
        SyncError::UnknownKey(format!("{:?}", key))
    }

    pub fn duplicate_key<K: std::fmt::Debug>(key: &K) -> Self {
        SyncError::DuplicateKey(format!("{:?}", key))
    }
}

/// Result type for seqframe operations
pub type SyncResult<T> = Result<T, SyncError>;
