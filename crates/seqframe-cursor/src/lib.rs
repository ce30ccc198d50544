//! seqframe Cursor - monotonic time cursors and synchronization
//!
//! This crate implements the cursor layer:
//! - The Synchronizable protocol (peek next time, move to time)
//! - Sequence cursors with per-step sweep buffers
//! - Frame cursors merging any number of sequences by time
//! - Merge strategy configuration

pub mod sync;
pub mod cursor;
pub mod frame_cursor;

pub use sync::*;
pub use cursor::*;
pub use frame_cursor::*;
