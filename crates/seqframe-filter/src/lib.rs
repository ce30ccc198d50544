//! seqframe Filter - rolling computations over cursors
//!
//! This crate implements the filter layer:
//! - The Filter protocol and FilterSpec factories
//! - Single-producer emission resolution
//! - Built-in filters (cumulative sum, lag, diff, rolling windows, EWMA)
//! - Filtered sequence and frame cursors

pub mod filter;
pub mod emission;
pub mod builtin;
pub mod seq_filter;
pub mod frame_filter;

pub use filter::*;
pub use emission::*;
pub use builtin::*;
pub use seq_filter::*;
pub use frame_filter::*;
