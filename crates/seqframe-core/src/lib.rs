//! seqframe Core - Fundamental types and containers
//!
//! This crate defines the data model shared by every seqframe layer:
//! - Time primitives (Timestamp) and the value traits (Time, Scalar)
//! - Timed values and append-only sequences
//! - Keyed frames and two-level cubes
//! - The engine error taxonomy

pub mod time;
pub mod item;
pub mod sequence;
pub mod frame;
pub mod cube;
pub mod error;

pub use time::*;
pub use item::*;
pub use sequence::*;
pub use frame::*;
pub use cube::*;
pub use error::*;
