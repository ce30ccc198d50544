//! seqframe Test Harness - generated workloads and reference checks
//!
//! This crate provides:
//! - Seeded stream, frame and cube generation
//! - Naive reference merges and filters to check the engine against
//! - Step recording for comparing sources

pub mod generator;
pub mod reference;

pub use generator::*;
pub use reference::*;
