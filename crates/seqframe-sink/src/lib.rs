//! seqframe Sink - drive cursors and collect what they emit
//!
//! This crate implements the sink layer:
//! - Sequence outputs and samplers
//! - Frame outputs and samplers
//! - Externally driven frame transforms
//! - Convenience extensions for one-shot filtering

pub mod seq_sink;
pub mod frame_sink;
pub mod transform;
pub mod ext;

pub use seq_sink::*;
pub use frame_sink::*;
pub use transform::*;
pub use ext::*;
