//! generic models
//!
//! small deterministic models that stand in for a generated core

pub mod reg;
pub mod pipeline;

pub use reg::Reg;
pub use pipeline::{ Pipeline, Slot };
