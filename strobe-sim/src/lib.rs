//! simulation module
//!
//! the simulation module owns time, the stimulus phase machine and the
//! run context tying a device-under-test to a trace recorder

pub mod config;
pub mod error;
pub mod harness;
pub mod sequencer;
pub mod traits;
pub mod types;

pub use config::{ ConfigError, RunConfig, StrobePolicy, TraceConfig, Word };
pub use error::Error;
pub use harness::{ Harness, RunSummary };
pub use sequencer::{ Phase, Sequencer, Stimulus };
pub use traits::Simulation;
pub use types::*;
