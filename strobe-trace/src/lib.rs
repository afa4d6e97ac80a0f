//! trace module
//!
//! signal registration, waveform sinks and the trace recorder
//! that binds each evaluation of a model to a timestamped snapshot

pub mod error;
pub mod signal;
pub mod probe;
pub mod recorder;
pub mod vcd;
pub mod memory;

pub use error::Error;
pub use signal::*;
pub use probe::{ is_valid_name, Probe, Tap };
pub use recorder::{ TraceRecorder, WaveformSink };
pub use vcd::{ Timescale, TimeUnit, VcdWriter };
pub use memory::{ TraceEntry, TraceLog };

/// widest signal that can be traced, in bits
pub const MAX_WIDTH: u32 = 64;
