//! dut traits
//!
//! defines the capability interface of a device-under-test

use strobe_trace::Probe;

use crate::Error;

/// a synchronous circuit model driven by the harness
///
/// the harness only writes declared inputs and only sees what the model
/// registers for tracing. faults inside the model (traps, illegal states)
/// are exposed as traced signals, not as errors; `Err` is reserved for
/// driving an input that does not exist and for trace plumbing failures.
pub trait Dut {
    /// drive a named input; takes effect at the next evaluation
    fn set_input(&mut self, name: &str, value: u64) -> Result<(), Error>;

    /// propagate the current inputs through the model and publish
    /// the traced signal values
    fn eval(&mut self) -> Result<(), Error>;

    /// register traced signals with `probe`, down to `depth` scope levels
    fn trace(&mut self, probe: &mut Probe, depth: usize) -> Result<(), Error>;
}

impl<D: Dut + ?Sized> Dut for Box<D> {
    fn set_input(&mut self, name: &str, value: u64) -> Result<(), Error> {
        (**self).set_input(name, value)
    }

    fn eval(&mut self) -> Result<(), Error> {
        (**self).eval()
    }

    fn trace(&mut self, probe: &mut Probe, depth: usize) -> Result<(), Error> {
        (**self).trace(probe, depth)
    }
}
