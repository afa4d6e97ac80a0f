//! simulation traits

use crate::harness::RunSummary;
use crate::Error;

/// simulation trait
///
/// a simulation runs its configured sequence to completion (or until it
/// is cancelled) and reports what it did
pub trait Simulation {
    /// run the simulation until its halt condition
    fn run(&mut self) -> Result<RunSummary, Error>;
}
