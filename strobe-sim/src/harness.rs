//! run context
//!
//! a [`Harness`] owns everything one run touches: the model, the clock,
//! the sequencer and the trace recorder. nothing is shared between runs,
//! so any number of harnesses can exist side by side.
//!
//! each tick is: sequencer decides inputs, inputs are driven, the model
//! evaluates, the recorder dumps at the current time, the clock advances.

use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::Arc;

use strobe_dut::{ Dut, Port, PortMap };
use strobe_trace::{ Probe, TraceRecorder, VcdWriter, WaveformSink };

use crate::config::RunConfig;
use crate::sequencer::{ Phase, Sequencer };
use crate::traits::Simulation;
use crate::types::{ Clock, Time };
use crate::Error;

/// what a finished (or cancelled) run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// ticks evaluated and recorded
    pub ticks: Time,
    /// instructions fully presented
    pub issued: usize,
    /// stopped through the cancel token before the sequence completed
    pub cancelled: bool,
    /// phases entered, with their first tick
    pub phases: Vec<(Phase, Time)>,
}

pub struct Harness<D: Dut, S: WaveformSink> {
    dut: D,
    clock: Clock,
    sequencer: Sequencer,
    recorder: TraceRecorder<S>,
    ports: PortMap,
    cancel: Arc<AtomicBool>,
}

impl<D: Dut> Harness<D, VcdWriter<BufWriter<File>>> {
    /// run context recording to the configured trace path as VCD
    ///
    /// the file is only created once the model has registered its tracing
    pub fn record_to_file(config: &RunConfig, dut: D) -> Result<Self, Error> {
        let (sequencer, dut, probe) = Self::prepare(config, dut)?;
        let path = config.trace_path()?;
        let sink = VcdWriter::create(&*path)
            .map_err(Error::Open)?
            .with_timescale(config.trace.timescale);
        Self::assemble(config, sequencer, dut, probe, sink)
    }
}

impl<D: Dut, S: WaveformSink> Harness<D, S> {
    /// validate `config`, register the model's tracing and open `sink`
    ///
    /// nothing is evaluated until the first [`Harness::step`]
    pub fn new(config: &RunConfig, dut: D, sink: S) -> Result<Self, Error> {
        let (sequencer, dut, probe) = Self::prepare(config, dut)?;
        Self::assemble(config, sequencer, dut, probe, sink)
    }

    // everything that can fail before a sink is touched
    fn prepare(config: &RunConfig, mut dut: D) -> Result<(Sequencer, D, Probe), Error> {
        let sequencer = Sequencer::new(config)?;

        let mut probe = Probe::new();
        probe
            .push_scope(config.trace.top.clone())
            .map_err(|err| Error::Trace(err, 0))?;
        dut.trace(&mut probe, config.trace.depth)
            .map_err(|err| Error::Dut(err, 0))?;
        probe.pop_scope().map_err(|err| Error::Trace(err, 0))?;
        Ok((sequencer, dut, probe))
    }

    fn assemble(
        config: &RunConfig,
        sequencer: Sequencer,
        dut: D,
        probe: Probe,
        sink: S,
    ) -> Result<Self, Error> {
        let recorder = TraceRecorder::attach(probe, sink).map_err(Error::Open)?;
        log::info!(
            "run configured: reset {} settle {} total {} ticks, {} instructions, {} traced signals",
            config.reset_ticks,
            config.settle_ticks,
            config.total_ticks,
            config.instructions.len(),
            recorder.declarations().len(),
        );

        Ok(Self {
            dut,
            clock: Clock::new(),
            sequencer,
            recorder,
            ports: config.ports.clone(),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn dut(&self) -> &D {
        &self.dut
    }

    pub fn recorder(&self) -> &TraceRecorder<S> {
        &self.recorder
    }

    /// raise the returned flag to stop the run at the next tick boundary
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn drive(&mut self, port: Port, value: u64) -> Result<(), Error> {
        let now = self.clock.now();
        self.dut
            .set_input(self.ports.name(port), value)
            .map_err(|err| Error::Dut(err, now))
    }

    /// evaluate and record one tick
    ///
    /// returns `Ok(false)` once the sequence is done or the trace has
    /// been finalized; the model is not touched in either case
    pub fn step(&mut self) -> Result<bool, Error> {
        if self.recorder.is_finalized() {
            return Ok(false);
        }
        let now = self.clock.now();
        let Some(stim) = self.sequencer.next(&self.clock) else {
            return Ok(false);
        };

        let level = self.clock.level();
        self.drive(Port::Clock, level.into())?;
        self.drive(Port::Reset, stim.reset.into())?;
        self.drive(Port::Instruction, stim.instruction)?;
        self.drive(Port::InstructionValid, stim.valid.into())?;

        self.dut.eval().map_err(|err| Error::Dut(err, now))?;
        self.recorder.dump(now).map_err(|err| Error::Trace(err, now))?;

        log::trace!(
            "tick {}: clk={} rst={} valid={} instruction={:#x}",
            now, level, stim.reset, stim.valid, stim.instruction,
        );
        self.clock.tick();
        Ok(true)
    }

    fn run_inner(&mut self) -> Result<bool, Error> {
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                log::info!("run cancelled at tick {}", self.clock.now());
                return Ok(true);
            }
            if !self.step()? {
                return Ok(false);
            }
        }
    }

    fn finalize(&mut self) -> Result<(), Error> {
        if self.recorder.is_finalized() {
            return Ok(());
        }
        let now = self.clock.now();
        self.recorder.finalize().map_err(|err| Error::Trace(err, now))
    }

    fn summary(&self, cancelled: bool) -> RunSummary {
        RunSummary {
            ticks: self.clock.now(),
            issued: self.sequencer.issued(),
            cancelled,
            phases: self.sequencer.history().to_vec(),
        }
    }

    /// finalize the trace and hand back the model and the sink
    pub fn finish(mut self) -> Result<(D, S), Error> {
        self.finalize()?;
        let Self { dut, recorder, clock, .. } = self;
        let sink = recorder
            .into_sink()
            .map_err(|err| Error::Trace(err, clock.now()))?;
        Ok((dut, sink))
    }
}

impl<D: Dut, S: WaveformSink> Simulation for Harness<D, S> {
    /// run to the end of the sequence; the trace is finalized on every
    /// exit path, including errors and cancellation
    fn run(&mut self) -> Result<RunSummary, Error> {
        let result = self.run_inner();
        let closed = self.finalize();
        let cancelled = result?;
        closed?;

        let summary = self.summary(cancelled);
        log::info!(
            "run {} after {} ticks, {} instructions issued",
            if cancelled { "cancelled" } else { "finished" },
            summary.ticks,
            summary.issued,
        );
        Ok(summary)
    }
}
