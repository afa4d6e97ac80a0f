//! generic instruction pipeline
//!
//! a fixed-depth shift pipeline. on every rising clock edge the model
//! latches `(instruction_valid, instruction)` into stage 0 and moves every
//! other stage one step further; a valid word leaving the last stage is
//! counted as retired. reset clears all stages and counters on the edge.
//! an all-ones word retiring raises the sticky `trap` output, which is only
//! reported through the trace.

use strobe_trace::{ mask, Probe, SignalId, Tap };

use crate::port::{ Port, PortMap };
use crate::traits::Dut;
use crate::Error;

/// contents of one pipeline stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot {
    pub valid: bool,
    pub word: u64,
}

struct Signals {
    tap: Tap,
    inputs: Option<[SignalId; 4]>,
    retired: Option<SignalId>,
    trap: Option<SignalId>,
    stages: Vec<(SignalId, SignalId)>,
}

pub struct Pipeline {
    ports: PortMap,
    word_width: u32,

    clk: bool,
    rst: bool,
    instruction: u64,
    valid: bool,
    prev_clk: bool,

    stages: Vec<super::Reg<Slot>>,
    retired: super::Reg<u64>,
    trap: super::Reg<bool>,

    signals: Option<Signals>,
}

impl Pipeline {
    /// a pipeline with `depth` stages (at least one) and 32-bit words
    pub fn new(depth: usize) -> Self {
        Self {
            ports: PortMap::default(),
            word_width: 32,
            clk: false,
            rst: false,
            instruction: 0,
            valid: false,
            prev_clk: false,
            stages: vec![super::Reg::default(); depth.max(1)],
            retired: super::Reg::default(),
            trap: super::Reg::default(),
            signals: None,
        }
    }

    /// instruction word width in bits, 1..=64
    pub fn with_word_width(mut self, width: u32) -> Result<Self, Error> {
        if width == 0 || width > strobe_trace::MAX_WIDTH {
            return Err(Error::model_with(format!("invalid word width {}", width)));
        }
        self.word_width = width;
        Ok(self)
    }

    /// rename the model's inputs
    pub fn with_ports(mut self, ports: PortMap) -> Self {
        self.ports = ports;
        self
    }

    pub fn depth(&self) -> usize {
        self.stages.len()
    }

    pub fn retired(&self) -> u64 {
        self.retired.sample()
    }

    pub fn trapped(&self) -> bool {
        self.trap.sample()
    }

    pub fn stage(&self, index: usize) -> Option<Slot> {
        self.stages.get(index).map(|reg| reg.sample())
    }

    fn edge(&mut self) {
        if self.rst {
            for stage in self.stages.iter_mut() {
                stage.drive(Slot::default());
            }
            self.retired.drive(0);
            self.trap.drive(false);
        } else {
            let last = self.stages[self.stages.len() - 1].sample();
            if last.valid {
                self.retired.drive(self.retired.sample().wrapping_add(1));
                if last.word == mask(u64::MAX, self.word_width) {
                    self.trap.drive(true);
                }
            }
            for index in (1..self.stages.len()).rev() {
                let prev = self.stages[index - 1].sample();
                self.stages[index].drive(prev);
            }
            self.stages[0].drive(Slot {
                valid: self.valid,
                word: self.instruction,
            });
        }

        for stage in self.stages.iter_mut() {
            stage.update();
        }
        self.retired.update();
        self.trap.update();
    }

    fn publish(&self) -> Result<(), Error> {
        let Some(signals) = &self.signals else {
            return Ok(());
        };

        let mut snap = signals.tap.snapshot();
        if let Some([clk, rst, instruction, valid]) = signals.inputs {
            snap.set(clk, self.clk as u64);
            snap.set(rst, self.rst as u64);
            snap.set(instruction, self.instruction);
            snap.set(valid, self.valid as u64);
        }
        if let Some(retired) = signals.retired {
            snap.set(retired, self.retired.sample());
        }
        if let Some(trap) = signals.trap {
            snap.set(trap, self.trap.sample() as u64);
        }
        for ((valid, word), stage) in signals.stages.iter().zip(self.stages.iter()) {
            let slot = stage.sample();
            snap.set(*valid, slot.valid as u64);
            snap.set(*word, slot.word);
        }
        signals.tap.emit(snap)?;
        Ok(())
    }
}

impl Dut for Pipeline {
    fn set_input(&mut self, name: &str, value: u64) -> Result<(), Error> {
        let port = self.ports
            .port(name)
            .ok_or_else(|| Error::UnknownPort(name.to_owned()))?;
        let width = match port {
            Port::Instruction => self.word_width,
            _ => 1,
        };
        if mask(value, width) != value {
            return Err(Error::Width(name.to_owned(), value, width));
        }

        match port {
            Port::Clock => self.clk = value != 0,
            Port::Reset => self.rst = value != 0,
            Port::Instruction => self.instruction = value,
            Port::InstructionValid => self.valid = value != 0,
        }
        Ok(())
    }

    fn eval(&mut self) -> Result<(), Error> {
        if self.clk && !self.prev_clk {
            self.edge();
        }
        self.prev_clk = self.clk;
        self.publish()
    }

    fn trace(&mut self, probe: &mut Probe, depth: usize) -> Result<(), Error> {
        let mut inputs = None;
        let mut retired = None;
        let mut trap = None;
        let mut stages = Vec::new();

        if depth >= 1 {
            inputs = Some([
                probe.declare(self.ports.clock.clone(), 1)?,
                probe.declare(self.ports.reset.clone(), 1)?,
                probe.declare(self.ports.instruction.clone(), self.word_width)?,
                probe.declare(self.ports.instruction_valid.clone(), 1)?,
            ]);
            retired = Some(probe.declare("retired", 32)?);
            trap = Some(probe.declare("trap", 1)?);
        }
        if depth >= 2 {
            probe.push_scope("pipe")?;
            for index in 0..self.stages.len() {
                let valid = probe.declare(format!("stage{}_valid", index), 1)?;
                let word = probe.declare(format!("stage{}_word", index), self.word_width)?;
                stages.push((valid, word));
            }
            probe.pop_scope()?;
        }

        log::debug!(
            "pipeline ({} stages) traced at depth {}: {} signals",
            self.stages.len(), depth, probe.declarations().len(),
        );
        self.signals = Some(Signals {
            tap: probe.tap(),
            inputs,
            retired,
            trap,
            stages,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strobe_trace::{ TraceLog, TraceRecorder };

    fn cycle(dut: &mut Pipeline, valid: bool, word: u64) {
        dut.set_input("instruction_valid", valid as u64).expect("valid");
        dut.set_input("instruction", word).expect("instruction");
        dut.set_input("clk", 1).expect("clk high");
        dut.eval().expect("eval");
        dut.set_input("clk", 0).expect("clk low");
        dut.eval().expect("eval");
    }

    #[test]
    fn words_shift_through_and_retire() {
        let mut dut = Pipeline::new(3);
        cycle(&mut dut, true, 0xa);
        cycle(&mut dut, true, 0xb);
        cycle(&mut dut, false, 0);

        assert_eq!(dut.stage(0), Some(Slot { valid: false, word: 0 }));
        assert_eq!(dut.stage(1), Some(Slot { valid: true, word: 0xb }));
        assert_eq!(dut.stage(2), Some(Slot { valid: true, word: 0xa }));
        assert_eq!(dut.retired(), 0);

        cycle(&mut dut, false, 0);
        cycle(&mut dut, false, 0);
        assert_eq!(dut.retired(), 2);
        assert!(!dut.trapped());
    }

    #[test]
    fn reset_clears_on_edge() {
        let mut dut = Pipeline::new(2);
        cycle(&mut dut, true, 0x1);
        dut.set_input("rst", 1).expect("rst");
        // no edge yet, state is held
        dut.eval().expect("eval");
        assert_eq!(dut.stage(0), Some(Slot { valid: true, word: 0x1 }));
        cycle(&mut dut, true, 0x2);
        assert_eq!(dut.stage(0), Some(Slot::default()));
    }

    #[test]
    fn all_ones_word_traps_without_error() {
        let mut dut = Pipeline::new(1).with_word_width(8).expect("width");
        cycle(&mut dut, true, 0xff);
        cycle(&mut dut, false, 0);
        assert!(dut.trapped());
        assert_eq!(dut.retired(), 1);
    }

    #[test]
    fn rejects_unknown_and_wide_inputs() {
        let mut dut = Pipeline::new(1).with_word_width(16).expect("width");
        assert!(matches!(dut.set_input("clock", 1), Err(Error::UnknownPort(_))));
        assert!(matches!(dut.set_input("clk", 2), Err(Error::Width(_, 2, 1))));
        assert!(matches!(dut.set_input("instruction", 0x1_0000), Err(Error::Width(_, _, 16))));
        dut.set_input("instruction", 0xffff).expect("fits");
    }

    #[test]
    fn trace_depth_controls_visibility() {
        let mut shallow = Pipeline::new(4);
        let mut probe = Probe::new();
        shallow.trace(&mut probe, 1).expect("trace");
        assert_eq!(probe.declarations().len(), 6);

        let mut deep = Pipeline::new(4);
        let mut probe = Probe::new();
        deep.trace(&mut probe, 5).expect("trace");
        assert_eq!(probe.declarations().len(), 6 + 8);
        assert!(probe.declarations().lookup("pipe.stage3_word").is_some());
    }

    #[test]
    fn renamed_ports_are_traced_and_driven() {
        let ports = PortMap {
            clock: "clock".into(),
            reset: "reset_i".into(),
            instruction: "insn".into(),
            instruction_valid: "insn_v".into(),
        };
        let mut dut = Pipeline::new(1).with_ports(ports);
        let mut probe = Probe::new();
        probe.push_scope("TOP").expect("scope TOP");
        dut.trace(&mut probe, 1).expect("trace");
        let insn = probe.declarations().lookup("TOP.insn").expect("insn traced");

        let mut rec = TraceRecorder::attach(probe, TraceLog::new()).expect("attach");
        dut.set_input("insn", 0x42).expect("insn");
        dut.eval().expect("eval");
        rec.dump(0).expect("dump");

        let log = rec.into_sink().expect("sink");
        assert_eq!(log.column(insn), vec![0x42]);
    }
}
