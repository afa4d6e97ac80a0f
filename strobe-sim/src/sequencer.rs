//! stimulus sequencer
//!
//! the phase machine deciding reset, instruction word and valid strobe for
//! every tick. phases run in a fixed order:
//!
//! | phase | inputs | leaves after |
//! |---|---|---|
//! | reset assert | `reset = 1` | `reset_ticks` ticks |
//! | reset settle | `reset = 0` | `settle_ticks` ticks |
//! | issue | word `i`, `valid = 1`, held for two ticks | the last word |
//! | drain | word `0`, `valid = 0` | `total_ticks` reached |
//! | done | nothing, no more ticks | terminal |
//!
//! an empty instruction stream skips the issue phase entirely.

use std::fmt;

use crate::config::{ ConfigError, RunConfig, StrobePolicy };
use crate::types::{ Clock, Level, Time };

/// named interval of a run
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    ResetAssert,
    ResetSettle,
    Issue,
    Drain,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::ResetAssert => "reset-assert",
            Self::ResetSettle => "reset-settle",
            Self::Issue => "issue",
            Self::Drain => "drain",
            Self::Done => "done",
        })
    }
}

/// inputs to apply before one evaluation
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Stimulus {
    pub reset: Level,
    pub instruction: u64,
    pub valid: Level,
}

impl Stimulus {
    /// reset released, no instruction traffic
    pub const IDLE: Stimulus = Stimulus {
        reset: Level::Low,
        instruction: 0,
        valid: Level::Low,
    };

    /// reset asserted, no instruction traffic
    pub const RESET: Stimulus = Stimulus {
        reset: Level::High,
        instruction: 0,
        valid: Level::Low,
    };
}

pub struct Sequencer {
    reset_ticks: u64,
    settle_ticks: u64,
    total_ticks: u64,
    stream: Vec<u64>,
    policy: StrobePolicy,

    phase: Phase,
    /// ticks spent in the current phase
    elapsed: u64,
    /// next word to present
    cursor: usize,
    /// the current word has had its first tick
    second_half: bool,
    history: Vec<(Phase, Time)>,
}

impl Sequencer {
    /// build a sequencer from a validated configuration
    pub fn new(config: &RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            reset_ticks: config.reset_ticks,
            settle_ticks: config.settle_ticks,
            total_ticks: config.total_ticks,
            stream: config.words().collect(),
            policy: config.strobe,
            phase: Phase::ResetAssert,
            elapsed: 0,
            cursor: 0,
            second_half: false,
            history: vec![(Phase::ResetAssert, 0)],
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// words whose full issue period has been presented
    pub fn issued(&self) -> usize {
        self.cursor
    }

    /// words not yet fully presented
    pub fn remaining(&self) -> usize {
        self.stream.len() - self.cursor
    }

    /// every phase entered so far with the tick it was entered at
    pub fn history(&self) -> &[(Phase, Time)] {
        &self.history
    }

    fn enter(&mut self, phase: Phase, now: Time) {
        log::debug!("tick {}: {} -> {}", now, self.phase, phase);
        self.phase = phase;
        self.elapsed = 0;
        self.history.push((phase, now));
    }

    // leave every phase whose window is used up
    fn advance(&mut self, now: Time) {
        loop {
            match self.phase {
                Phase::ResetAssert if self.elapsed >= self.reset_ticks => {
                    self.enter(Phase::ResetSettle, now)
                }
                Phase::ResetSettle if self.elapsed >= self.settle_ticks => {
                    self.enter(Phase::Issue, now)
                }
                Phase::Issue if self.cursor >= self.stream.len() => {
                    self.enter(Phase::Drain, now)
                }
                Phase::Drain if now >= self.total_ticks => {
                    self.enter(Phase::Done, now)
                }
                _ => break,
            }
        }
    }

    /// inputs for the tick at `clock.now()`, or `None` once the run is done
    ///
    /// call once per tick, advancing the clock in between
    pub fn next(&mut self, clock: &Clock) -> Option<Stimulus> {
        if self.phase == Phase::Done {
            return None;
        }
        let now = clock.now();
        self.advance(now);

        let stimulus = match self.phase {
            Phase::ResetAssert => Stimulus::RESET,
            Phase::ResetSettle | Phase::Drain => Stimulus::IDLE,
            Phase::Issue => {
                let valid = match self.policy {
                    StrobePolicy::FirstHalf if self.second_half => Level::Low,
                    _ => Level::High,
                };
                let stimulus = Stimulus {
                    reset: Level::Low,
                    instruction: self.stream[self.cursor],
                    valid,
                };
                if self.second_half {
                    self.cursor += 1;
                }
                self.second_half = !self.second_half;
                stimulus
            }
            Phase::Done => return None,
        };
        self.elapsed += 1;
        Some(stimulus)
    }
}
