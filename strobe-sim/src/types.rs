//! simulation types
//!
//! time and the clock signal

use std::fmt;
use std::ops::Not;

use serde::{ Deserialize, Serialize };

pub use strobe_trace::Time;

/// logic level of a single-bit signal
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub fn toggle(self) -> Self {
        !self
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl Not for Level {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl From<Level> for u64 {
    fn from(level: Level) -> Self {
        level.is_high() as u64
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_high() { "1" } else { "0" })
    }
}

/// a simulation clock is a time source
///
/// time advances one tick per clock half-period and the clock level flips
/// on every tick. the level reported for a tick is the one presented to
/// the model during that tick; it is flipped from the idle level before
/// the first evaluation, so tick 0 sees the first edge.
#[derive(Debug, Clone)]
pub struct Clock {
    now: Time,
    level: Level,
}

impl Clock {
    /// create a clock idling low
    pub fn new() -> Self {
        Self::with_idle(Level::Low)
    }

    /// create a clock with the given idle level
    pub fn with_idle(idle: Level) -> Self {
        Self {
            now: 0,
            level: !idle,
        }
    }

    /// current tick
    pub fn now(&self) -> Time {
        self.now
    }

    /// level presented during the current tick
    pub fn level(&self) -> Level {
        self.level
    }

    /// full clock periods elapsed
    pub fn cycles(&self) -> Time {
        self.now / 2
    }

    /// advance by one half-period
    pub fn tick(&mut self) {
        self.now += 1;
        self.level = !self.level;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
