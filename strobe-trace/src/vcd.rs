//! value change dump writer
//!
//! writes IEEE 1364 VCD. the first dump emits every signal inside
//! `$dumpvars`; later dumps emit a `#<time>` marker followed by the
//! signals whose value changed since the previous dump. no `$date` is
//! written so identical runs produce identical files.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;
use std::str::FromStr;

use serde::{ Deserialize, Deserializer, Serialize, Serializer };
use ::vcd::{ IdCode, ReferenceIndex, SimulationCommand, TimescaleUnit, Value, VarType };

use crate::recorder::WaveformSink;
use crate::signal::*;
use crate::Error;

/// unit part of a timescale
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    S,
    Ms,
    Us,
    Ns,
    Ps,
    Fs,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "s",
            Self::Ms => "ms",
            Self::Us => "us",
            Self::Ns => "ns",
            Self::Ps => "ps",
            Self::Fs => "fs",
        }
    }
}

impl From<TimeUnit> for TimescaleUnit {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::S => TimescaleUnit::S,
            TimeUnit::Ms => TimescaleUnit::MS,
            TimeUnit::Us => TimescaleUnit::US,
            TimeUnit::Ns => TimescaleUnit::NS,
            TimeUnit::Ps => TimescaleUnit::PS,
            TimeUnit::Fs => TimescaleUnit::FS,
        }
    }
}

/// duration of one tick in the dump, e.g. `1ps` or `10ns`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Timescale {
    magnitude: u16,
    unit: TimeUnit,
}

impl Timescale {
    /// magnitude must be 1, 10 or 100
    pub fn new(magnitude: u16, unit: TimeUnit) -> Result<Self, Error> {
        if !matches!(magnitude, 1 | 10 | 100) {
            return Err(Error::Timescale(format!("{}{}", magnitude, unit.as_str())));
        }
        Ok(Self { magnitude, unit })
    }

    pub fn magnitude(&self) -> u16 {
        self.magnitude
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self { magnitude: 1, unit: TimeUnit::Ps }
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.as_str())
    }
}

impl FromStr for Timescale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);
        let magnitude = digits
            .parse::<u16>()
            .map_err(|_| Error::Timescale(s.to_owned()))?;
        let unit = match unit.trim() {
            "s" => TimeUnit::S,
            "ms" => TimeUnit::Ms,
            "us" => TimeUnit::Us,
            "ns" => TimeUnit::Ns,
            "ps" => TimeUnit::Ps,
            "fs" => TimeUnit::Fs,
            _ => return Err(Error::Timescale(s.to_owned())),
        };
        Self::new(magnitude, unit)
    }
}

impl<'de> Deserialize<'de> for Timescale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<str>::deserialize(deserializer)?;
        Self::from_str(&s).map_err(<D::Error as serde::de::Error>::custom)
    }
}

impl Serialize for Timescale {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Fresh,
    Open,
    Closed,
}

/// a [`WaveformSink`] producing VCD text through [`vcd::Writer`](::vcd::Writer)
pub struct VcdWriter<W: Write> {
    out: W,
    timescale: Timescale,
    codes: Vec<IdCode>,
    widths: Vec<u32>,
    prev: Option<Vec<u64>>,
    state: State,
}

impl VcdWriter<BufWriter<File>> {
    /// open a buffered file destination; failure here is fatal for a run
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| Error::Open(path.to_owned(), err))?;
        log::debug!("writing vcd to {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> VcdWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            timescale: Timescale::default(),
            codes: Vec::new(),
            widths: Vec::new(),
            prev: None,
            state: State::Fresh,
        }
    }

    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
        self
    }

    pub fn timescale(&self) -> Timescale {
        self.timescale
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn write_value<W: Write>(
    writer: &mut ::vcd::Writer<W>,
    code: IdCode,
    width: u32,
    value: u64,
) -> Result<(), Error> {
    if width == 1 {
        writer.change_scalar(code, value & 1 == 1)?;
    } else {
        let bits = (0..width).rev().map(|bit| Value::from((value >> bit) & 1 == 1));
        writer.change_vector(code, bits)?;
    }
    Ok(())
}

impl<W: Write> WaveformSink for VcdWriter<W> {
    fn open(&mut self, decls: &Declarations) -> Result<(), Error> {
        match self.state {
            State::Fresh => (),
            State::Open => return Err(Error::AlreadyOpen),
            State::Closed => return Err(Error::Finalized),
        }

        let mut writer = ::vcd::Writer::new(&mut self.out);
        writer.version(concat!("strobe-trace ", env!("CARGO_PKG_VERSION")))?;
        writer.timescale(self.timescale.magnitude() as u32, self.timescale.unit().into())?;

        let mut codes = Vec::with_capacity(decls.len());
        for item in decls.items() {
            match item {
                ScopeItem::Scope(name) => writer.add_module(name)?,
                ScopeItem::Upscope => writer.upscope()?,
                ScopeItem::Var(id) => {
                    let Some(decl) = decls.signal(*id) else {
                        continue;
                    };
                    let index = (!decl.is_scalar())
                        .then(|| ReferenceIndex::Range(decl.width as i32 - 1, 0));
                    codes.push(writer.add_var(VarType::Wire, decl.width, &decl.name, index)?);
                }
            }
        }
        writer.enddefinitions()?;

        self.codes = codes;
        self.widths = decls.signals().iter().map(|decl| decl.width).collect();
        self.state = State::Open;
        Ok(())
    }

    fn dump(&mut self, time: Time, snapshot: &Snapshot) -> Result<(), Error> {
        match self.state {
            State::Open => (),
            State::Fresh => return Err(Error::NotOpen),
            State::Closed => return Err(Error::Finalized),
        }
        if snapshot.len() != self.widths.len() {
            return Err(Error::SnapshotLength(snapshot.len(), self.widths.len()));
        }

        let values: Vec<u64> = snapshot
            .values()
            .iter()
            .zip(self.widths.iter())
            .map(|(value, width)| mask(*value, *width))
            .collect();

        let mut writer = ::vcd::Writer::new(&mut self.out);
        writer.timestamp(time)?;
        match self.prev.take() {
            None => {
                writer.begin(SimulationCommand::Dumpvars)?;
                for (index, value) in values.iter().enumerate() {
                    write_value(&mut writer, self.codes[index], self.widths[index], *value)?;
                }
                writer.end()?;
            }
            Some(prev) => {
                for (index, (value, old)) in values.iter().zip(prev.iter()).enumerate() {
                    if value != old {
                        write_value(&mut writer, self.codes[index], self.widths[index], *value)?;
                    }
                }
            }
        }
        self.prev = Some(values);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        if self.state == State::Closed {
            return Err(Error::Finalized);
        }
        self.state = State::Closed;
        self.out.flush()?;
        Ok(())
    }
}
