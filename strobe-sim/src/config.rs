//! run configuration
//!
//! window lengths, the instruction stream and trace settings for one run.
//! everything here is checked before the first tick; a configuration
//! that fails [`RunConfig::validate`] never starts a run.
//!
//! ```yaml
//! reset_ticks: 6
//! settle_ticks: 5
//! total_ticks: 200
//! instructions: [0x38800100, "0x38A00008"]
//! trace:
//!   path: ppc_core.vcd
//!   depth: 5
//! ```

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{ self, BufReader, Read };
use std::path::{ Path, PathBuf };
use std::str::FromStr;

use serde::de::{ self, Visitor };
use serde::{ Deserialize, Deserializer, Serialize, Serializer };
use thiserror::Error;

use strobe_dut::{ Port, PortMap };
use strobe_trace::{ is_valid_name, mask, Timescale, MAX_WIDTH };

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be at least one tick")]
    ZeroWindow(&'static str),
    #[error("word width {0} outside 1..=64")]
    WordWidth(u32),
    #[error("instruction {index} ({word:#x}) does not fit {width} bits")]
    WordTooWide { index: usize, word: u64, width: u32 },
    #[error("total of {total} ticks cannot hold the {needed} ticks of reset, settle and issue")]
    TooShort { total: u64, needed: u64 },
    #[error("input `{0}` mapped to more than one port")]
    DuplicatePort(String),
    #[error("`{0}` cannot be used as a trace name")]
    TraceName(String),
    #[error("no trace path configured")]
    NoTracePath,
    #[error("invalid instruction word `{0}`")]
    Word(String),
    #[error("cannot parse run config: {0}")]
    Parse(serde_yaml::Error),
    #[error("cannot parse run config from `{0}`: {1}")]
    ParseFile(PathBuf, serde_yaml::Error),
    #[error("cannot read run config from `{0}`: {1}")]
    ReadFile(PathBuf, io::Error),
}

/// whether the valid strobe stays high for the second tick of an
/// instruction period
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrobePolicy {
    /// valid is high for both ticks of the period
    #[default]
    FullCycle,
    /// valid drops on the second tick; the word is still held
    FirstHalf,
}

/// one instruction word
///
/// deserializes from an integer or from a `0x`, `0b` or decimal string
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Word(pub u64);

impl Word {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for Word {
    fn from(value: u32) -> Self {
        Self(value as u64)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl FromStr for Word {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits: String = trimmed.chars().filter(|c| *c != '_').collect();
        let parsed = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
            u64::from_str_radix(bin, 2)
        } else {
            digits.parse::<u64>()
        };
        parsed.map(Word).map_err(|_| ConfigError::Word(s.to_owned()))
    }
}

struct WordVisitor;

impl<'de> Visitor<'de> for WordVisitor {
    type Value = Word;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Word, E> {
        Ok(Word(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Word, E> {
        u64::try_from(v)
            .map(Word)
            .map_err(|_| E::custom(format!("negative instruction word {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Word, E> {
        Word::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(WordVisitor)
    }
}

impl Serialize for Word {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// waveform output settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// destination file; required only when the harness opens the file itself
    pub path: Option<PathBuf>,
    /// hierarchy levels the model should register
    pub depth: usize,
    pub timescale: Timescale,
    /// name of the outermost trace scope
    pub top: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            path: None,
            depth: 5,
            timescale: Timescale::default(),
            top: String::from("TOP"),
        }
    }
}

fn default_word_width() -> u32 {
    32
}

/// configuration of one run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// ticks with reset asserted
    pub reset_ticks: u64,
    /// ticks after reset release before the first instruction
    pub settle_ticks: u64,
    /// length of the whole run
    pub total_ticks: u64,
    #[serde(default)]
    pub instructions: Vec<Word>,
    #[serde(default = "default_word_width")]
    pub word_width: u32,
    #[serde(default)]
    pub strobe: StrobePolicy,
    #[serde(default)]
    pub ports: PortMap,
    #[serde(default)]
    pub trace: TraceConfig,
}

impl RunConfig {
    pub fn new<I, W>(reset_ticks: u64, settle_ticks: u64, total_ticks: u64, instructions: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        Self {
            reset_ticks,
            settle_ticks,
            total_ticks,
            instructions: instructions.into_iter().map(Into::into).collect(),
            word_width: default_word_width(),
            strobe: StrobePolicy::default(),
            ports: PortMap::default(),
            trace: TraceConfig::default(),
        }
    }

    pub fn with_strobe(mut self, strobe: StrobePolicy) -> Self {
        self.strobe = strobe;
        self
    }

    pub fn with_word_width(mut self, width: u32) -> Self {
        self.word_width = width;
        self
    }

    pub fn with_ports(mut self, ports: PortMap) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }

    pub fn from_str(input: impl AsRef<str>) -> Result<Self, ConfigError> {
        serde_yaml::from_str(input.as_ref()).map_err(ConfigError::Parse)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        serde_yaml::from_reader(reader).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = BufReader::new(
            File::open(path).map_err(|e| ConfigError::ReadFile(path.to_owned(), e))?,
        );
        serde_yaml::from_reader(file).map_err(|e| ConfigError::ParseFile(path.to_owned(), e))
    }

    /// ticks spent presenting the instruction stream
    pub fn issue_ticks(&self) -> u64 {
        (self.instructions.len() as u64).saturating_mul(2)
    }

    /// first tick of the drain phase
    pub fn drain_start(&self) -> u64 {
        self.reset_ticks
            .saturating_add(self.settle_ticks)
            .saturating_add(self.issue_ticks())
    }

    pub fn words(&self) -> impl Iterator<Item = u64> + '_ {
        self.instructions.iter().map(Word::value)
    }

    pub fn trace_path(&self) -> Result<Cow<'_, Path>, ConfigError> {
        self.trace
            .path
            .as_deref()
            .map(Cow::Borrowed)
            .ok_or(ConfigError::NoTracePath)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reset_ticks == 0 {
            return Err(ConfigError::ZeroWindow("reset_ticks"));
        }
        if self.settle_ticks == 0 {
            return Err(ConfigError::ZeroWindow("settle_ticks"));
        }
        if self.total_ticks == 0 {
            return Err(ConfigError::ZeroWindow("total_ticks"));
        }
        if self.word_width == 0 || self.word_width > MAX_WIDTH {
            return Err(ConfigError::WordWidth(self.word_width));
        }
        for (index, word) in self.words().enumerate() {
            if mask(word, self.word_width) != word {
                return Err(ConfigError::WordTooWide { index, word, width: self.word_width });
            }
        }

        let needed = self.drain_start();
        if self.total_ticks < needed {
            return Err(ConfigError::TooShort { total: self.total_ticks, needed });
        }

        if !is_valid_name(&self.trace.top) {
            return Err(ConfigError::TraceName(self.trace.top.clone()));
        }
        for (i, port) in Port::ALL.iter().enumerate() {
            let name = self.ports.name(*port);
            if !is_valid_name(name) {
                return Err(ConfigError::TraceName(name.to_owned()));
            }
            if Port::ALL[i + 1..].iter().any(|other| self.ports.name(*other) == name) {
                return Err(ConfigError::DuplicatePort(name.to_owned()));
            }
        }
        Ok(())
    }
}
