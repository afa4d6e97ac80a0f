//! trace errors

use std::path::PathBuf;

use thiserror::Error;

use crate::signal::Time;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open trace destination `{0}`: {1}")]
    Open(PathBuf, std::io::Error),
    #[error("trace write error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid width {1} for signal `{0}`")]
    Width(String, u32),
    #[error("invalid scope or signal name `{0}`")]
    Name(String),
    #[error("signal `{0}` declared twice")]
    Duplicate(String),
    #[error("scope stack underflow")]
    ScopeUnderflow,
    #[error("snapshot has {0} values, expected {1}")]
    SnapshotLength(usize, usize),
    #[error("capture at time {0} does not follow time {1}")]
    NonMonotonic(Time, Time),
    #[error("no snapshot published before dump at time {0}")]
    MissingSnapshot(Time),
    #[error("sink already finalized")]
    Finalized,
    #[error("sink not opened")]
    NotOpen,
    #[error("sink already opened")]
    AlreadyOpen,
    #[error("probe disconnected")]
    Disconnected,
    #[error("invalid timescale `{0}`")]
    Timescale(String),
}
