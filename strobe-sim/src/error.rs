//! simulation errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::Time;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("simulation time: {1} | dut error: {0}")]
    Dut(strobe_dut::Error, Time),
    #[error("simulation time: {1} | trace error: {0}")]
    Trace(strobe_trace::Error, Time),
    #[error("cannot open trace: {0}")]
    Open(strobe_trace::Error),
}
