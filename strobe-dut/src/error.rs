//! dut errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown input port `{0}`")]
    UnknownPort(String),
    #[error("value {1:#x} does not fit {2}-bit port `{0}`")]
    Width(String, u64, u32),
    #[error("trace error: {0}")]
    Trace(#[from] strobe_trace::Error),
    #[error("model error: {0}")]
    Model(anyhow::Error),
}

impl Error {
    /// model error with a custom message
    pub fn model_with<M>(msg: M) -> Self
    where
        M: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        Self::Model(anyhow::Error::msg(msg))
    }
}
