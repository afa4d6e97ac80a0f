//! dut module
//!
//! the capability interface a simulated device-under-test exposes to the
//! driver, plus generic reference models

pub mod error;
pub mod port;
pub mod traits;
pub mod generic;

pub use error::Error;
pub use port::{ Port, PortMap };
pub use traits::Dut;
