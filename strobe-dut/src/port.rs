//! driven input ports
//!
//! models generated from different hardware descriptions name their inputs
//! differently (`clk` vs `clock`, `rst` vs `reset_i`). the driver only
//! knows the four roles below and looks the concrete name up in a
//! [`PortMap`].

use std::fmt;

use serde::{ Deserialize, Serialize };

/// role of a driven input
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Port {
    Clock,
    Reset,
    Instruction,
    InstructionValid,
}

impl Port {
    pub const ALL: [Port; 4] = [
        Port::Clock,
        Port::Reset,
        Port::Instruction,
        Port::InstructionValid,
    ];
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clock => "clock",
            Self::Reset => "reset",
            Self::Instruction => "instruction",
            Self::InstructionValid => "instruction_valid",
        })
    }
}

/// concrete input names of one model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortMap {
    pub clock: String,
    pub reset: String,
    pub instruction: String,
    pub instruction_valid: String,
}

impl PortMap {
    pub fn name(&self, port: Port) -> &str {
        match port {
            Port::Clock => &self.clock,
            Port::Reset => &self.reset,
            Port::Instruction => &self.instruction,
            Port::InstructionValid => &self.instruction_valid,
        }
    }

    /// reverse lookup of a concrete name
    pub fn port(&self, name: &str) -> Option<Port> {
        Port::ALL.into_iter().find(|port| self.name(*port) == name)
    }
}

impl Default for PortMap {
    fn default() -> Self {
        Self {
            clock: String::from("clk"),
            reset: String::from("rst"),
            instruction: String::from("instruction"),
            instruction_valid: String::from("instruction_valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_round_trip() {
        let ports = PortMap::default();
        for port in Port::ALL {
            assert_eq!(ports.port(ports.name(port)), Some(port));
        }
        assert_eq!(ports.port("clock"), None);
    }
}
