// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Beat command byte.

use crate::config::{CMD_BURST, CMD_INVALID_MASK, CMD_READ, CMD_WRITE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Write,
    Read,
    Burst,
    /// Passes vetting but names no operation; the beat is echoed untouched.
    Other(u8),
}

impl Command {
    /// Vets a command byte. `None` if any of the reserved bits are set.
    pub fn decode(byte: u8) -> Option<Self> {
        if byte & CMD_INVALID_MASK != 0 {
            return None;
        }
        Some(match byte {
            CMD_WRITE => Command::Write,
            CMD_READ => Command::Read,
            b if b & CMD_BURST != 0 => Command::Burst,
            b => Command::Other(b),
        })
    }

    pub fn byte(self) -> u8 {
        match self {
            Command::Write => CMD_WRITE,
            Command::Read => CMD_READ,
            Command::Burst => CMD_BURST,
            Command::Other(b) => b,
        }
    }
}
