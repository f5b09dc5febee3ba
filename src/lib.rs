// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![no_std]

//! mmc-kernel: the protocol and persistence core of an FPGA carrier board
//! management controller.
//!
//! - [`memory`]: registry of address ranges exposed to remote peers.
//! - [`lass`]: LASS packet engine executing word reads/writes against a
//!   [`lass::AddressSpace`].
//! - [`eeprom`]: wear-levelled tagged record store emulating EEPROM over
//!   two flash sectors.

extern crate alloc;

#[cfg(any(test, feature = "std"))]
#[macro_use]
extern crate std;

pub mod config;
pub mod error;
pub mod memory;
pub mod lass;
pub mod eeprom;

pub use error::{FlashError, KernelError, KernelResult};

#[cfg(test)]
pub mod tests;
