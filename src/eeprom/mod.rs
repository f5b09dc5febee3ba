// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! EEPROM emulation over two flash sectors.
//!
//! Each sector is a bank of 8-byte frames. Slot 0 holds the bank header,
//! the remaining slots form an append-only log of `(tag, value, crc)`
//! records. When the active bank fills up, the newest record of every tag
//! is migrated to the other bank and the full one is erased.

pub mod frame;
pub mod header;
pub mod flash;
pub mod store;
pub mod tags;
pub mod inspect;

pub use flash::{Bank, Flash, RamFlash};
pub use frame::Frame;
pub use header::{classify_header, HeaderState};
pub use store::EepromStore;
pub use tags::{populate_defaults, AppTag};
