// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! LASS (Lightweight Address Space Serialization).
//!
//! A transaction is an 8-byte identifier followed by beats. Every beat is a
//! word read or write against a 24-bit address, optionally repeated as a
//! burst. All multi-byte fields are big-endian on the wire.
//!
//! ```text
//! Transaction := TransactionID(8) Beat+
//! SimpleBeat  := Cmd(1) Addr(3) Data(4)
//! BurstBeat   := 0x20 RepCount(3) Cmd(1) Addr(3) Data(4)*RepCount
//! ```
//!
//! Malformed transactions are dropped without a reply.

pub mod wire;
pub mod command;
pub mod engine;
pub mod codec;

pub use codec::{Beat, Transaction};
pub use command::Command;
pub use engine::{respond, respond_in_place, AddressSpace};
pub use wire::TransactionId;
