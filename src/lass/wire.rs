// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Bounds-checked big-endian field access.

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::config::TXID_LEN;

pub const ADDR_MASK: u32 = 0x00ff_ffff;

pub fn read_u24_be(buf: &[u8], at: usize) -> Option<u32> {
    buf.get(at..at.checked_add(3)?).map(BigEndian::read_u24)
}

pub fn read_u32_be(buf: &[u8], at: usize) -> Option<u32> {
    buf.get(at..at.checked_add(4)?).map(BigEndian::read_u32)
}

pub fn write_u32_be(buf: &mut [u8], at: usize, value: u32) -> Option<()> {
    let field = buf.get_mut(at..at.checked_add(4)?)?;
    BigEndian::write_u32(field, value);
    Some(())
}

/// Splits a beat header word into its command byte and 24-bit field.
pub fn split_header(word: u32) -> (u8, u32) {
    ((word >> 24) as u8, word & ADDR_MASK)
}

pub fn join_header(command: u8, field: u32) -> u32 {
    ((command as u32) << 24) | (field & ADDR_MASK)
}

/// Opaque identifier echoed back in every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn from_words(high: u32, low: u32) -> Self {
        TransactionId(((high as u64) << 32) | low as u64)
    }

    pub fn words(self) -> (u32, u32) {
        ((self.0 >> 32) as u32, self.0 as u32)
    }

    pub fn read(buf: &[u8]) -> Option<Self> {
        Some(Self::from_words(read_u32_be(buf, 0)?, read_u32_be(buf, 4)?))
    }

    pub fn to_bytes(self) -> [u8; TXID_LEN] {
        let mut out = [0u8; TXID_LEN];
        BigEndian::write_u64(&mut out, self.0);
        out
    }
}
