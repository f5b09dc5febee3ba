// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record frame layout.

use serde::{Deserialize, Serialize};

use crate::config::{ERASED_BYTE, FRAME_SIZE, TAG_EMPTY, TAG_ERASED, VALUE_LEN};

/// `tag:1 value:6 crc:1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub tag: u8,
    pub value: [u8; VALUE_LEN],
    pub crc: u8,
}

/// True for the two sentinel tags callers may never store.
pub fn is_reserved(tag: u8) -> bool {
    tag == TAG_EMPTY || tag == TAG_ERASED
}

impl Frame {
    /// Contents of a slot after erase.
    pub const ERASED: Frame = Frame { tag: TAG_ERASED, value: [ERASED_BYTE; VALUE_LEN], crc: ERASED_BYTE };

    pub fn new(tag: u8, value: [u8; VALUE_LEN]) -> Self {
        Self { tag, value, crc: Self::checksum(tag, &value) }
    }

    /// `tag` XOR every value byte.
    pub fn checksum(tag: u8, value: &[u8; VALUE_LEN]) -> u8 {
        value.iter().fold(tag, |acc, b| acc ^ b)
    }

    pub fn from_bytes(bytes: &[u8; FRAME_SIZE]) -> Self {
        let mut value = [0u8; VALUE_LEN];
        value.copy_from_slice(&bytes[1..1 + VALUE_LEN]);
        Self { tag: bytes[0], value, crc: bytes[FRAME_SIZE - 1] }
    }

    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        out[0] = self.tag;
        out[1..1 + VALUE_LEN].copy_from_slice(&self.value);
        out[FRAME_SIZE - 1] = self.crc;
        out
    }

    pub fn crc_ok(&self) -> bool {
        self.crc == Self::checksum(self.tag, &self.value)
    }

    /// Slot never programmed since the last erase.
    pub fn is_erased(&self) -> bool {
        self.to_bytes().iter().all(|&b| b == ERASED_BYTE)
    }

    /// Holds a readable record for a caller-visible tag.
    pub fn is_live(&self) -> bool {
        !is_reserved(self.tag) && self.crc_ok()
    }
}

/// Set of 8-bit tags.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TagSet([u32; 8]);

impl TagSet {
    pub fn insert(&mut self, tag: u8) -> bool {
        let (word, bit) = ((tag >> 5) as usize, 1u32 << (tag & 31));
        let fresh = self.0[word] & bit == 0;
        self.0[word] |= bit;
        fresh
    }
}
