// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Offline decoding of raw bank images.

use alloc::vec::Vec;
use serde::Serialize;

use crate::config::{FRAME_SIZE, VALUE_LEN};
use crate::eeprom::flash::Bank;
use crate::eeprom::frame::Frame;
use crate::eeprom::header::{classify_header, HeaderState};
use crate::error::{FlashError, KernelError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    pub slot: usize,
    pub tag: u8,
    pub value: [u8; VALUE_LEN],
    pub crc_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankReport {
    pub bank: Bank,
    pub state: HeaderState,
    /// Programmed slots, in log order.
    pub frames: Vec<SlotReport>,
    pub free_slots: usize,
}

pub fn inspect_bank(bank: Bank, sector: &[u8]) -> BankReport {
    let mut header = [0u8; FRAME_SIZE];
    let n = sector.len().min(FRAME_SIZE);
    header[..n].copy_from_slice(&sector[..n]);

    let mut frames = Vec::new();
    let mut free_slots = 0;
    let slots = sector
        .chunks_exact(FRAME_SIZE)
        .filter_map(|chunk| <&[u8; FRAME_SIZE]>::try_from(chunk).ok());
    for (slot, bytes) in slots.enumerate().skip(1) {
        let frame = Frame::from_bytes(bytes);
        if frame.is_erased() {
            free_slots += 1;
            continue;
        }
        frames.push(SlotReport { slot, tag: frame.tag, value: frame.value, crc_ok: frame.crc_ok() });
    }

    BankReport { bank, state: classify_header(&header), frames, free_slots }
}

/// Splits a two-sector image in half and reports on both banks.
pub fn inspect_image(image: &[u8]) -> Result<[BankReport; 2]> {
    if image.is_empty() || image.len() % (2 * FRAME_SIZE) != 0 {
        return Err(KernelError::Io(FlashError::OutOfBounds));
    }
    let (zero, one) = image.split_at(image.len() / 2);
    Ok([inspect_bank(Bank::Zero, zero), inspect_bank(Bank::One, one)])
}
