// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Flash driver interface and a RAM-backed NOR simulator.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::config::ERASED_BYTE;
use crate::error::FlashError;

/// One of the two sectors backing the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bank {
    Zero,
    One,
}

impl Bank {
    pub const ALL: [Bank; 2] = [Bank::Zero, Bank::One];

    pub fn index(self) -> usize {
        match self {
            Bank::Zero => 0,
            Bank::One => 1,
        }
    }

    pub fn other(self) -> Bank {
        match self {
            Bank::Zero => Bank::One,
            Bank::One => Bank::Zero,
        }
    }
}

/// Narrow view of the flash controller used by the store.
///
/// Programming may only clear bits; erasing a sector sets every byte back
/// to `0xff`. Calls block until the hardware is done.
pub trait Flash {
    /// Bytes per sector.
    fn sector_size(&self) -> usize;

    /// Memory-mapped contents of a sector.
    fn sector(&self, bank: Bank) -> &[u8];

    /// Absolute address of the first byte of a sector.
    fn sector_address(&self, bank: Bank) -> u32;

    fn program(&mut self, address: u32, bytes: &[u8]) -> Result<(), FlashError>;

    fn erase_sector(&mut self, bank: Bank) -> Result<(), FlashError>;

    fn flush_cache(&mut self);
}

/// Two sectors of simulated NOR flash in RAM.
///
/// Counts every operation and can be told to start failing programs after a
/// number of successful ones, which models power loss mid-sequence. A failing
/// program may also be torn: its first few bytes land before it fails.
#[derive(Debug, Clone)]
pub struct RamFlash {
    base: u32,
    sector_size: usize,
    data: Vec<u8>,
    programs: usize,
    erases: usize,
    flushes: usize,
    program_budget: Option<usize>,
    torn_bytes: usize,
}

impl RamFlash {
    pub fn new(sector_size: usize) -> Self {
        Self::with_base(0x0800_0000, sector_size)
    }

    pub fn with_base(base: u32, sector_size: usize) -> Self {
        Self::from_image(base, alloc::vec![ERASED_BYTE; sector_size * 2])
    }

    /// Wraps an existing two-sector image (sector 0 followed by sector 1).
    pub fn from_image(base: u32, image: Vec<u8>) -> Self {
        Self {
            base,
            sector_size: image.len() / 2,
            data: image,
            programs: 0,
            erases: 0,
            flushes: 0,
            program_budget: None,
            torn_bytes: 0,
        }
    }

    pub fn image(&self) -> &[u8] {
        &self.data
    }

    pub fn program_count(&self) -> usize {
        self.programs
    }

    pub fn erase_count(&self) -> usize {
        self.erases
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Allow `n` more program calls, then fail every following one.
    pub fn fail_programs_after(&mut self, n: usize) {
        self.program_budget = Some(n);
    }

    /// Failed programs still clear bits in their first `bytes` bytes, like a
    /// word-at-a-time controller losing power part way through.
    pub fn tear_failed_programs(&mut self, bytes: usize) {
        self.torn_bytes = bytes;
    }

    pub fn clear_faults(&mut self) {
        self.program_budget = None;
        self.torn_bytes = 0;
    }

    /// Writes raw bytes ignoring NOR rules; for staging corrupt images.
    pub fn poke(&mut self, bank: Bank, offset: usize, bytes: &[u8]) -> Result<(), FlashError> {
        if offset + bytes.len() > self.sector_size {
            return Err(FlashError::OutOfBounds);
        }
        let start = bank.index() * self.sector_size + offset;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl Flash for RamFlash {
    fn sector_size(&self) -> usize {
        self.sector_size
    }

    fn sector(&self, bank: Bank) -> &[u8] {
        let start = bank.index() * self.sector_size;
        &self.data[start..start + self.sector_size]
    }

    fn sector_address(&self, bank: Bank) -> u32 {
        self.base + (bank.index() * self.sector_size) as u32
    }

    fn program(&mut self, address: u32, bytes: &[u8]) -> Result<(), FlashError> {
        let start = address
            .checked_sub(self.base)
            .ok_or(FlashError::OutOfBounds)? as usize;
        let target = self
            .data
            .get_mut(start..start + bytes.len())
            .ok_or(FlashError::OutOfBounds)?;
        if let Some(budget) = self.program_budget.as_mut() {
            if *budget == 0 {
                let keep = self.torn_bytes.min(bytes.len());
                for (cell, &b) in target[..keep].iter_mut().zip(bytes) {
                    *cell &= b;
                }
                return Err(FlashError::Program);
            }
            *budget -= 1;
        }
        for (cell, &b) in target.iter_mut().zip(bytes) {
            *cell &= b;
        }
        self.programs += 1;
        Ok(())
    }

    fn erase_sector(&mut self, bank: Bank) -> Result<(), FlashError> {
        let start = bank.index() * self.sector_size;
        self.data[start..start + self.sector_size].fill(ERASED_BYTE);
        self.erases += 1;
        Ok(())
    }

    fn flush_cache(&mut self) {
        self.flushes += 1;
    }
}
