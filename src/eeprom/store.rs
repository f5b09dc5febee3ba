// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Tagged record store with migration-based garbage collection.

use alloc::vec::Vec;

use crate::config::{ERASED_BYTE, FRAME_SIZE, TAG_ERASED, VALUE_LEN};
use crate::eeprom::flash::{Bank, Flash};
use crate::eeprom::frame::{is_reserved, Frame, TagSet};
use crate::eeprom::header::{classify_header, HeaderState};
use crate::error::{FlashError, KernelError, Result};

/// Outcome of scanning a bank for one tag.
#[derive(Debug, Clone, Copy, Default)]
struct Scan {
    latest: Option<Frame>,
    free: Option<usize>,
}

pub struct EepromStore<F: Flash> {
    flash: F,
    active: Option<Bank>,
    slots: usize,
}

impl<F: Flash> EepromStore<F> {
    /// Brings the store up over `flash`, recovering or reformatting as needed.
    ///
    /// Never fails: if bring-up does not produce an active bank the store is
    /// returned without one and every access reports `Io`.
    pub fn open(flash: F) -> Self {
        let slots = flash.sector_size() / FRAME_SIZE;
        let mut store = Self { flash, active: None, slots };
        if let Err(e) = store.init() {
            tracing::error!("EEPROM init failed: {}", e);
        }
        store
    }

    /// Classifies both bank headers and establishes the active bank.
    pub fn init(&mut self) -> Result<Bank> {
        self.active = None;
        if self.slots < 2 {
            return Err(KernelError::Io(FlashError::OutOfBounds));
        }

        let states = [self.header(Bank::Zero), self.header(Bank::One)];
        tracing::debug!("EEPROM bank headers: {:?}", states);

        let active = match states {
            [HeaderState::Valid, other] if other != HeaderState::Valid => {
                self.settle(Bank::Zero, other)?;
                Bank::Zero
            }
            [other, HeaderState::Valid] if other != HeaderState::Valid => {
                self.settle(Bank::One, other)?;
                Bank::One
            }
            [HeaderState::Moving, HeaderState::Erased | HeaderState::Invalid] => {
                self.resume_migration(Bank::Zero)?
            }
            [HeaderState::Erased | HeaderState::Invalid, HeaderState::Moving] => {
                self.resume_migration(Bank::One)?
            }
            // Power lost while a Valid header was being overwritten with Moving.
            [HeaderState::Invalid, HeaderState::Erased] if self.holds_records(Bank::Zero) => {
                self.resume_migration(Bank::Zero)?
            }
            [HeaderState::Erased, HeaderState::Invalid] if self.holds_records(Bank::One) => {
                self.resume_migration(Bank::One)?
            }
            [HeaderState::Erased, HeaderState::Erased] => {
                tracing::info!("EEPROM blank, formatting bank 0");
                self.format()?
            }
            _ => {
                tracing::error!("EEPROM headers corrupt ({:?}), erasing both banks", states);
                self.flash.erase_sector(Bank::Zero)?;
                self.flash.erase_sector(Bank::One)?;
                self.format()?
            }
        };

        self.flash.flush_cache();
        self.active = Some(active);
        Ok(active)
    }

    /// `active` is Valid; make sure its partner is clean, completing a
    /// migration that was interrupted after the destination was marked Valid.
    fn settle(&mut self, active: Bank, other: HeaderState) -> Result<()> {
        let alt = active.other();
        if other == HeaderState::Moving {
            tracing::warn!("EEPROM completing interrupted migration {:?} -> {:?}", alt, active);
            self.copy_live(alt, active)?;
        }
        if other != HeaderState::Erased || !self.is_blank(alt) {
            self.flash.erase_sector(alt)?;
        }
        Ok(())
    }

    /// `source` was being marked Moving, or was marked Moving but the
    /// destination never became Valid.
    fn resume_migration(&mut self, source: Bank) -> Result<Bank> {
        let dest = source.other();
        tracing::warn!("EEPROM restarting interrupted migration {:?} -> {:?}", source, dest);
        if !self.is_blank(dest) {
            self.flash.erase_sector(dest)?;
        }
        self.copy_live(source, dest)?;
        self.set_header(dest, HeaderState::Valid)?;
        self.flash.erase_sector(source)?;
        Ok(dest)
    }

    fn format(&mut self) -> Result<Bank> {
        for bank in Bank::ALL {
            if !self.is_blank(bank) {
                self.flash.erase_sector(bank)?;
            }
        }
        self.set_header(Bank::Zero, HeaderState::Valid)?;
        Ok(Bank::Zero)
    }

    pub fn active_bank(&self) -> Option<Bank> {
        self.active
    }

    /// Record slots per bank, excluding the header.
    pub fn capacity(&self) -> usize {
        self.slots.saturating_sub(1)
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn require_active(&self) -> Result<Bank> {
        self.active.ok_or(KernelError::Io(FlashError::NoActiveBank))
    }

    /// Latest value stored under `tag`.
    pub fn read(&self, tag: u8) -> Result<[u8; VALUE_LEN]> {
        if is_reserved(tag) {
            return Err(KernelError::NotFound);
        }
        let bank = self.require_active()?;
        self.scan(bank, tag)
            .latest
            .map(|f| f.value)
            .ok_or(KernelError::NotFound)
    }

    /// Stores `value` under `tag`, migrating to the other bank if the active
    /// one is full. Rewriting an identical value programs nothing.
    pub fn write(&mut self, tag: u8, value: &[u8; VALUE_LEN]) -> Result<()> {
        if is_reserved(tag) {
            return Err(KernelError::InvalidTag);
        }
        let bank = self.require_active()?;

        let scan = self.scan(bank, tag);
        if scan.latest.is_some_and(|f| &f.value == value) {
            return Ok(());
        }
        if let Some(slot) = scan.free {
            return self.program_frame(bank, slot, &Frame::new(tag, *value));
        }

        if self.is_full(bank) {
            tracing::warn!("EEPROM full: all {} slots hold distinct tags", self.capacity());
            return Err(KernelError::OutOfSpace);
        }
        let bank = self.migrate(bank)?;

        match self.scan(bank, tag).free {
            Some(slot) => self.program_frame(bank, slot, &Frame::new(tag, *value)),
            None => Err(KernelError::OutOfSpace),
        }
    }

    /// Erases both banks and formats bank 0. All records are lost.
    pub fn reset(&mut self) -> Result<()> {
        tracing::warn!("EEPROM reset");
        self.active = None;
        self.flash.erase_sector(Bank::Zero)?;
        self.flash.erase_sector(Bank::One)?;
        self.flash.flush_cache();
        self.init().map(|_| ())
    }

    /// Unused slots left in the active bank before a migration is needed.
    pub fn free_slots(&self) -> Result<usize> {
        let bank = self.require_active()?;
        Ok(self.first_unused(bank).map_or(0, |slot| self.slots - slot))
    }

    /// Latest value of every live tag in the active bank, in tag order.
    pub fn live_tags(&self) -> Result<Vec<(u8, [u8; VALUE_LEN])>> {
        let bank = self.require_active()?;
        let mut tags = self.live_tags_in(bank);
        tags.sort_unstable_by_key(|(tag, _)| *tag);
        Ok(tags)
    }

    // --- Bank access ---

    fn frame(&self, bank: Bank, slot: usize) -> Frame {
        let at = slot * FRAME_SIZE;
        self.flash
            .sector(bank)
            .get(at..at + FRAME_SIZE)
            .and_then(|bytes| <&[u8; FRAME_SIZE]>::try_from(bytes).ok())
            .map_or(Frame::ERASED, Frame::from_bytes)
    }

    fn header(&self, bank: Bank) -> HeaderState {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes.copy_from_slice(&self.flash.sector(bank)[..FRAME_SIZE]);
        classify_header(&bytes)
    }

    fn set_header(&mut self, bank: Bank, state: HeaderState) -> Result<()> {
        let pattern = state.pattern().ok_or(KernelError::InvalidOperation)?;
        let address = self.flash.sector_address(bank);
        self.flash.program(address, &pattern)?;
        Ok(())
    }

    fn program_frame(&mut self, bank: Bank, slot: usize, frame: &Frame) -> Result<()> {
        let address = self.flash.sector_address(bank) + (slot * FRAME_SIZE) as u32;
        self.flash.program(address, &frame.to_bytes())?;
        Ok(())
    }

    fn is_blank(&self, bank: Bank) -> bool {
        self.flash.sector(bank).iter().all(|&b| b == ERASED_BYTE)
    }

    /// Walks the log up to the first unused slot, remembering the last
    /// intact record for `tag`.
    fn scan(&self, bank: Bank, tag: u8) -> Scan {
        let mut scan = Scan::default();
        for slot in 1..self.slots {
            let frame = self.frame(bank, slot);
            if frame.tag == TAG_ERASED {
                // A half-programmed slot cannot be appended to.
                scan.free = frame.is_erased().then_some(slot);
                break;
            }
            if frame.tag == tag && frame.crc_ok() {
                scan.latest = Some(frame);
            }
        }
        scan
    }

    fn holds_records(&self, bank: Bank) -> bool {
        (1..self.slots).any(|slot| self.frame(bank, slot).is_live())
    }

    fn first_unused(&self, bank: Bank) -> Option<usize> {
        (1..self.slots).find(|&slot| self.frame(bank, slot).is_erased())
    }

    fn live_tags_in(&self, bank: Bank) -> Vec<(u8, [u8; VALUE_LEN])> {
        let mut seen = TagSet::default();
        let mut out = Vec::new();
        for slot in (1..self.slots).rev() {
            let frame = self.frame(bank, slot);
            if frame.is_live() && seen.insert(frame.tag) {
                out.push((frame.tag, frame.value));
            }
        }
        out
    }

    /// True when migrating would not free a single slot: every record in the
    /// bank is the only intact copy of its tag.
    fn is_full(&self, bank: Bank) -> bool {
        let mut seen = TagSet::default();
        for slot in (1..self.slots).rev() {
            let frame = self.frame(bank, slot);
            if frame.is_erased() || !frame.is_live() || !seen.insert(frame.tag) {
                return false;
            }
        }
        true
    }

    // --- Migration ---

    /// Moves the newest record of every tag from `source` into the other
    /// bank and makes that bank active.
    fn migrate(&mut self, source: Bank) -> Result<Bank> {
        let dest = source.other();
        tracing::info!("EEPROM migrating {:?} -> {:?}", source, dest);

        if self.header(dest) != HeaderState::Erased || !self.is_blank(dest) {
            self.flash.erase_sector(dest)?;
        }
        self.set_header(source, HeaderState::Moving)?;
        let copied = self.copy_live(source, dest)?;
        self.set_header(dest, HeaderState::Valid)?;
        self.flash.erase_sector(source)?;
        self.active = Some(dest);
        self.flash.flush_cache();

        tracing::info!("EEPROM migration done, {} records kept", copied);
        Ok(dest)
    }

    /// Appends to `dest` the newest intact record of each tag in `source`
    /// that `dest` does not already hold. Walking `source` backwards means
    /// the first copy seen of a tag is its latest.
    fn copy_live(&mut self, source: Bank, dest: Bank) -> Result<usize> {
        let mut seen = TagSet::default();
        let mut next = 1;
        while next < self.slots {
            let frame = self.frame(dest, next);
            if frame.is_erased() {
                break;
            }
            if frame.is_live() {
                seen.insert(frame.tag);
            }
            next += 1;
        }

        let mut copied = 0;
        for slot in (1..self.slots).rev() {
            let frame = self.frame(source, slot);
            if !frame.is_live() || !seen.insert(frame.tag) {
                continue;
            }
            if next >= self.slots {
                return Err(KernelError::OutOfSpace);
            }
            self.program_frame(dest, next, &frame)?;
            next += 1;
            copied += 1;
        }
        Ok(copied)
    }
}
