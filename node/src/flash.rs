// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record store flash backed by a memory-mapped image file.

use std::fs::OpenOptions;
use std::path::Path;

use memmap2::MmapMut;
use mmc_kernel::config::ERASED_BYTE;
use mmc_kernel::eeprom::{Bank, Flash};
use mmc_kernel::error::FlashError;

use crate::errors::NodeError;

/// Address the image is mapped at, as seen by the store.
const FLASH_BASE: u32 = 0x0807_0000;

pub struct FileFlash {
    map: MmapMut,
    sector_size: usize,
}

impl FileFlash {
    /// Opens `path`, creating an erased two-sector image if it does not exist.
    pub fn open(path: &Path, sector_size: usize) -> Result<Self, NodeError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let expected = (sector_size * 2) as u64;
        let len = file.metadata()?.len();
        let fresh = len == 0;
        if fresh {
            file.set_len(expected)?;
        } else if len != expected {
            return Err(NodeError::Config(format!(
                "flash image {} is {} bytes, expected {}",
                path.display(),
                len,
                expected
            )));
        }

        // The image file is private to this process for its lifetime.
        let mut map = unsafe { MmapMut::map_mut(&file)? };
        if fresh {
            tracing::info!("Created blank flash image at {:?}", path);
            map.fill(ERASED_BYTE);
            map.flush()?;
        }
        Ok(Self { map, sector_size })
    }

    fn sector_range(&self, bank: Bank) -> std::ops::Range<usize> {
        let start = bank.index() * self.sector_size;
        start..start + self.sector_size
    }
}

impl Flash for FileFlash {
    fn sector_size(&self) -> usize {
        self.sector_size
    }

    fn sector(&self, bank: Bank) -> &[u8] {
        &self.map[self.sector_range(bank)]
    }

    fn sector_address(&self, bank: Bank) -> u32 {
        FLASH_BASE + (bank.index() * self.sector_size) as u32
    }

    fn program(&mut self, address: u32, bytes: &[u8]) -> Result<(), FlashError> {
        let start = address.checked_sub(FLASH_BASE).ok_or(FlashError::OutOfBounds)? as usize;
        let target = self
            .map
            .get_mut(start..start + bytes.len())
            .ok_or(FlashError::OutOfBounds)?;
        for (cell, &b) in target.iter_mut().zip(bytes) {
            *cell &= b;
        }
        Ok(())
    }

    fn erase_sector(&mut self, bank: Bank) -> Result<(), FlashError> {
        let range = self.sector_range(bank);
        self.map[range.clone()].fill(ERASED_BYTE);
        self.map
            .flush_range(range.start, range.len())
            .map_err(|_| FlashError::Erase)
    }

    fn flush_cache(&mut self) {
        if let Err(e) = self.map.flush() {
            tracing::warn!("Flash image flush failed: {}", e);
        }
    }
}
