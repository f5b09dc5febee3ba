// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fixed-capacity registry of non-overlapping regions.
//!
//! Regions are stored in registration order and indexed by a second array
//! kept sorted by base address. Lookups walk the sorted index; unmapped
//! addresses read as zero and swallow writes.

use crate::config::MAX_REGIONS;
use crate::error::{KernelError, Result};
use crate::memory::region::{Granularity, Region};

pub struct MemoryMap<B, const N: usize = MAX_REGIONS> {
    regions: [Option<Region<B>>; N],
    sorted: [usize; N],
    len: usize,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, const N: usize> MemoryMap<B, N> {
    pub fn new() -> Self {
        Self {
            regions: core::array::from_fn(|_| None),
            sorted: [0; N],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a region covering `[base, base + size - 1]`.
    ///
    /// `backing` must hold at least `size * granularity.unit()` bytes. On
    /// error the map is left unchanged.
    pub fn register(&mut self, base: u32, size: u32, backing: B, granularity: Granularity) -> Result<()> {
        if size == 0 {
            return Err(KernelError::InvalidRegion);
        }
        let end = base.checked_add(size - 1).ok_or(KernelError::InvalidRegion)?;
        let needed = (size as usize)
            .checked_mul(granularity.unit())
            .ok_or(KernelError::InvalidRegion)?;
        if backing.as_ref().len() < needed {
            return Err(KernelError::InvalidRegion);
        }

        if self.iter().any(|r| r.intersects(base, end)) {
            tracing::warn!("region {:#08x}..={:#08x} overlaps an existing region", base, end);
            return Err(KernelError::Overlap);
        }
        if self.len >= N {
            return Err(KernelError::CapacityExceeded);
        }

        let slot = self.len;
        self.regions[slot] = Some(Region { base, size, granularity, backing });
        self.len += 1;

        // Insertion sort of the new slot into the address index.
        let mut i = slot;
        self.sorted[i] = slot;
        while i > 0 && self.base_at(i - 1) > base {
            self.sorted.swap(i - 1, i);
            i -= 1;
        }

        tracing::debug!("mapped {:?} region {:#08x}..={:#08x}", granularity, base, end);
        Ok(())
    }

    fn base_at(&self, sorted_pos: usize) -> u32 {
        self.regions[self.sorted[sorted_pos]]
            .as_ref()
            .map_or(u32::MAX, |r| r.base)
    }

    /// Regions in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &Region<B>> {
        self.sorted[..self.len]
            .iter()
            .filter_map(move |&slot| self.regions[slot].as_ref())
    }

    /// First region, by ascending base, containing `address`.
    pub fn find(&self, address: u32) -> Option<&Region<B>> {
        self.iter()
            .take_while(|r| r.base <= address)
            .find(|r| r.contains(address))
    }

    fn find_slot(&self, address: u32) -> Option<usize> {
        self.sorted[..self.len].iter().copied().find(|&slot| {
            self.regions[slot]
                .as_ref()
                .is_some_and(|r| r.contains(address))
        })
    }

    /// Region registered at exactly `base`.
    pub fn region(&self, base: u32) -> Option<&Region<B>> {
        self.iter().find(|r| r.base == base)
    }

    pub fn backing(&self, base: u32) -> Option<&B> {
        self.region(base).map(|r| &r.backing)
    }

    pub fn backing_mut(&mut self, base: u32) -> Option<&mut B> {
        self.regions[..self.len]
            .iter_mut()
            .flatten()
            .find(|r| r.base == base)
            .map(|r| &mut r.backing)
    }

    /// Reads `address`; unmapped addresses read as zero.
    pub fn read(&self, address: u32) -> u32 {
        self.find(address).map_or(0, |r| r.read(address))
    }

    /// Writes `address`; writes to unmapped addresses are dropped.
    pub fn write(&mut self, address: u32, value: u32) {
        match self.find_slot(address) {
            Some(slot) => {
                if let Some(region) = self.regions[slot].as_mut() {
                    region.write(address, value);
                }
            }
            None => tracing::trace!("dropped write to unmapped address {:#08x}", address),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, const N: usize> Default for MemoryMap<B, N> {
    fn default() -> Self {
        Self::new()
    }
}
