// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! A single mapped region.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

/// Access width of one address unit within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Byte,
    Halfword,
    Word,
}

impl Granularity {
    /// Bytes of backing storage per address.
    pub const fn unit(self) -> usize {
        match self {
            Granularity::Byte => 1,
            Granularity::Halfword => 2,
            Granularity::Word => 4,
        }
    }

    /// Mask of the value bits a unit can hold.
    pub const fn mask(self) -> u32 {
        match self {
            Granularity::Byte => 0xff,
            Granularity::Halfword => 0xffff,
            Granularity::Word => 0xffff_ffff,
        }
    }
}

/// `size` consecutive addresses starting at `base`, each backed by
/// `granularity.unit()` bytes of `backing`.
#[derive(Debug)]
pub struct Region<B> {
    pub(crate) base: u32,
    pub(crate) size: u32,
    pub(crate) granularity: Granularity,
    pub(crate) backing: B,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Region<B> {
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Last address covered, inclusive.
    pub fn end(&self) -> u32 {
        self.base + (self.size - 1)
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    pub fn backing_mut(&mut self) -> &mut B {
        &mut self.backing
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.base && address <= self.end()
    }

    pub(crate) fn intersects(&self, base: u32, end: u32) -> bool {
        base <= self.end() && self.base <= end
    }

    fn span(&self, address: u32) -> Option<core::ops::Range<usize>> {
        if !self.contains(address) {
            return None;
        }
        let unit = self.granularity.unit();
        let start = (address - self.base) as usize * unit;
        Some(start..start + unit)
    }

    /// Host-order read of the unit at `address`, zero-extended.
    pub fn read(&self, address: u32) -> u32 {
        let Some(span) = self.span(address) else { return 0 };
        let Some(bytes) = self.backing.as_ref().get(span) else { return 0 };
        match self.granularity {
            Granularity::Byte => bytes[0] as u32,
            Granularity::Halfword => LittleEndian::read_u16(bytes) as u32,
            Granularity::Word => LittleEndian::read_u32(bytes),
        }
    }

    /// Host-order write of the low bits of `value` into the unit at `address`.
    pub fn write(&mut self, address: u32, value: u32) {
        let granularity = self.granularity;
        let Some(span) = self.span(address) else { return };
        let Some(bytes) = self.backing.as_mut().get_mut(span) else { return };
        match granularity {
            Granularity::Byte => bytes[0] = value as u8,
            Granularity::Halfword => LittleEndian::write_u16(bytes, value as u16),
            Granularity::Word => LittleEndian::write_u32(bytes, value),
        }
    }
}
