// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use core::fmt;

/// Failure reported by a flash driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Program operation rejected by the controller.
    Program,
    /// Sector erase rejected by the controller.
    Erase,
    /// Address or sector outside the device.
    OutOfBounds,
    /// Store has no active bank; bring-up failed.
    NoActiveBank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// Region intersects one that is already registered.
    Overlap,
    /// Fixed-capacity table is full.
    CapacityExceeded,
    /// Region description is inconsistent (zero size, short backing, wrap-around).
    InvalidRegion,
    /// Item not found.
    NotFound,
    /// Tag is one of the reserved sentinels.
    InvalidTag,
    /// No free slot even after migration.
    OutOfSpace,
    /// No active bank, or the flash driver failed.
    Io(FlashError),
    /// Bytes do not form a valid LASS transaction.
    Malformed,
    /// Invalid operation.
    InvalidOperation,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Overlap => write!(f, "region overlaps an existing region"),
            KernelError::CapacityExceeded => write!(f, "capacity exceeded"),
            KernelError::InvalidRegion => write!(f, "invalid region"),
            KernelError::NotFound => write!(f, "not found"),
            KernelError::InvalidTag => write!(f, "reserved tag"),
            KernelError::OutOfSpace => write!(f, "out of space"),
            KernelError::Io(e) => write!(f, "flash I/O error: {:?}", e),
            KernelError::Malformed => write!(f, "malformed transaction"),
            KernelError::InvalidOperation => write!(f, "invalid operation"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KernelError {}

impl From<FlashError> for KernelError {
    fn from(e: FlashError) -> Self {
        KernelError::Io(e)
    }
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
pub type Result<T> = KernelResult<T>;
