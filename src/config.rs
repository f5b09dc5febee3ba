// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Maximum number of regions a memory map holds.
pub const MAX_REGIONS: usize = 10;

/// LASS transaction identifier length in bytes.
pub const TXID_LEN: usize = 8;

/// Length of a simple beat, and of a burst header, in bytes.
pub const BEAT_LEN: usize = 8;

/// Command byte: single word write.
pub const CMD_WRITE: u8 = 0x00;
/// Command byte: single word read.
pub const CMD_READ: u8 = 0x10;
/// Command byte: burst header.
pub const CMD_BURST: u8 = 0x20;
/// Any of these bits set makes a command byte invalid.
pub const CMD_INVALID_MASK: u8 = 0xC0 | 0x0C;

/// Largest accepted burst repetition count.
pub const MAX_BURST: u32 = 0x1f;

/// Size of one record store frame.
pub const FRAME_SIZE: usize = 8;
/// Payload bytes carried by one frame.
pub const VALUE_LEN: usize = 6;

/// Tag value of an empty (never programmed) slot.
pub const TAG_ERASED: u8 = 0xff;
/// Tag value reserved as the empty-slot marker.
pub const TAG_EMPTY: u8 = 0x00;

/// Byte value of erased NOR flash.
pub const ERASED_BYTE: u8 = 0xff;
