// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Bank header encoding.
//!
//! The header occupies the first frame of a bank. Each state is a byte
//! pattern repeated eight times, and every transition only clears bits:
//!
//! | state  | pattern | even bits | odd bits |
//! |--------|---------|-----------|----------|
//! | Erased | `0xff`  | set       | set      |
//! | Valid  | `0x55`  | set       | clear    |
//! | Moving | `0x00`  | clear     | clear    |
//!
//! Classification takes a majority vote over the 32 even and the 32 odd bit
//! positions separately, so a header that was only partly programmed or
//! erased still resolves to the state it was heading to or from.

use serde::{Deserialize, Serialize};

use crate::config::FRAME_SIZE;

const EVEN_BITS: u8 = 0x55;
const ODD_BITS: u8 = 0xAA;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderState {
    Erased,
    Valid,
    Moving,
    Invalid,
}

impl HeaderState {
    /// Byte pattern programmed to enter this state.
    pub fn pattern(self) -> Option<[u8; FRAME_SIZE]> {
        match self {
            HeaderState::Erased => Some([0xff; FRAME_SIZE]),
            HeaderState::Valid => Some([0x55; FRAME_SIZE]),
            HeaderState::Moving => Some([0x00; FRAME_SIZE]),
            HeaderState::Invalid => None,
        }
    }
}

fn vote(ones: u32) -> Option<bool> {
    let total = (FRAME_SIZE * 4) as u32;
    match (ones * 2).cmp(&total) {
        core::cmp::Ordering::Greater => Some(true),
        core::cmp::Ordering::Less => Some(false),
        core::cmp::Ordering::Equal => None,
    }
}

pub fn classify_header(bytes: &[u8; FRAME_SIZE]) -> HeaderState {
    let even: u32 = bytes.iter().map(|b| (b & EVEN_BITS).count_ones()).sum();
    let odd: u32 = bytes.iter().map(|b| (b & ODD_BITS).count_ones()).sum();

    match (vote(even), vote(odd)) {
        (Some(true), Some(true)) => HeaderState::Erased,
        (Some(true), Some(false)) => HeaderState::Valid,
        (Some(false), Some(false)) => HeaderState::Moving,
        _ => HeaderState::Invalid,
    }
}
