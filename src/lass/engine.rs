// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Transaction execution.
//!
//! Beats are vetted as they are consumed, so beats preceding a malformed one
//! have already reached the address space when the transaction is dropped.
//! Nothing is rolled back.

use crate::config::{BEAT_LEN, MAX_BURST, TXID_LEN};
use crate::lass::command::Command;
use crate::lass::wire::{read_u32_be, split_header, write_u32_be, TransactionId};
use crate::memory::MemoryMap;

/// Word-addressed target of LASS beats.
pub trait AddressSpace {
    fn read(&mut self, address: u32) -> u32;
    fn write(&mut self, address: u32, value: u32);
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, const N: usize> AddressSpace for MemoryMap<B, N> {
    fn read(&mut self, address: u32) -> u32 {
        MemoryMap::read(self, address)
    }

    fn write(&mut self, address: u32, value: u32) {
        MemoryMap::write(self, address, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reject {
    TooShort(usize),
    BadCommand(u8),
    BurstTooLong(u32),
    Truncated(usize),
}

/// Executes the transaction in `buf` and turns `buf` into the reply.
///
/// Returns the reply length, or `None` if the transaction must be dropped.
/// On `None`, beats already executed may have rewritten parts of `buf`.
pub fn respond_in_place<A: AddressSpace>(space: &mut A, buf: &mut [u8]) -> Option<usize> {
    match execute(space, buf) {
        Ok(len) => Some(len),
        Err(reject) => {
            tracing::trace!("dropping LASS transaction: {:?}", reject);
            None
        }
    }
}

/// Executes `request` and writes the reply into `reply`, leaving `request`
/// untouched. The reply bytes are identical to [`respond_in_place`].
pub fn respond<A: AddressSpace>(space: &mut A, request: &[u8], reply: &mut [u8]) -> Option<usize> {
    let out = reply.get_mut(..request.len())?;
    out.copy_from_slice(request);
    respond_in_place(space, out)
}

fn execute<A: AddressSpace>(space: &mut A, buf: &mut [u8]) -> Result<usize, Reject> {
    let len = buf.len();
    if len < TXID_LEN + BEAT_LEN {
        return Err(Reject::TooShort(len));
    }
    // Cheap check that this is LASS at all before touching anything.
    let first = buf[TXID_LEN];
    Command::decode(first).ok_or(Reject::BadCommand(first))?;

    let id = TransactionId::read(buf).ok_or(Reject::TooShort(len))?;
    tracing::trace!("LASS transaction {:#018x}, {} bytes", id.0, len);

    let mut pos = TXID_LEN;
    while pos + 1 < len {
        let (byte, field) = split_header(read_u32_be(buf, pos).ok_or(Reject::Truncated(pos))?);
        let command = Command::decode(byte).ok_or(Reject::BadCommand(byte))?;

        if command == Command::Burst {
            if field > MAX_BURST {
                return Err(Reject::BurstTooLong(field));
            }
            let (inner_byte, address) =
                split_header(read_u32_be(buf, pos + 4).ok_or(Reject::Truncated(pos))?);
            let inner = Command::decode(inner_byte).ok_or(Reject::BadCommand(inner_byte))?;

            let data = pos + BEAT_LEN;
            let end = data + 4 * field as usize;
            if end > len {
                return Err(Reject::Truncated(pos));
            }
            // Every repetition targets the same address.
            for at in (data..end).step_by(4) {
                let value = read_u32_be(buf, at).ok_or(Reject::Truncated(at))?;
                let result = handle(space, inner, address, value);
                write_u32_be(buf, at, result).ok_or(Reject::Truncated(at))?;
            }
            pos = end;
        } else {
            let at = pos + 4;
            let value = read_u32_be(buf, at).ok_or(Reject::Truncated(pos))?;
            let result = handle(space, command, field, value);
            write_u32_be(buf, at, result).ok_or(Reject::Truncated(pos))?;
            pos += BEAT_LEN;
        }
    }

    Ok(len)
}

/// Runs one repetition and returns the data word for the reply.
fn handle<A: AddressSpace>(space: &mut A, command: Command, address: u32, data: u32) -> u32 {
    match command {
        Command::Write => {
            space.write(address, data);
            data
        }
        Command::Read => space.read(address),
        Command::Burst | Command::Other(_) => data,
    }
}
