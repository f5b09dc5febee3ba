// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Owned transaction model for clients building requests and reading replies.

use alloc::vec::Vec;

use crate::config::{BEAT_LEN, CMD_BURST, CMD_READ, CMD_WRITE, MAX_BURST, TXID_LEN};
use crate::error::{KernelError, Result};
use crate::lass::command::Command;
use crate::lass::wire::{join_header, read_u32_be, split_header, TransactionId, ADDR_MASK};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Beat {
    Simple { command: u8, address: u32, data: u32 },
    Burst { command: u8, address: u32, data: Vec<u32> },
}

impl Beat {
    pub fn write(address: u32, data: u32) -> Self {
        Beat::Simple { command: CMD_WRITE, address, data }
    }

    pub fn read(address: u32) -> Self {
        Beat::Simple { command: CMD_READ, address, data: 0 }
    }

    pub fn burst_write(address: u32, data: Vec<u32>) -> Self {
        Beat::Burst { command: CMD_WRITE, address, data }
    }

    pub fn burst_read(address: u32, count: usize) -> Self {
        Beat::Burst { command: CMD_READ, address, data: alloc::vec![0; count] }
    }

    pub fn address(&self) -> u32 {
        match self {
            Beat::Simple { address, .. } | Beat::Burst { address, .. } => *address,
        }
    }

    /// Data words carried by the beat, one per repetition.
    pub fn data(&self) -> &[u32] {
        match self {
            Beat::Simple { data, .. } => core::slice::from_ref(data),
            Beat::Burst { data, .. } => data,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Beat::Simple { .. } => BEAT_LEN,
            Beat::Burst { data, .. } => BEAT_LEN + 4 * data.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    pub beats: Vec<Beat>,
}

impl Transaction {
    pub fn new(id: u64) -> Self {
        Self { id: TransactionId(id), beats: Vec::new() }
    }

    pub fn with(mut self, beat: Beat) -> Self {
        self.beats.push(beat);
        self
    }

    pub fn encoded_len(&self) -> usize {
        TXID_LEN + self.beats.iter().map(Beat::encoded_len).sum::<usize>()
    }

    /// Serializes to wire format. Fails on addresses wider than 24 bits,
    /// invalid command bytes or bursts longer than the engine accepts.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.beats.is_empty() {
            return Err(KernelError::Malformed);
        }
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.id.to_bytes());

        for beat in &self.beats {
            match beat {
                Beat::Simple { command, address, data } => {
                    check_beat(*command, *address)?;
                    if *command & CMD_BURST != 0 {
                        return Err(KernelError::Malformed);
                    }
                    out.extend_from_slice(&join_header(*command, *address).to_be_bytes());
                    out.extend_from_slice(&data.to_be_bytes());
                }
                Beat::Burst { command, address, data } => {
                    check_beat(*command, *address)?;
                    if data.len() as u32 > MAX_BURST {
                        return Err(KernelError::Malformed);
                    }
                    out.extend_from_slice(&join_header(CMD_BURST, data.len() as u32).to_be_bytes());
                    out.extend_from_slice(&join_header(*command, *address).to_be_bytes());
                    for word in data {
                        out.extend_from_slice(&word.to_be_bytes());
                    }
                }
            }
        }
        Ok(out)
    }

    /// Parses a request or a reply, applying the same structural rules as
    /// the engine.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < TXID_LEN + BEAT_LEN {
            return Err(KernelError::Malformed);
        }
        let id = TransactionId::read(bytes).ok_or(KernelError::Malformed)?;
        let mut beats = Vec::new();
        let mut pos = TXID_LEN;

        while pos + 1 < bytes.len() {
            let (byte, field) = split_header(word(bytes, pos)?);
            let command = Command::decode(byte).ok_or(KernelError::Malformed)?;
            if command == Command::Burst {
                if field > MAX_BURST {
                    return Err(KernelError::Malformed);
                }
                let (inner, address) = split_header(word(bytes, pos + 4)?);
                Command::decode(inner).ok_or(KernelError::Malformed)?;
                let data = (0..field as usize)
                    .map(|i| word(bytes, pos + BEAT_LEN + 4 * i))
                    .collect::<Result<Vec<u32>>>()?;
                pos += BEAT_LEN + 4 * data.len();
                beats.push(Beat::Burst { command: inner, address, data });
            } else {
                let data = word(bytes, pos + 4)?;
                beats.push(Beat::Simple { command: byte, address: field, data });
                pos += BEAT_LEN;
            }
        }

        Ok(Self { id, beats })
    }
}

fn word(bytes: &[u8], at: usize) -> Result<u32> {
    read_u32_be(bytes, at).ok_or(KernelError::Malformed)
}

fn check_beat(command: u8, address: u32) -> Result<()> {
    if address & !ADDR_MASK != 0 {
        return Err(KernelError::Malformed);
    }
    Command::decode(command).ok_or(KernelError::Malformed)?;
    Ok(())
}
