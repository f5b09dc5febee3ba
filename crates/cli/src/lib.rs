// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use mmc_kernel::config::MAX_BURST;

pub mod client;
pub mod commands;

/// Parses `0x`-prefixed hex or plain decimal.
pub fn parse_u32(raw: &str) -> Result<u32, String> {
    let raw = raw.trim().replace('_', "");
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| format!("{:?}: {}", raw, e))
}

/// Parses a repetition count: at least one, at most one burst's worth.
pub fn parse_count(raw: &str) -> Result<usize, String> {
    let count = parse_u32(raw)?;
    if count == 0 || count > MAX_BURST {
        return Err(format!("count must be between 1 and {}", MAX_BURST));
    }
    Ok(count as usize)
}
