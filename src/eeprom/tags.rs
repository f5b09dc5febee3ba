// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Application tags persisted across boots and their factory defaults.

use serde::{Deserialize, Serialize};

use crate::config::VALUE_LEN;
use crate::eeprom::flash::Flash;
use crate::eeprom::store::EepromStore;
use crate::error::{KernelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AppTag {
    BootMode = 0x01,
    MacAddr = 0x02,
    IpAddr = 0x03,
    FanSpeed = 0x04,
    Overtemp = 0x05,
    MgtMux = 0x06,
    Fsynth = 0x07,
}

impl AppTag {
    pub const ALL: [AppTag; 7] = [
        AppTag::BootMode,
        AppTag::MacAddr,
        AppTag::IpAddr,
        AppTag::FanSpeed,
        AppTag::Overtemp,
        AppTag::MgtMux,
        AppTag::Fsynth,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            AppTag::BootMode => "boot_mode",
            AppTag::MacAddr => "mac_addr",
            AppTag::IpAddr => "ip_addr",
            AppTag::FanSpeed => "fan_speed",
            AppTag::Overtemp => "overtemp",
            AppTag::MgtMux => "mgt_mux",
            AppTag::Fsynth => "fsynth",
        }
    }

    pub fn default_value(self) -> [u8; VALUE_LEN] {
        match self {
            AppTag::BootMode => [0; VALUE_LEN],
            AppTag::MacAddr => [0x12, 0x55, 0x55, 0x00, 0x01, 0x2e],
            AppTag::IpAddr => pad(&[192, 168, 19, 31]),
            // percent of full scale
            AppTag::FanSpeed => pad(&[100]),
            // degrees C
            AppTag::Overtemp => pad(&[85]),
            AppTag::MgtMux => [0; VALUE_LEN],
            AppTag::Fsynth => [0; VALUE_LEN],
        }
    }
}

/// Left-aligns `bytes` in a zero-filled record value.
pub fn pad(bytes: &[u8]) -> [u8; VALUE_LEN] {
    let mut out = [0u8; VALUE_LEN];
    let n = bytes.len().min(VALUE_LEN);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Writes the default of every application tag that has no record yet.
/// Returns how many defaults were written.
pub fn populate_defaults<F: Flash>(store: &mut EepromStore<F>) -> Result<usize> {
    let mut written = 0;
    for tag in AppTag::ALL {
        match store.read(tag.tag()) {
            Ok(_) => {}
            Err(KernelError::NotFound) => {
                tracing::info!("EEPROM {} missing, storing default", tag.name());
                store.write(tag.tag(), &tag.default_value())?;
                written += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
