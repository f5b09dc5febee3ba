// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Simulated carrier board: the address map served over LASS and the
//! record store behind it.
//!
//! | base       | size  | granularity | contents                         |
//! |------------|-------|-------------|----------------------------------|
//! | `0x000000` | 64    | word        | config ROM                       |
//! | `0x000800` | 256   | word        | mailbox                          |
//! | `0x001000` | 32    | halfword    | sensor cache                     |
//! | `0x002000` | 42    | byte        | EEPROM page, 6 bytes per app tag |

use mmc_kernel::config::VALUE_LEN;
use mmc_kernel::eeprom::{populate_defaults, AppTag, EepromStore};
use mmc_kernel::lass;
use mmc_kernel::memory::{Granularity, MemoryMap};

use crate::config::NodeConfig;
use crate::errors::NodeError;
use crate::flash::FileFlash;

pub const CONFIG_ROM_BASE: u32 = 0x000000;
pub const CONFIG_ROM_WORDS: u32 = 64;
pub const MAILBOX_BASE: u32 = 0x000800;
pub const MAILBOX_WORDS: u32 = 256;
pub const SENSOR_BASE: u32 = 0x001000;
pub const SENSOR_CHANNELS: u32 = 32;
pub const EEPROM_PAGE_BASE: u32 = 0x002000;
pub const EEPROM_PAGE_BYTES: u32 = (AppTag::ALL.len() * VALUE_LEN) as u32;

/// First word of the config ROM, "MMC1".
pub const ROM_MAGIC: u32 = 0x4D4D_4331;

pub struct Board {
    map: MemoryMap<Vec<u8>>,
    store: EepromStore<FileFlash>,
}

fn config_rom() -> Vec<u8> {
    let mut rom = vec![0u8; CONFIG_ROM_WORDS as usize * 4];
    rom[..4].copy_from_slice(&ROM_MAGIC.to_le_bytes());
    let version = env!("CARGO_PKG_VERSION").as_bytes();
    let n = version.len().min(rom.len() - 4);
    rom[4..4 + n].copy_from_slice(&version[..n]);
    rom
}

impl Board {
    pub fn new(cfg: &NodeConfig) -> Result<Self, NodeError> {
        cfg.validate()?;
        let flash = FileFlash::open(&cfg.flash_image, cfg.sector_size)?;
        let mut store = EepromStore::open(flash);

        // Persistence trouble must not keep the board from serving.
        match populate_defaults(&mut store) {
            Ok(0) => {}
            Ok(n) => tracing::info!("Stored {} default EEPROM values", n),
            Err(e) => tracing::error!("EEPROM defaults unavailable: {}", e),
        }

        let mut map = MemoryMap::new();
        map.register(CONFIG_ROM_BASE, CONFIG_ROM_WORDS, config_rom(), Granularity::Word)?;
        map.register(MAILBOX_BASE, MAILBOX_WORDS, vec![0; MAILBOX_WORDS as usize * 4], Granularity::Word)?;
        map.register(SENSOR_BASE, SENSOR_CHANNELS, vec![0; SENSOR_CHANNELS as usize * 2], Granularity::Halfword)?;
        map.register(EEPROM_PAGE_BASE, EEPROM_PAGE_BYTES, vec![0; EEPROM_PAGE_BYTES as usize], Granularity::Byte)?;

        let mut board = Self { map, store };
        board.load_eeprom_page();
        Ok(board)
    }

    pub fn map(&self) -> &MemoryMap<Vec<u8>> {
        &self.map
    }

    pub fn store(&self) -> &EepromStore<FileFlash> {
        &self.store
    }

    /// Publishes a sensor reading into the cache peers read over LASS.
    pub fn set_sensor(&mut self, channel: u32, value: u16) {
        if channel < SENSOR_CHANNELS {
            self.map.write(SENSOR_BASE + channel, value as u32);
        }
    }

    /// Executes one LASS request. `None` means no reply is sent.
    pub fn handle_packet(&mut self, request: &[u8], reply: &mut [u8]) -> Option<usize> {
        let result = lass::respond(&mut self.map, request, reply);
        match result {
            Some(_) => metrics::increment_counter!("lass_transactions_total"),
            None => metrics::increment_counter!("lass_transactions_dropped_total"),
        }
        // Beats before a malformed one may have landed, so commit either way.
        self.commit_eeprom_page();
        result
    }

    fn load_eeprom_page(&mut self) {
        let Some(page) = self.map.backing_mut(EEPROM_PAGE_BASE) else { return };
        for (i, tag) in AppTag::ALL.into_iter().enumerate() {
            let value = self.store.read(tag.tag()).unwrap_or_else(|_| tag.default_value());
            page[i * VALUE_LEN..(i + 1) * VALUE_LEN].copy_from_slice(&value);
        }
    }

    /// Persists page entries that differ from the store. Identical values
    /// cost no flash writes.
    pub fn commit_eeprom_page(&mut self) {
        let Some(page) = self.map.backing(EEPROM_PAGE_BASE) else { return };
        for (i, tag) in AppTag::ALL.into_iter().enumerate() {
            let mut value = [0u8; VALUE_LEN];
            value.copy_from_slice(&page[i * VALUE_LEN..(i + 1) * VALUE_LEN]);
            if self.store.read(tag.tag()).ok() == Some(value) {
                continue;
            }
            match self.store.write(tag.tag(), &value) {
                Ok(()) => {
                    metrics::increment_counter!("eeprom_writes_total");
                    tracing::debug!("EEPROM {} <- {:02x?}", tag.name(), value);
                }
                Err(e) => tracing::error!("EEPROM {} not saved: {}", tag.name(), e),
            }
        }
    }
}
