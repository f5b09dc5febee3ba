// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use mmc_kernel::config::FRAME_SIZE;

use crate::errors::NodeError;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// UDP address LASS is served on.
    pub bind_addr: SocketAddr,
    /// File holding both flash sectors of the record store.
    pub flash_image: PathBuf,
    pub sector_size: usize,
    /// Prometheus listener; metrics are not exported when unset.
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 50006)),
            flash_image: PathBuf::from("mmc-flash.bin"),
            sector_size: 2048,
            metrics_addr: None,
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, NodeError> {
    raw.parse()
        .map_err(|_| NodeError::Config(format!("{}: cannot parse {:?}", key, raw)))
}

impl NodeConfig {
    /// Defaults overridden by `MMC_BIND_ADDR`, `MMC_FLASH_IMAGE`,
    /// `MMC_SECTOR_SIZE` and `MMC_METRICS_ADDR`.
    pub fn from_env() -> Result<Self, NodeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NodeError> {
        let mut cfg = Self::default();
        if let Some(raw) = lookup("MMC_BIND_ADDR") {
            cfg.bind_addr = parse("MMC_BIND_ADDR", &raw)?;
        }
        if let Some(raw) = lookup("MMC_FLASH_IMAGE") {
            cfg.flash_image = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("MMC_SECTOR_SIZE") {
            cfg.sector_size = parse("MMC_SECTOR_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("MMC_METRICS_ADDR") {
            cfg.metrics_addr = Some(parse("MMC_METRICS_ADDR", &raw)?);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.sector_size < 2 * FRAME_SIZE || self.sector_size % FRAME_SIZE != 0 {
            return Err(NodeError::Config(format!(
                "sector size {} must be a multiple of {} holding at least two frames",
                self.sector_size, FRAME_SIZE
            )));
        }
        Ok(())
    }
}
