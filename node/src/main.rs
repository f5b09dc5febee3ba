// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use mmc_node::board::Board;
use mmc_node::config::NodeConfig;
use mmc_node::errors::NodeError;
use mmc_node::server::{serve, SharedBoard};
use mmc_node::telemetry::init_telemetry;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<(), NodeError> {
    let cfg = NodeConfig::from_env()?;
    init_telemetry(cfg.metrics_addr)?;

    tracing::info!("Initializing MMC node with config: {:?}", cfg);
    let board = Board::new(&cfg)?;
    match board.store().active_bank() {
        Some(bank) => tracing::info!("EEPROM active bank {:?}", bank),
        None => tracing::error!("EEPROM unavailable, running on defaults"),
    }

    let shared: SharedBoard = Arc::new(Mutex::new(board));
    let socket = UdpSocket::bind(cfg.bind_addr).await?;
    tracing::info!("Serving LASS on udp://{}", socket.local_addr()?);

    serve(socket, shared).await
}
