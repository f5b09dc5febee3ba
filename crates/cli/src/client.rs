// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context};
use mmc_kernel::lass::Transaction;

/// Blocking LASS client. One request, one reply.
pub struct LassClient {
    socket: UdpSocket,
    target: SocketAddr,
}

impl LassClient {
    pub fn connect(target: SocketAddr, timeout: Duration) -> anyhow::Result<Self> {
        let local: SocketAddr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" }.parse()?;
        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(Some(timeout))?;
        Ok(Self { socket, target })
    }

    /// Fresh transaction id from the wall clock.
    pub fn next_id() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    }

    /// Sends `tx` and waits for the reply carrying the same id. A silent
    /// peer means the packet was lost or rejected; LASS does not say which.
    pub fn transact(&self, tx: &Transaction) -> anyhow::Result<Transaction> {
        let request = tx.encode().map_err(|e| anyhow!("cannot encode request: {}", e))?;
        self.socket.send_to(&request, self.target)?;

        let mut buf = [0u8; 1500];
        loop {
            let (n, from) = self
                .socket
                .recv_from(&mut buf)
                .with_context(|| format!("no reply from {} (lost or rejected)", self.target))?;
            if from != self.target {
                continue;
            }
            let reply = Transaction::decode(&buf[..n]).map_err(|e| anyhow!("bad reply: {}", e))?;
            if reply.id != tx.id {
                continue;
            }
            if reply.beats.len() != tx.beats.len() {
                bail!("reply has {} beats, sent {}", reply.beats.len(), tx.beats.len());
            }
            return Ok(reply);
        }
    }
}
