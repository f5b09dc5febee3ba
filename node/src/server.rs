// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! LASS over UDP.

use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use crate::board::Board;
use crate::errors::NodeError;

/// Largest datagram accepted; an Ethernet frame's worth of payload.
pub const MAX_PACKET: usize = 1500;

pub type SharedBoard = Arc<Mutex<Board>>;

/// Answers LASS datagrams on `socket` until an I/O error occurs.
/// Malformed transactions get no reply.
pub async fn serve(socket: UdpSocket, board: SharedBoard) -> Result<(), NodeError> {
    let mut request = vec![0u8; MAX_PACKET];
    let mut reply = vec![0u8; MAX_PACKET];

    loop {
        let (len, peer) = socket.recv_from(&mut request).await?;
        let reply_len = {
            let mut board = board.lock().await;
            board.handle_packet(&request[..len], &mut reply)
        };

        match reply_len {
            Some(n) => {
                tracing::trace!("LASS {} bytes from {} answered", len, peer);
                socket.send_to(&reply[..n], peer).await?;
            }
            None => tracing::debug!("LASS {} bytes from {} dropped", len, peer),
        }
    }
}
