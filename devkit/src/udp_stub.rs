/*!
UDP catcher for wake packets

Bind it on localhost and use its address as `wake-remote`; every datagram
sent there is recorded.
*/

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

pub struct WolCatcher {
    socket: UdpSocket,
}

impl WolCatcher {
    pub async fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        Ok(Self { socket })
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().expect("bound socket has an address")
    }

    /// Next datagram, or `None` if nothing arrives within `wait`.
    pub async fn recv_within(&self, wait: Duration) -> Option<Vec<u8>> {
        let mut buf = [0u8; 1500];
        match timeout(wait, self.socket.recv_from(&mut buf)).await {
            Ok(Ok((len, _))) => Some(buf[..len].to_vec()),
            _ => None,
        }
    }

    /// Drain everything that arrives within `wait`.
    pub async fn collect_within(&self, wait: Duration) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        while let Some(packet) = self.recv_within(wait).await {
            packets.push(packet);
        }
        packets
    }
}

/// Whether `packet` is a magic packet for `mac`.
pub fn is_magic_packet_for(packet: &[u8], mac: [u8; 6]) -> bool {
    packet.len() == 102
        && packet[..6].iter().all(|b| *b == 0xFF)
        && packet[6..].chunks(6).all(|chunk| chunk == mac)
}
