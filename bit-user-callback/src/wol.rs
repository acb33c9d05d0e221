use crate::error::CallbackError;
use mac_address::MacAddress;
use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{info, warn};

/// 6 x 0xFF followed by 16 copies of the MAC address.
pub const MAGIC_PACKET_LEN: usize = 102;

#[derive(Debug, thiserror::Error)]
pub enum WolError {
    #[error("no valid hardware address to wake")]
    MissingHardwareAddress,
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("short send: {sent} of 102 bytes")]
    ShortSend { sent: usize },
}

/// Transmits one magic packet.
pub trait WolSender {
    fn send(
        &self,
        mac: Option<MacAddress>,
        local: Option<SocketAddr>,
        remote: SocketAddr,
    ) -> impl Future<Output = Result<(), WolError>>;
}

pub fn magic_packet(mac: MacAddress) -> [u8; MAGIC_PACKET_LEN] {
    let mut pkt = [0xFFu8; MAGIC_PACKET_LEN];
    for chunk in pkt[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&mac.bytes());
    }
    pkt
}

/// UDP sender with broadcast enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpWolSender;

impl WolSender for UdpWolSender {
    async fn send(
        &self,
        mac: Option<MacAddress>,
        local: Option<SocketAddr>,
        remote: SocketAddr,
    ) -> Result<(), WolError> {
        let mac = mac.ok_or(WolError::MissingHardwareAddress)?;
        let pkt = magic_packet(mac);

        let bind_addr = local.unwrap_or_else(|| match remote {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        });
        let sock = UdpSocket::bind(bind_addr).await?;
        sock.set_broadcast(true)?;

        let sent = sock.send_to(&pkt, remote).await?;
        if sent != pkt.len() {
            return Err(WolError::ShortSend { sent });
        }
        Ok(())
    }
}

/// Resolve `host:port` text to the first matching socket address.
async fn resolve(role: &'static str, addr: &str) -> Result<SocketAddr, CallbackError> {
    let invalid = |source| CallbackError::InvalidEndpoint { role, addr: addr.to_string(), source };

    tokio::net::lookup_host(addr)
        .await
        .map_err(invalid)?
        .next()
        .ok_or_else(|| invalid(std::io::Error::new(std::io::ErrorKind::NotFound, "no address found")))
}

/// Sends the wake packet for one poll session.
pub struct WakeEmitter<'a, W> {
    sender: &'a W,
    mac: &'a str,
    local: &'a str,
    remote: &'a str,
}

impl<'a, W: WolSender> WakeEmitter<'a, W> {
    pub fn new(sender: &'a W, mac: &'a str, local: &'a str, remote: &'a str) -> Self {
        Self { sender, mac, local, remote }
    }

    /// Resolve the endpoints and send one magic packet.
    ///
    /// An unparseable MAC address is only warned about here; the sender then
    /// fails on the missing address.
    pub async fn wake(&self) -> Result<(), CallbackError> {
        let remote = resolve("remote", self.remote).await?;
        let local = if self.local.is_empty() {
            None
        } else {
            Some(resolve("local", self.local).await?)
        };

        let mac = match self.mac.parse::<MacAddress>() {
            Ok(mac) => Some(mac),
            Err(e) => {
                warn!("could not parse {:?} as a valid MAC address: {}", self.mac, e);
                None
            }
        };

        info!("sending wake packet to {} via {}", self.mac, remote);
        self.sender
            .send(mac, local, remote)
            .await
            .map_err(|source| CallbackError::WakeSendFailed { mac: self.mac.to_string(), source })
    }
}
