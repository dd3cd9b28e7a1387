use mdns_relay_domain::DomainError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

const MDNS_MULTICAST_TTL: u32 = 255;

/// One outstanding mDNS resolution.
///
/// Owns the socket the question was sent from, so dropping the request
/// releases everything tied to it. Never shared between resolutions.
pub struct PendingMdnsRequest {
    pub target: Arc<str>,
    /// Transaction ID carried by the question; replies must echo it (or 0).
    pub token: u16,
    pub deadline: Instant,
    socket: UdpSocket,
}

impl PendingMdnsRequest {
    pub async fn open(target: &str, group: SocketAddr, timeout: Duration) -> Result<Self, DomainError> {
        let bind_addr: SocketAddr = if group.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to bind mDNS socket: {}", e)))?;

        if group.is_ipv4() {
            socket
                .set_multicast_ttl_v4(MDNS_MULTICAST_TTL)
                .map_err(|e| DomainError::IoError(format!("Failed to set multicast TTL: {}", e)))?;
        }

        Ok(Self {
            target: target.into(),
            token: fastrand::u16(1..),
            deadline: Instant::now() + timeout,
            socket,
        })
    }

    pub async fn send(&self, message: &[u8], group: SocketAddr) -> Result<(), DomainError> {
        self.socket.send_to(message, group).await.map_err(|e| {
            DomainError::IoError(format!("Failed to send mDNS query to {}: {}", group, e))
        })?;
        Ok(())
    }

    /// Waits for the next datagram. `Ok(None)` once the deadline has passed.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, DomainError> {
        match tokio::time::timeout_at(self.deadline, self.socket.recv_from(buf)).await {
            Err(_) => Ok(None),
            Ok(Ok(received)) => Ok(Some(received)),
            Ok(Err(e)) => Err(DomainError::IoError(format!(
                "Failed to receive mDNS reply for {}: {}",
                self.target, e
            ))),
        }
    }

    pub fn accepts_id(&self, id: u16) -> bool {
        id == self.token || id == 0
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
