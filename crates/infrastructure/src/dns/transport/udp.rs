//! UDP upstream transport (RFC 1035 §4.2.1)
//!
//! Relays a query datagram unchanged to the upstream resolver and returns the
//! reply unchanged. One ephemeral socket per exchange, no retries.

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType as HickoryRecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use mdns_relay_application::ports::UpstreamForwarder;
use mdns_relay_domain::{DomainError, ResolvedAddress, UpstreamConfig};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Largest payload a UDP datagram can carry.
const MAX_UDP_RESPONSE_SIZE: usize = 65_535;

pub struct UdpTransport {
    server_addr: SocketAddr,
    timeout: Duration,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            server_addr,
            timeout,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let server_addr = config.server_addr().map_err(DomainError::ConfigError)?;
        Ok(Self::new(server_addr, Duration::from_millis(config.timeout_ms)))
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn build_host_query(host: &str, id: u16) -> Result<Vec<u8>, DomainError> {
        let name = Name::from_str(&format!("{}.", host)).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid host '{}': {}", host, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(HickoryRecordType::A);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let mut buf = Vec::with_capacity(64);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::IoError(format!("Failed to serialize host query: {}", e)))?;

        Ok(buf)
    }

    /// First A record of the answer section; CNAME chains are already
    /// flattened into it by a recursive upstream.
    fn first_ipv4(host: &str, bytes: &[u8]) -> Result<ResolvedAddress, DomainError> {
        let message = Message::from_vec(bytes)
            .map_err(|e| DomainError::MalformedMessage(format!("upstream reply: {}", e)))?;

        if message.response_code() != ResponseCode::NoError {
            return Err(DomainError::HostNotFound(host.to_string()));
        }

        message
            .answers()
            .iter()
            .find_map(|record| match record.data() {
                RData::A(a) => Some(ResolvedAddress::new(IpAddr::V4(a.0), record.ttl())),
                _ => None,
            })
            .ok_or_else(|| DomainError::HostNotFound(host.to_string()))
    }

    fn unreachable(&self, reason: impl Into<String>) -> DomainError {
        DomainError::UpstreamUnreachable {
            server: self.server_addr.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl UpstreamForwarder for UdpTransport {
    async fn forward(&self, query_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let deadline = Instant::now() + self.timeout;

        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.unreachable(format!("failed to bind UDP socket: {}", e)))?;

        let bytes_sent = socket
            .send_to(query_bytes, self.server_addr)
            .await
            .map_err(|e| self.unreachable(format!("send failed: {}", e)))?;

        debug!(server = %self.server_addr, bytes_sent = bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        loop {
            let (bytes_received, from_addr) =
                tokio::time::timeout_at(deadline, socket.recv_from(&mut recv_buf))
                    .await
                    .map_err(|_| DomainError::QueryTimeout)?
                    .map_err(|e| self.unreachable(format!("receive failed: {}", e)))?;

            if from_addr != self.server_addr {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
                continue;
            }

            if bytes_received < 2 || recv_buf[..2] != query_bytes[..2.min(query_bytes.len())] {
                debug!(server = %self.server_addr, "Discarding upstream datagram with a foreign ID");
                continue;
            }

            recv_buf.truncate(bytes_received);
            debug!(server = %self.server_addr, bytes_received = bytes_received, "UDP response received");
            return Ok(recv_buf);
        }
    }

    async fn resolve_host(&self, host: &str) -> Result<ResolvedAddress, DomainError> {
        let query = Self::build_host_query(host, fastrand::u16(..))?;
        let reply = self.forward(&query).await?;
        let resolved = Self::first_ipv4(host, &reply)?;
        debug!(host = %host, address = %resolved.address, ttl = resolved.ttl, "Host target resolved upstream");
        Ok(resolved)
    }

    fn server(&self) -> String {
        self.server_addr.to_string()
    }
}
