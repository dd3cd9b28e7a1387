use super::pending::PendingMdnsRequest;
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType as HickoryRecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use mdns_relay_application::ports::MdnsResolver;
use mdns_relay_domain::{normalize_name, DomainError, MdnsConfig, ResolvedAddress};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const MAX_MDNS_PACKET: usize = 9000;

/// What a single reply datagram said about the target.
#[derive(Debug, PartialEq, Eq)]
enum ReplyContent {
    Ipv4(Ipv4Addr, u32),
    Ipv6Only,
    Unrelated,
}

pub struct MdnsClient {
    group: SocketAddr,
    timeout: Duration,
    min_ttl: u32,
    max_ttl: u32,
}

impl MdnsClient {
    pub fn new(group: SocketAddr, timeout: Duration) -> Self {
        Self {
            group,
            timeout,
            min_ttl: 10,
            max_ttl: 3600,
        }
    }

    pub fn from_config(config: &MdnsConfig) -> Result<Self, DomainError> {
        let group = config.group_addr().map_err(DomainError::ConfigError)?;
        Ok(Self::new(group, Duration::from_millis(config.timeout_ms))
            .with_ttl_bounds(config.min_ttl, config.max_ttl))
    }

    pub fn with_ttl_bounds(mut self, min_ttl: u32, max_ttl: u32) -> Self {
        self.min_ttl = min_ttl;
        self.max_ttl = max_ttl.max(min_ttl);
        self
    }

    fn build_query(target: &str, token: u16) -> Result<Vec<u8>, DomainError> {
        let name = Name::from_str(&format!("{}.", target)).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid mDNS target '{}': {}", target, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(HickoryRecordType::A);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(token, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(false);
        message.add_query(query);

        let mut buf = Vec::with_capacity(64);
        let mut encoder = BinEncoder::new(&mut buf);
        message.emit(&mut encoder).map_err(|e| {
            DomainError::IoError(format!("Failed to serialize mDNS query: {}", e))
        })?;

        Ok(buf)
    }

    fn inspect_reply(request: &PendingMdnsRequest, bytes: &[u8]) -> ReplyContent {
        let message = match Message::from_vec(bytes) {
            Ok(message) => message,
            Err(e) => {
                debug!(mdns_target = %request.target, error = %e, "Ignoring unparsable mDNS datagram");
                return ReplyContent::Unrelated;
            }
        };

        if message.message_type() != MessageType::Response || !request.accepts_id(message.id()) {
            return ReplyContent::Unrelated;
        }

        let mut saw_ipv6 = false;
        for record in message.answers().iter().chain(message.additionals()) {
            // TTL 0 announces that the record is going away.
            if record.ttl() == 0 || normalize_name(&record.name().to_utf8()) != *request.target {
                continue;
            }
            match record.data() {
                RData::A(a) => return ReplyContent::Ipv4(a.0, record.ttl()),
                RData::AAAA(_) => saw_ipv6 = true,
                _ => {}
            }
        }

        if saw_ipv6 {
            ReplyContent::Ipv6Only
        } else {
            ReplyContent::Unrelated
        }
    }
}

#[async_trait]
impl MdnsResolver for MdnsClient {
    async fn resolve(&self, target: &str) -> Result<ResolvedAddress, DomainError> {
        let target = normalize_name(target);
        let request = PendingMdnsRequest::open(&target, self.group, self.timeout).await?;
        let query = Self::build_query(&target, request.token)?;

        request.send(&query, self.group).await?;
        debug!(mdns_target = %target, group = %self.group, token = request.token, "mDNS query sent");

        let mut buf = vec![0u8; MAX_MDNS_PACKET];
        let mut saw_ipv6 = false;

        while let Some((len, from)) = request.recv(&mut buf).await? {
            match Self::inspect_reply(&request, &buf[..len]) {
                ReplyContent::Ipv4(address, ttl) => {
                    let ttl = ttl.clamp(self.min_ttl, self.max_ttl);
                    debug!(
                        mdns_target = %target,
                        address = %address,
                        ttl = ttl,
                        responder = %from,
                        "mDNS target resolved"
                    );
                    return Ok(ResolvedAddress::new(IpAddr::V4(address), ttl));
                }
                ReplyContent::Ipv6Only => {
                    debug!(mdns_target = %target, responder = %from, "IPv6-only mDNS reply, waiting for IPv4");
                    saw_ipv6 = true;
                }
                ReplyContent::Unrelated => {}
            }
        }

        if saw_ipv6 {
            Err(DomainError::MdnsNotFound(target))
        } else {
            Err(DomainError::QueryTimeout)
        }
    }
}
