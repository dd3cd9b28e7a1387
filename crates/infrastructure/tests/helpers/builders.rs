#![allow(dead_code)]
use mdns_relay_application::ports::ResolutionCachePort;
use mdns_relay_application::services::{DomainMatcher, MappingTable};
use mdns_relay_application::use_cases::HandleDnsQueryUseCase;
use mdns_relay_domain::{Config, SpecialDomainConfig};
use mdns_relay_infrastructure::dns::{DnsServerHandler, MdnsClient, ResolutionCache, UdpTransport};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

/// Raw query datagram with RD set and a single IN question.
pub fn query_bytes(id: u16, name: &str, qtype: u16) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&[0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    for label in name.split('.') {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
    buf.extend_from_slice(&qtype.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x01]);
    buf
}

pub fn edns_query(id: u16, name: &str, qtype: u16, udp_size: u16) -> Vec<u8> {
    let mut buf = query_bytes(id, name, qtype);
    buf[11] = 1;
    buf.push(0);
    buf.extend_from_slice(&[0x00, 0x29]);
    buf.extend_from_slice(&udp_size.to_be_bytes());
    buf.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    buf
}

/// The IPv4 address of the first answer, assuming a single-question response.
pub fn response_answer_ipv4(response: &[u8], question_len: usize) -> Option<Ipv4Addr> {
    let ancount = u16::from_be_bytes([response[6], response[7]]);
    if ancount == 0 {
        return None;
    }
    let rdata = 12 + question_len + 12;
    let octets: [u8; 4] = response.get(rdata..rdata + 4)?.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

/// Wires a `DnsServerHandler` against loopback mocks.
pub struct HandlerBuilder {
    config: Config,
    mdns_group: SocketAddr,
    upstream: SocketAddr,
    mdns_timeout: Duration,
    upstream_timeout: Duration,
    cache: Option<Arc<ResolutionCache>>,
}

impl HandlerBuilder {
    pub fn new(mdns_group: SocketAddr, upstream: SocketAddr) -> Self {
        Self {
            config: Config::default(),
            mdns_group,
            upstream,
            mdns_timeout: Duration::from_millis(300),
            upstream_timeout: Duration::from_millis(300),
            cache: None,
        }
    }

    pub fn special(mut self, root: &str, target: &str) -> Self {
        self.config
            .special_domains
            .insert(root.to_string(), SpecialDomainConfig::new(target));
        self
    }

    pub fn subdomain(mut self, root: &str, label: &str, target: &str) -> Self {
        if let Some(entry) = self.config.special_domains.get_mut(root) {
            entry.subdomains.insert(label.to_string(), target.to_string());
        }
        self
    }

    pub fn mdns_timeout(mut self, timeout: Duration) -> Self {
        self.mdns_timeout = timeout;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResolutionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> DnsServerHandler {
        let table = MappingTable::from_config(&self.config).unwrap();
        let matcher = Arc::new(DomainMatcher::new(table));
        let mdns = Arc::new(MdnsClient::new(self.mdns_group, self.mdns_timeout).with_ttl_bounds(10, 3600));
        let upstream = Arc::new(UdpTransport::new(self.upstream, self.upstream_timeout));

        let mut use_case = HandleDnsQueryUseCase::new(matcher, mdns, upstream).with_static_ttl(3600);
        if let Some(cache) = self.cache {
            let cache: Arc<dyn ResolutionCachePort> = cache;
            use_case = use_case.with_cache(cache);
        }

        DnsServerHandler::new(Arc::new(use_case))
    }
}
