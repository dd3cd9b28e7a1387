use crate::ports::{MdnsResolver, ResolutionCachePort, UpstreamForwarder};
use crate::services::{Classification, DomainMatcher, SpecialMatch};
use mdns_relay_domain::{
    DnsQuery, DomainError, MappingTarget, RecordType, ResolutionResult,
    ResolvedAddress,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const DEFAULT_STATIC_TTL: u32 = 3600;

/// What the server should send back for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Synthesize a response for a special name.
    Answered(ResolutionResult),
    /// Relay these upstream bytes as-is.
    Relayed(Vec<u8>),
}

pub struct HandleDnsQueryUseCase {
    matcher: Arc<DomainMatcher>,
    mdns: Arc<dyn MdnsResolver>,
    upstream: Arc<dyn UpstreamForwarder>,
    cache: Option<Arc<dyn ResolutionCachePort>>,
    static_ttl: u32,
}

impl HandleDnsQueryUseCase {
    pub fn new(
        matcher: Arc<DomainMatcher>,
        mdns: Arc<dyn MdnsResolver>,
        upstream: Arc<dyn UpstreamForwarder>,
    ) -> Self {
        Self {
            matcher,
            mdns,
            upstream,
            cache: None,
            static_ttl: DEFAULT_STATIC_TTL,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResolutionCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_static_ttl(mut self, ttl: u32) -> Self {
        self.static_ttl = ttl;
        self
    }

    /// Route one decoded query.
    ///
    /// `Err` means the query is dropped without a response; it only happens
    /// on the forwarding path.
    pub async fn execute(
        &self,
        query: &DnsQuery,
        raw_query: &[u8],
    ) -> Result<QueryOutcome, DomainError> {
        let start = Instant::now();

        match self.matcher.classify(&query.name) {
            Classification::NotSpecial => {
                debug!(domain = %query.name, record_type = %query.record_type, "Forwarding to upstream");
                match self.upstream.forward(raw_query).await {
                    Ok(bytes) => {
                        debug!(
                            domain = %query.name,
                            upstream = %self.upstream.server(),
                            elapsed_us = start.elapsed().as_micros() as u64,
                            "Upstream reply relayed"
                        );
                        Ok(QueryOutcome::Relayed(bytes))
                    }
                    Err(e) => {
                        warn!(
                            domain = %query.name,
                            upstream = %self.upstream.server(),
                            error = %e,
                            "Upstream forwarding failed, dropping query"
                        );
                        Err(e)
                    }
                }
            }
            Classification::Special(special) => {
                let result = self.resolve_special(query, &special).await;
                debug!(
                    domain = %query.name,
                    root = %special.root,
                    subdomain = special.subdomain.as_deref().unwrap_or("-"),
                    mapped_to = %special.target,
                    status = result.response_status(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Special domain answered"
                );
                Ok(QueryOutcome::Answered(result))
            }
        }
    }

    async fn resolve_special(&self, query: &DnsQuery, special: &SpecialMatch) -> ResolutionResult {
        if !query.is_internet_class() {
            return ResolutionResult::NoData;
        }

        match &special.target {
            MappingTarget::Address(address) => {
                if family_matches(query.record_type, address) {
                    ResolutionResult::Answer(ResolvedAddress::new(*address, self.static_ttl))
                } else {
                    ResolutionResult::NoData
                }
            }
            MappingTarget::Mdns(host) | MappingTarget::Host(host) => {
                if query.record_type != RecordType::A {
                    return ResolutionResult::NoData;
                }
                self.resolve_target(query, &special.target, host).await
            }
        }
    }

    /// Cache entries are keyed by the target host, so a lookup that finishes
    /// after a reload can only store an address for the host it actually asked.
    async fn resolve_target(
        &self,
        query: &DnsQuery,
        target: &MappingTarget,
        host: &str,
    ) -> ResolutionResult {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(host, query.record_type) {
                debug!(domain = %query.name, mapped_to = %host, ttl = cached.ttl, "Cache hit");
                return ResolutionResult::Answer(cached);
            }
        }

        let lookup = match target {
            MappingTarget::Host(_) => self.upstream.resolve_host(host).await,
            _ => self.mdns.resolve(host).await,
        };

        match lookup {
            Ok(resolved) if resolved.address.is_ipv4() => {
                if let Some(cache) = &self.cache {
                    cache.insert(host, query.record_type, resolved);
                }
                ResolutionResult::Answer(resolved)
            }
            Ok(resolved) => {
                warn!(mapped_to = %host, address = %resolved.address, "Resolver returned a non-IPv4 address");
                ResolutionResult::NxDomain
            }
            Err(e) if e.is_negative_answer() => {
                warn!(domain = %query.name, mapped_to = %host, error = %e, "Target resolution failed");
                ResolutionResult::NxDomain
            }
            Err(e) => {
                warn!(domain = %query.name, mapped_to = %host, error = %e, "Target lookup could not be performed");
                ResolutionResult::ServerFailure
            }
        }
    }
}

fn family_matches(record_type: RecordType, address: &IpAddr) -> bool {
    matches!(
        (record_type, address),
        (RecordType::A, IpAddr::V4(_)) | (RecordType::AAAA, IpAddr::V6(_))
    )
}
