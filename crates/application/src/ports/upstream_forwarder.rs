use async_trait::async_trait;
use mdns_relay_domain::{DomainError, ResolvedAddress};

#[async_trait]
pub trait UpstreamForwarder: Send + Sync {
    /// Relay a raw query datagram and return the raw reply, unmodified.
    async fn forward(&self, query_bytes: &[u8]) -> Result<Vec<u8>, DomainError>;

    /// Look up the IPv4 address of an ordinary host name on the upstream server.
    ///
    /// Fails with `HostNotFound` when the reply carries no A record for it.
    async fn resolve_host(&self, host: &str) -> Result<ResolvedAddress, DomainError>;

    fn server(&self) -> String;
}
