use async_trait::async_trait;
use mdns_relay_domain::{DomainError, ResolvedAddress};

#[async_trait]
pub trait MdnsResolver: Send + Sync {
    /// Resolve a `.local` host to an IPv4 address.
    ///
    /// Fails with `MdnsNotFound` when the host has no IPv4 address and with
    /// `QueryTimeout` when nothing answered in time.
    async fn resolve(&self, target: &str) -> Result<ResolvedAddress, DomainError>;
}
