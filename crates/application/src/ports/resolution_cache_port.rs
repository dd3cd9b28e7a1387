use mdns_relay_domain::{RecordType, ResolvedAddress};

/// Port for the special-domain answer cache.
///
/// Entries are keyed by (resolved target host, record type) and expire with
/// the TTL they were stored with. `get` returns the remaining TTL.
pub trait ResolutionCachePort: Send + Sync {
    fn get(&self, host: &str, record_type: RecordType) -> Option<ResolvedAddress>;
    fn insert(&self, host: &str, record_type: RecordType, resolved: ResolvedAddress);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
