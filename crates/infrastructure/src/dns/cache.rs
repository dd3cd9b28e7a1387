use dashmap::DashMap;
use mdns_relay_application::ports::ResolutionCachePort;
use mdns_relay_domain::{RecordType, ResolvedAddress};
use rustc_hash::FxBuildHasher;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: String,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        Self {
            domain: domain.to_string(),
            record_type,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedAnswer {
    resolved: ResolvedAddress,
    expires_at: Instant,
}

/// Special-domain answers, each kept until its own TTL runs out.
///
/// `get` returns the remaining TTL so downstream caches never hold an answer
/// longer than the mDNS responder allowed.
pub struct ResolutionCache {
    entries: DashMap<CacheKey, CachedAnswer, FxBuildHasher>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Drops every expired entry; returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionCachePort for ResolutionCache {
    fn get(&self, name: &str, record_type: RecordType) -> Option<ResolvedAddress> {
        let key = CacheKey::new(name, record_type);
        let now = Instant::now();

        let (address, remaining) = {
            let entry = self.entries.get(&key)?;
            (entry.resolved.address, remaining_secs(entry.expires_at, now))
        };

        if remaining == 0 {
            self.entries
                .remove_if(&key, |_, entry| remaining_secs(entry.expires_at, now) == 0);
            return None;
        }

        Some(ResolvedAddress::new(address, remaining))
    }

    fn insert(&self, name: &str, record_type: RecordType, resolved: ResolvedAddress) {
        if resolved.ttl == 0 {
            return;
        }
        let expires_at = Instant::now() + Duration::from_secs(resolved.ttl as u64);
        self.entries.insert(
            CacheKey::new(name, record_type),
            CachedAnswer {
                resolved,
                expires_at,
            },
        );
        debug!(domain = %name, record_type = %record_type, ttl = resolved.ttl, "Cached special-domain answer");
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn remaining_secs(expires_at: Instant, now: Instant) -> u32 {
    expires_at
        .saturating_duration_since(now)
        .as_secs()
        .min(u32::MAX as u64) as u32
}
