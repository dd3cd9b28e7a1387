#![allow(dead_code)]

use async_trait::async_trait;
use mdns_relay_application::ports::{MdnsResolver, ResolutionCachePort, UpstreamForwarder};
use mdns_relay_domain::{DomainError, RecordType, ResolvedAddress};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct MockMdnsResolver {
    responses: Arc<RwLock<HashMap<String, Result<ResolvedAddress, DomainError>>>>,
    calls: Arc<RwLock<Vec<String>>>,
    gate: Arc<RwLock<Option<Arc<Notify>>>>,
}

impl MockMdnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_address(&self, target: &str, ip: &str, ttl: u32) {
        let resolved = ResolvedAddress::new(ip.parse().unwrap(), ttl);
        self.responses
            .write()
            .unwrap()
            .insert(target.to_string(), Ok(resolved));
    }

    pub fn set_error(&self, target: &str, error: DomainError) {
        self.responses
            .write()
            .unwrap()
            .insert(target.to_string(), Err(error));
    }

    /// Makes every following `resolve` wait until `release` is called.
    pub fn hold(&self) {
        *self.gate.write().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.write().unwrap().take() {
            gate.notify_waiters();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl MdnsResolver for MockMdnsResolver {
    async fn resolve(&self, target: &str) -> Result<ResolvedAddress, DomainError> {
        let gate = self.gate.read().unwrap().clone();
        let released = gate.as_ref().map(|gate| gate.notified());
        self.calls.write().unwrap().push(target.to_string());
        if let Some(released) = released {
            released.await;
        }
        self.responses
            .read()
            .unwrap()
            .get(target)
            .cloned()
            .unwrap_or(Err(DomainError::QueryTimeout))
    }
}

#[derive(Clone, Default)]
pub struct MockUpstreamForwarder {
    reply: Arc<RwLock<Option<Vec<u8>>>>,
    forwarded: Arc<RwLock<Vec<Vec<u8>>>>,
    hosts: Arc<RwLock<HashMap<String, Result<ResolvedAddress, DomainError>>>>,
    host_lookups: Arc<RwLock<Vec<String>>>,
}

impl MockUpstreamForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reply(&self, bytes: Vec<u8>) {
        *self.reply.write().unwrap() = Some(bytes);
    }

    pub fn forwarded(&self) -> Vec<Vec<u8>> {
        self.forwarded.read().unwrap().clone()
    }

    pub fn set_host(&self, host: &str, ip: &str, ttl: u32) {
        let resolved = ResolvedAddress::new(ip.parse().unwrap(), ttl);
        self.hosts
            .write()
            .unwrap()
            .insert(host.to_string(), Ok(resolved));
    }

    pub fn host_lookups(&self) -> Vec<String> {
        self.host_lookups.read().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamForwarder for MockUpstreamForwarder {
    async fn forward(&self, query_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        self.forwarded.write().unwrap().push(query_bytes.to_vec());
        match self.reply.read().unwrap().clone() {
            Some(bytes) => Ok(bytes),
            None => Err(DomainError::UpstreamUnreachable {
                server: self.server(),
                reason: "no reply configured".to_string(),
            }),
        }
    }

    async fn resolve_host(&self, host: &str) -> Result<ResolvedAddress, DomainError> {
        self.host_lookups.write().unwrap().push(host.to_string());
        self.hosts
            .read()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| Err(DomainError::HostNotFound(host.to_string())))
    }

    fn server(&self) -> String {
        "mock-upstream:53".to_string()
    }
}

#[derive(Clone, Default)]
pub struct MockResolutionCache {
    entries: Arc<RwLock<HashMap<(String, RecordType), ResolvedAddress>>>,
    clears: Arc<AtomicUsize>,
}

impl MockResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::Relaxed)
    }
}

impl ResolutionCachePort for MockResolutionCache {
    fn get(&self, name: &str, record_type: RecordType) -> Option<ResolvedAddress> {
        self.entries
            .read()
            .unwrap()
            .get(&(name.to_string(), record_type))
            .copied()
    }

    fn insert(&self, name: &str, record_type: RecordType, resolved: ResolvedAddress) {
        self.entries
            .write()
            .unwrap()
            .insert((name.to_string(), record_type), resolved);
    }

    fn clear(&self) {
        self.entries.write().unwrap().clear();
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}
