use super::RecordType;
use std::net::SocketAddr;
use std::sync::Arc;

/// DNS class IN.
pub const CLASS_IN: u16 = 1;

/// One inbound question, alive only while its response is being produced.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub id: u16,
    /// Query name as received (original case, no trailing dot).
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub class: u16,
    pub client: SocketAddr,
}

impl DnsQuery {
    pub fn new(
        id: u16,
        name: impl Into<Arc<str>>,
        record_type: RecordType,
        class: u16,
        client: SocketAddr,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            record_type,
            class,
            client,
        }
    }

    pub fn is_internet_class(&self) -> bool {
        self.class == CLASS_IN
    }
}
