use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MdnsConfig {
    /// Multicast group and port queries are sent to.
    #[serde(default = "default_group")]
    pub group: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Lower clamp for TTLs reported by the responder.
    #[serde(default = "default_min_ttl")]
    pub min_ttl: u32,

    /// Upper clamp for TTLs reported by the responder.
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,

    /// TTL for targets configured as literal addresses.
    #[serde(default = "default_static_ttl")]
    pub static_ttl: u32,

    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl MdnsConfig {
    pub fn group_addr(&self) -> Result<SocketAddr, String> {
        self.group
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| format!("invalid mDNS group address '{}'", self.group))
    }
}

impl Default for MdnsConfig {
    fn default() -> Self {
        Self {
            group: default_group(),
            timeout_ms: default_timeout_ms(),
            min_ttl: default_min_ttl(),
            max_ttl: default_max_ttl(),
            static_ttl: default_static_ttl(),
            cache_enabled: true,
        }
    }
}

fn default_group() -> String {
    "224.0.0.251:5353".to_string()
}

fn default_timeout_ms() -> u64 {
    1500
}

fn default_min_ttl() -> u32 {
    10
}

fn default_max_ttl() -> u32 {
    3600
}

fn default_static_ttl() -> u32 {
    3600
}

fn default_true() -> bool {
    true
}
