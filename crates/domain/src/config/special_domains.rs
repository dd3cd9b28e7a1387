use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `[special_domains."<root>"]` table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SpecialDomainConfig {
    /// mDNS host (`name.local`) or literal address for the root itself.
    #[serde(alias = "ip")]
    pub target: String,

    /// Single-label subdomain → target overrides.
    #[serde(default)]
    pub subdomains: BTreeMap<String, String>,
}

impl SpecialDomainConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            subdomains: BTreeMap::new(),
        }
    }

    pub fn with_subdomain(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.subdomains.insert(label.into(), target.into());
        self
    }
}
