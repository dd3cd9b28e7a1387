use arc_swap::ArcSwap;
use mdns_relay_domain::{normalize_name, Config, ConfigError, DomainMapping, MappingTarget};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Which configured entry a query name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialMatch {
    pub root: Arc<str>,
    /// Set when a subdomain override won over the root target.
    pub subdomain: Option<Arc<str>>,
    pub target: MappingTarget,
}

impl SpecialMatch {
    pub fn is_subdomain_override(&self) -> bool {
        self.subdomain.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Special(SpecialMatch),
    NotSpecial,
}

impl Classification {
    pub fn is_special(&self) -> bool {
        matches!(self, Self::Special(_))
    }
}

/// Immutable index of special domains, keyed by normalized root.
#[derive(Debug, Default)]
pub struct MappingTable {
    roots: FxHashMap<Arc<str>, DomainMapping>,
}

impl MappingTable {
    /// Index already validated mappings (see `mdns_relay_domain::build_mappings`).
    pub fn new(mappings: Vec<DomainMapping>) -> Self {
        let roots = mappings
            .into_iter()
            .map(|mapping| (mapping.root.clone(), mapping))
            .collect();
        Self { roots }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.mappings()?))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn classify(&self, name: &str) -> Classification {
        let name = normalize_name(name);

        if let Some(mapping) = self.roots.get(name.as_str()) {
            return Classification::Special(SpecialMatch {
                root: mapping.root.clone(),
                subdomain: None,
                target: mapping.target.clone(),
            });
        }

        let Some((label, parent)) = name.split_once('.') else {
            return Classification::NotSpecial;
        };

        match self.roots.get(parent) {
            Some(mapping) => match mapping.subdomains.get_key_value(label) {
                Some((label, target)) => Classification::Special(SpecialMatch {
                    root: mapping.root.clone(),
                    subdomain: Some(label.clone()),
                    target: target.clone(),
                }),
                None => Classification::NotSpecial,
            },
            None => Classification::NotSpecial,
        }
    }
}

/// Classifies query names against the current mapping snapshot.
///
/// Readers never lock; a reload publishes a whole new table in one store.
pub struct DomainMatcher {
    table: ArcSwap<MappingTable>,
}

impl DomainMatcher {
    pub fn new(table: MappingTable) -> Self {
        debug!(special_domains = table.len(), "Domain matcher created");
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    pub fn classify(&self, name: &str) -> Classification {
        self.table.load().classify(name)
    }

    pub fn snapshot(&self) -> Arc<MappingTable> {
        self.table.load_full()
    }

    pub fn replace(&self, table: MappingTable) {
        let count = table.len();
        self.table.store(Arc::new(table));
        info!(special_domains = count, "Special domain table swapped");
    }
}
