use crate::config::{ConfigError, SpecialDomainConfig};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Lowercases a name and strips surrounding whitespace and the trailing root dot.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Checks RFC 1035 length limits on an already normalized name.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("'{}' exceeds {} characters", name, MAX_NAME_LEN));
    }
    for label in name.split('.') {
        if label.is_empty() {
            return Err(format!("'{}' contains an empty label", name));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(format!(
                "label '{}' in '{}' exceeds {} characters",
                label, name, MAX_LABEL_LEN
            ));
        }
    }
    Ok(())
}

/// Where a special name points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingTarget {
    /// A `.local` host resolved through multicast DNS.
    Mdns(Arc<str>),
    /// Any other host name, resolved through the upstream server.
    Host(Arc<str>),
    /// A literal address answered without any lookup.
    Address(IpAddr),
}

impl MappingTarget {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if let Ok(address) = trimmed.parse::<IpAddr>() {
            return Ok(Self::Address(address));
        }
        let host = normalize_name(trimmed);
        validate_name(&host)?;
        if host == "local" || host.ends_with(".local") {
            Ok(Self::Mdns(host.into()))
        } else {
            Ok(Self::Host(host.into()))
        }
    }
}

impl fmt::Display for MappingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mdns(host) | Self::Host(host) => write!(f, "{}", host),
            Self::Address(address) => write!(f, "{}", address),
        }
    }
}

/// A root domain with its own target and single-label subdomain overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMapping {
    pub root: Arc<str>,
    pub target: MappingTarget,
    pub subdomains: HashMap<Arc<str>, MappingTarget>,
}

impl DomainMapping {
    pub fn new(root: &str, target: MappingTarget) -> Result<Self, ConfigError> {
        let root = normalize_name(root);
        validate_name(&root).map_err(|e| invalid(&root, e))?;
        Ok(Self {
            root: root.into(),
            target,
            subdomains: HashMap::new(),
        })
    }

    pub fn with_subdomain(mut self, label: &str, target: MappingTarget) -> Result<Self, ConfigError> {
        let label = normalize_name(label);
        if label.contains('.') {
            return Err(invalid(
                &self.root,
                format!("subdomain '{}' must be a single label", label),
            ));
        }
        validate_name(&label).map_err(|e| invalid(&self.root, e))?;
        validate_name(&format!("{}.{}", label, self.root)).map_err(|e| invalid(&self.root, e))?;

        let key: Arc<str> = label.into();
        if self.subdomains.contains_key(&key) {
            return Err(invalid(
                &self.root,
                format!("subdomain '{}' is defined more than once", key),
            ));
        }
        self.subdomains.insert(key, target);
        Ok(self)
    }

    pub fn from_config(root: &str, config: &SpecialDomainConfig) -> Result<Self, ConfigError> {
        let target = MappingTarget::parse(&config.target).map_err(|e| invalid(root, e))?;
        let mut mapping = Self::new(root, target)?;
        for (label, raw_target) in &config.subdomains {
            let target = MappingTarget::parse(raw_target)
                .map_err(|e| invalid(root, format!("subdomain '{}': {}", label, e)))?;
            mapping = mapping.with_subdomain(label, target)?;
        }
        Ok(mapping)
    }

    pub fn subdomain_target(&self, label: &str) -> Option<&MappingTarget> {
        self.subdomains.get(label)
    }
}

/// Builds and cross-validates every mapping of a configuration.
///
/// Root domains must be unique after normalization and must not be label
/// suffixes of each other, so any query name matches at most one root.
pub fn build_mappings(
    special_domains: &BTreeMap<String, SpecialDomainConfig>,
) -> Result<Vec<DomainMapping>, ConfigError> {
    let mut mappings = Vec::with_capacity(special_domains.len());
    let mut roots: HashSet<Arc<str>> = HashSet::with_capacity(special_domains.len());

    for (root, config) in special_domains {
        let mapping = DomainMapping::from_config(root, config)?;
        if !roots.insert(mapping.root.clone()) {
            return Err(ConfigError::Validation(format!(
                "special domain '{}' is defined more than once",
                mapping.root
            )));
        }
        mappings.push(mapping);
    }

    for mapping in &mappings {
        let mut rest = mapping.root.as_ref();
        while let Some((label, parent)) = rest.split_once('.') {
            if roots.contains(parent) {
                let shadowed = mappings
                    .iter()
                    .find(|m| m.root.as_ref() == parent)
                    .is_some_and(|m| m.subdomains.contains_key(label));
                let detail = if shadowed && parent.len() + label.len() + 1 == mapping.root.len() {
                    format!(
                        "'{}' is both a special domain and subdomain '{}' of '{}'",
                        mapping.root, label, parent
                    )
                } else {
                    format!("'{}' overlaps special domain '{}'", mapping.root, parent)
                };
                return Err(ConfigError::Validation(detail));
            }
            rest = parent;
        }
    }

    Ok(mappings)
}

fn invalid(root: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::Validation(format!("special domain '{}': {}", root, reason))
}
