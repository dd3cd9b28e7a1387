use crate::ports::ResolutionCachePort;
use crate::services::{DomainMatcher, MappingTable};
use mdns_relay_domain::{Config, DomainError};
use std::sync::Arc;
use tracing::info;

/// Re-reads the special-domain table from a config file and swaps it in whole.
///
/// Any load or validation failure leaves the current table untouched.
pub struct ReloadMappingsUseCase {
    matcher: Arc<DomainMatcher>,
    cache: Option<Arc<dyn ResolutionCachePort>>,
}

impl ReloadMappingsUseCase {
    pub fn new(matcher: Arc<DomainMatcher>) -> Self {
        Self {
            matcher,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResolutionCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn execute(&self, config_path: &str) -> Result<usize, DomainError> {
        let config = Config::from_file(config_path)
            .map_err(|e| DomainError::ConfigError(format!("Config load error: {}", e)))?;
        self.apply(&config)
    }

    pub fn apply(&self, config: &Config) -> Result<usize, DomainError> {
        let table = MappingTable::from_config(config)
            .map_err(|e| DomainError::ConfigError(format!("Config validation error: {}", e)))?;
        let count = table.len();

        self.matcher.replace(table);
        if let Some(cache) = &self.cache {
            cache.clear();
        }

        info!(special_domains = count, "Special domains reloaded");
        Ok(count)
    }
}
