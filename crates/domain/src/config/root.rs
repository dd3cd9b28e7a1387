use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::mdns::MdnsConfig;
use super::server::ServerConfig;
use super::special_domains::SpecialDomainConfig;
use super::upstream::UpstreamConfig;
use crate::domain_mapping::{build_mappings, DomainMapping};

const LOCAL_CONFIG_PATH: &str = "mdns-relay.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/mdns-relay/config.toml";

/// Main configuration structure for the relay
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listening socket
    #[serde(default)]
    pub server: ServerConfig,

    /// Resolver that receives every non-special query
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Multicast DNS client settings
    #[serde(default)]
    pub mdns: MdnsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Root domain → target and subdomain overrides
    #[serde(default)]
    pub special_domains: BTreeMap<String, SpecialDomainConfig>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. mdns-relay.toml in current directory
    /// 3. /etc/mdns-relay/config.toml
    /// 4. Default configuration (no special domains)
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path.map(str::to_string).or_else(Self::get_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.server = upstream;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration, including the special-domain table
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        if self.server
            .listen_address()
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "invalid bind address '{}'",
                self.server.bind_address
            )));
        }
        if self.server.max_concurrent_queries == 0 {
            return Err(ConfigError::Validation(
                "max_concurrent_queries must be at least 1".to_string(),
            ));
        }

        self.upstream.server_addr().map_err(ConfigError::Validation)?;
        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Upstream timeout cannot be 0".to_string(),
            ));
        }

        self.mdns.group_addr().map_err(ConfigError::Validation)?;
        if self.mdns.timeout_ms == 0 {
            return Err(ConfigError::Validation("mDNS timeout cannot be 0".to_string()));
        }
        if self.mdns.min_ttl > self.mdns.max_ttl {
            return Err(ConfigError::Validation(format!(
                "mDNS min_ttl ({}) is greater than max_ttl ({})",
                self.mdns.min_ttl, self.mdns.max_ttl
            )));
        }

        self.mappings().map(|_| ())
    }

    /// Build the validated special-domain mappings
    pub fn mappings(&self) -> Result<Vec<DomainMapping>, ConfigError> {
        build_mappings(&self.special_domains)
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|path| std::path::Path::new(path).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
    pub log_level: Option<String>,
}
