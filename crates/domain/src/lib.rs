//! mDNS relay domain layer
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod domain_mapping;
pub mod errors;
pub mod resolution;

pub use config::{
    CliOverrides, Config, ConfigError, LoggingConfig, MdnsConfig, ServerConfig, SpecialDomainConfig,
    UpstreamConfig,
};
pub use dns_query::{DnsQuery, CLASS_IN};
pub use dns_record::RecordType;
pub use domain_mapping::{build_mappings, normalize_name, validate_name, DomainMapping, MappingTarget};
pub use errors::DomainError;
pub use resolution::{ResolutionResult, ResolvedAddress};
