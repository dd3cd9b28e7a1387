pub mod config;
pub mod dns;

pub use config::ReloadMappingsUseCase;
pub use dns::{HandleDnsQueryUseCase, QueryOutcome};
