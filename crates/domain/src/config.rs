pub mod errors;
pub mod logging;
pub mod mdns;
pub mod root;
pub mod server;
pub mod special_domains;
pub mod upstream;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use mdns::MdnsConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use special_domains::SpecialDomainConfig;
pub use upstream::UpstreamConfig;
