mod mdns_resolver;
mod resolution_cache_port;
mod upstream_forwarder;

pub use mdns_resolver::MdnsResolver;
pub use resolution_cache_port::ResolutionCachePort;
pub use upstream_forwarder::UpstreamForwarder;
