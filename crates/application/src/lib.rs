//! mDNS relay application layer: ports, matching and query routing
pub mod ports;
pub mod services;
pub mod use_cases;
