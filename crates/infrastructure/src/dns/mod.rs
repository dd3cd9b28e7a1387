pub mod cache;
pub mod mdns;
pub mod server;
pub mod transport;
pub mod wire_query;
pub mod wire_response;

pub use cache::{CacheKey, ResolutionCache};
pub use mdns::{MdnsClient, PendingMdnsRequest};
pub use server::DnsServerHandler;
pub use transport::udp::UdpTransport;
pub use wire_query::{decode_query, WireQuery};
pub use wire_response::encode_response;
