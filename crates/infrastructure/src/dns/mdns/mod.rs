//! Multicast DNS client (RFC 6762 one-shot queries).
//!
//! Each resolution opens its own ephemeral socket, sends one `A` question to
//! the mDNS group and waits for a matching reply until a deadline. Responders
//! answer one-shot queries by unicast to the source port, echoing the query ID.

mod client;
mod pending;

pub use client::MdnsClient;
pub use pending::PendingMdnsRequest;
