use super::wire_query::decode_query;
use super::wire_response::encode_response;
use mdns_relay_application::use_cases::{HandleDnsQueryUseCase, QueryOutcome};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Turns one inbound datagram into at most one outbound datagram.
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>) -> Self {
        Self { use_case }
    }

    /// Returns the bytes to send back to `client`, or `None` to drop.
    pub async fn handle_datagram(&self, datagram: &[u8], client: SocketAddr) -> Option<Vec<u8>> {
        let wire = match decode_query(datagram, client) {
            Ok(wire) => wire,
            Err(e) => {
                debug!(client = %client, len = datagram.len(), error = %e, "Dropping malformed datagram");
                return None;
            }
        };

        debug!(
            client = %client,
            id = wire.id(),
            domain = %wire.query.name,
            record_type = %wire.query.record_type,
            "Query received"
        );

        match self.use_case.execute(&wire.query, datagram).await {
            Ok(QueryOutcome::Answered(result)) => Some(encode_response(&wire, &result)),
            Ok(QueryOutcome::Relayed(bytes)) => Some(bytes),
            Err(_) => None,
        }
    }
}
