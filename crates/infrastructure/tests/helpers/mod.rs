#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod dns_server_mock;
pub mod mdns_responder_mock;

pub use builders::{edns_query, query_bytes, response_answer_ipv4, HandlerBuilder};
pub use dns_server_mock::MockDnsServer;
pub use mdns_responder_mock::{MdnsBehavior, MockMdnsResponder};
