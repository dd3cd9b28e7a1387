#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_repositories;

pub use mock_repositories::{MockMdnsResolver, MockResolutionCache, MockUpstreamForwarder};
