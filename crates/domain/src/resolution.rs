use std::net::IpAddr;

/// An address to embed in a synthesized answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: IpAddr,
    pub ttl: u32,
}

impl ResolvedAddress {
    pub fn new(address: IpAddr, ttl: u32) -> Self {
        Self { address, ttl }
    }
}

/// Outcome of resolving a special name, ready to be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionResult {
    /// NOERROR with one address record.
    Answer(ResolvedAddress),
    /// NOERROR with an empty answer section: the name exists, the type does not.
    NoData,
    /// NXDOMAIN: the mDNS target could not be resolved.
    NxDomain,
    /// SERVFAIL: the lookup itself could not be carried out.
    ServerFailure,
}

impl ResolutionResult {
    pub fn response_status(&self) -> &'static str {
        match self {
            Self::Answer(_) => "NOERROR",
            Self::NoData => "NODATA",
            Self::NxDomain => "NXDOMAIN",
            Self::ServerFailure => "SERVFAIL",
        }
    }
}
