use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("mDNS target not found: {0}")]
    MdnsNotFound(String),

    #[error("Host not found: {0}")]
    HostNotFound(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Upstream {server} unreachable: {reason}")]
    UpstreamUnreachable { server: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Failures that end in a negative answer rather than a silent drop.
    pub fn is_negative_answer(&self) -> bool {
        matches!(self, Self::MdnsNotFound(_) | Self::HostNotFound(_) | Self::QueryTimeout)
    }
}
