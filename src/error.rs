use std::net::Ipv4Addr;

use thiserror::Error;

/// Failure to turn a single descriptor into a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Invalid address range syntax: '{0}'")]
    MalformedDescriptor(String),
    #[error("Invalid IP address '{address}' in '{token}'")]
    InvalidAddress { address: String, token: String },
    #[error("Invalid prefix length '{prefix}' in '{token}', expected 0-32")]
    InvalidPrefixLength { prefix: String, token: String },
    #[error("Invalid mask: {0}")]
    InvalidMask(Ipv4Addr),
}
