//! Protocol error types

use thiserror::Error;

/// Errors that can occur while framing the telnet stream
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Subnegotiation block never terminated within the size limit
    #[error("Subnegotiation too large: {size} bytes exceeds maximum of {max} bytes")]
    SubnegotiationTooLarge { size: usize, max: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
