//! Console transport
//!
//! Telnet over TCP plus the backoff used between connection attempts.

mod backoff;
mod telnet;

pub use backoff::ExponentialBackoff;
pub use telnet::{TcpConnector, TelnetConsole};
