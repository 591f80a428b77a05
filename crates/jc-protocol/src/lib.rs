//! jc-protocol: Telnet framing and prompt matching for the jCli console
//!
//! This crate covers everything between raw bytes on the socket and the
//! text the automation layer reasons about: telnet option negotiation,
//! the literal prompts the console prints, an expect-style match buffer
//! and the classification of free-text command responses.

pub mod classify;
pub mod codec;
pub mod error;
pub mod expect;
pub mod prompt;
pub mod telnet;

pub use classify::{classify, has_error_marker, Outcome};
pub use codec::{TelnetCodec, TelnetEvent, TelnetOutput};
pub use error::ProtocolError;
pub use expect::{ExpectBuffer, ExpectMatch};
pub use telnet::{negotiation_reply, TelnetCommand};
