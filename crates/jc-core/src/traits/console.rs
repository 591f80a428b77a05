//! Console traits
//!
//! The automation logic only needs two capabilities from a transport:
//! write a line, and wait until one of several markers shows up. Keeping
//! that boundary behind a trait lets the prompt-driven state machine run
//! against a real telnet socket or a scripted console in tests.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{ConnectionError, ConsoleError};
use jc_protocol::ExpectMatch;

/// A line-oriented text console
#[async_trait]
pub trait TextConsole: Send {
    /// Send one line of input
    async fn send_line(&mut self, line: &str) -> Result<(), ConsoleError>;

    /// Wait until any of `markers` appears.
    ///
    /// Returns which marker matched and the text received before it.
    /// Fails with `ConsoleError::Timeout` when nothing matches within
    /// `timeout`, or `ConsoleError::Eof` when the stream ends first.
    async fn expect_any(
        &mut self,
        markers: &[&str],
        timeout: Duration,
    ) -> Result<ExpectMatch, ConsoleError>;

    /// Close the underlying transport
    async fn close(&mut self) -> Result<(), ConsoleError>;
}

/// Opens fresh console transports
#[async_trait]
pub trait ConsoleConnector: Send + Sync {
    /// The console type produced by this connector
    type Console: TextConsole;

    /// Open a new transport (login is not performed here)
    async fn open(&self) -> Result<Self::Console, ConnectionError>;

    /// Human-readable target, for logs
    fn target(&self) -> String;
}
