//! Telnet console over TCP
//!
//! Wraps a `TcpStream` in the telnet codec, answers option negotiation
//! and feeds console text into an expect buffer.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::codec::Framed;

use jc_core::config::ConsoleConfig;
use jc_core::error::{ConnectionError, ConsoleError};
use jc_core::traits::{ConsoleConnector, TextConsole};
use jc_protocol::{
    negotiation_reply, ExpectBuffer, ExpectMatch, TelnetCodec, TelnetEvent, TelnetOutput,
};

/// A live telnet connection to the console
pub struct TelnetConsole {
    /// Framed socket
    framed: Framed<TcpStream, TelnetCodec>,
    /// Text received but not yet matched
    buffer: ExpectBuffer,
    /// Remote address, for logs
    peer: String,
}

impl TelnetConsole {
    /// Wrap an already connected stream
    pub fn new(stream: TcpStream, peer: impl Into<String>) -> Self {
        Self {
            framed: Framed::new(stream, TelnetCodec::new()),
            buffer: ExpectBuffer::new(),
            peer: peer.into(),
        }
    }

    async fn handle_event(&mut self, event: TelnetEvent) -> Result<(), ConsoleError> {
        match event {
            TelnetEvent::Data(bytes) => {
                self.buffer.push_bytes(&bytes);
            }
            TelnetEvent::Negotiate { command, option } => {
                if let Some((reply, option)) = negotiation_reply(command, option) {
                    tracing::trace!(?command, ?reply, option, "Answering telnet negotiation");
                    self.framed
                        .send(TelnetOutput::Negotiate {
                            command: reply,
                            option,
                        })
                        .await?;
                }
            }
            TelnetEvent::Subnegotiation { option, data } => {
                tracing::trace!(option, len = data.len(), "Ignoring telnet subnegotiation");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TextConsole for TelnetConsole {
    async fn send_line(&mut self, line: &str) -> Result<(), ConsoleError> {
        self.framed.send(TelnetOutput::line(line)).await?;
        Ok(())
    }

    async fn expect_any(
        &mut self,
        markers: &[&str],
        timeout: Duration,
    ) -> Result<ExpectMatch, ConsoleError> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(found) = self.buffer.take_match(markers) {
                return Ok(found);
            }

            let next = match tokio::time::timeout_at(deadline, self.framed.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::debug!(
                        peer = %self.peer,
                        pending = %self.buffer.pending(),
                        "Expected prompt did not appear"
                    );
                    return Err(ConsoleError::Timeout {
                        expected: markers.iter().map(|m| m.to_string()).collect(),
                        waited: timeout,
                    });
                }
            };

            match next {
                Some(Ok(event)) => self.handle_event(event).await?,
                Some(Err(e)) => return Err(e.into()),
                None => {
                    tracing::debug!(
                        peer = %self.peer,
                        unread = %self.buffer.take_all(),
                        "Console closed the stream"
                    );
                    return Err(ConsoleError::Eof);
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), ConsoleError> {
        self.framed.get_mut().shutdown().await?;
        Ok(())
    }
}

/// Opens telnet connections to a fixed address
#[derive(Debug, Clone)]
pub struct TcpConnector {
    /// Console address (host:port)
    address: String,
    /// Time allowed for the TCP handshake
    connect_timeout: Duration,
}

impl TcpConnector {
    /// Create a connector for `address`
    pub fn new(address: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            address: address.into(),
            connect_timeout,
        }
    }

    /// Create a connector from the console configuration
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(config.address(), config.timeout)
    }
}

#[async_trait]
impl ConsoleConnector for TcpConnector {
    type Console = TelnetConsole;

    async fn open(&self) -> Result<TelnetConsole, ConnectionError> {
        tracing::debug!("Connecting to jCli at {}", self.address);

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| {
                ConnectionError::Refused(format!(
                    "{}: timed out after {:?}",
                    self.address, self.connect_timeout
                ))
            })?
            .map_err(|e| ConnectionError::Refused(format!("{}: {}", self.address, e)))?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY: {}", e);
        }

        Ok(TelnetConsole::new(stream, self.address.clone()))
    }

    fn target(&self) -> String {
        self.address.clone()
    }
}
