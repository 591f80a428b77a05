//! Core error types for jcli-admin

use jc_protocol::ProtocolError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for the jcli-admin ecosystem
#[derive(Error, Debug)]
pub enum JcError {
    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Console I/O error (timeouts, EOF)
    #[error(transparent)]
    Console(#[from] ConsoleError),

    /// Command error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection-related errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The console refused the TCP connection
    #[error("Connection refused: {0}")]
    Refused(String),

    /// The login handshake did not complete
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// A command was issued without an open session
    #[error("Not connected")]
    NotConnected,
}

/// Errors raised while waiting on the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// None of the expected markers appeared in time
    #[error("Timed out after {waited:?} waiting for {expected:?}")]
    Timeout {
        expected: Vec<String>,
        waited: Duration,
    },

    /// The console closed the stream
    #[error("Console closed the connection unexpectedly")]
    Eof,

    /// Telnet framing failed
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Socket error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported for a command the console received
#[derive(Error, Debug)]
pub enum CommandError {
    /// The console answered with an error marker
    #[error("{0}")]
    Rejected(String),

    /// The console answered with text matching no known phrasing
    #[error("Unrecognized console response: {0}")]
    ProtocolMismatch(String),

    /// The change was applied but `persist` failed
    #[error("Failed to persist configuration: {0}")]
    Persistence(String),

    /// The request could not be turned into console input
    #[error("{0}")]
    InvalidArgument(String),

    /// The background worker is no longer accepting commands
    #[error("Command worker stopped")]
    WorkerStopped,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl JcError {
    /// Whether the error leaves the console session unusable
    pub fn breaks_session(&self) -> bool {
        matches!(
            self,
            JcError::Console(_) | JcError::Protocol(_) | JcError::Io(_)
        )
    }
}
