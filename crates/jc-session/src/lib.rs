//! jc-session: jCli console session, transport and entity operations
//!
//! - [`ConsoleSession`] logs in and runs simple and interactive commands
//! - [`Gateway`] builds user, group and customer operations on top of it
//! - [`CommandWorker`] serializes requests through one background task
//! - [`transport`] provides the telnet-over-TCP console

pub mod gateway;
pub mod session;
pub mod transport;
pub mod worker;

pub use gateway::{Confirmation, Gateway, GatewayRequest, UserDetail};
pub use session::ConsoleSession;
pub use transport::{TcpConnector, TelnetConsole};
pub use worker::{CommandWorker, WorkerHandle};

use jc_core::config::ConfigFile;

/// Build a TCP-backed gateway from a loaded configuration
pub fn tcp_gateway(config: &ConfigFile) -> Gateway<TcpConnector> {
    let connector = TcpConnector::from_config(&config.console);
    let session = ConsoleSession::new(connector, config.console.clone());
    Gateway::new(session, config.customer.clone())
}
