//! Gateway command execution

use std::collections::BTreeMap;
use std::time::Duration;

use clap::Args;
use serde_json::Value;

use jc_core::config::{ConfigFile, ConsoleConfig};
use jc_session::gateway::failure;
use jc_session::{tcp_gateway, CommandWorker, GatewayRequest};

/// Console connection settings given on the command line or environment
#[derive(Args, Debug, Clone, Default)]
pub struct ConsoleOverrides {
    /// Console host (overrides config)
    #[arg(long = "host", global = true, env = "JCLI_HOST")]
    pub host: Option<String>,

    /// Console telnet port (overrides config)
    #[arg(long = "port", global = true, env = "JCLI_PORT")]
    pub port: Option<u16>,

    /// Console login name (overrides config)
    #[arg(
        long = "username",
        global = true,
        env = "JCLI_USERNAME",
        value_name = "NAME"
    )]
    pub console_username: Option<String>,

    /// Console login password (overrides config)
    #[arg(
        long = "password",
        global = true,
        env = "JCLI_PASSWORD",
        value_name = "PASSWORD",
        hide_env_values = true
    )]
    pub console_password: Option<String>,

    /// Prompt timeout in seconds (overrides config)
    #[arg(long = "timeout", global = true, env = "JCLI_TIMEOUT", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl ConsoleOverrides {
    /// Write every given override into `console`
    pub fn apply(&self, console: &mut ConsoleConfig) {
        if let Some(host) = &self.host {
            console.host = host.clone();
        }
        if let Some(port) = self.port {
            console.port = port;
        }
        if let Some(username) = &self.console_username {
            console.username = username.clone();
        }
        if let Some(password) = &self.console_password {
            console.password = password.clone();
        }
        if let Some(secs) = self.timeout_secs {
            console.timeout = Duration::from_secs(secs);
        }
    }
}

/// Collect `key=value` arguments into a map.
///
/// Arguments without `=` or with an empty key are skipped.
pub fn parse_assignments(args: &[String]) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();

    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => tracing::warn!("Ignoring argument '{}': expected key=value", arg),
        }
    }

    pairs
}

/// Run one request through a fresh worker and return its JSON reply.
///
/// Errors become `{"success": false, "error": ...}`. The console session
/// is closed before this returns.
pub async fn run_request(config: &ConfigFile, request: GatewayRequest) -> Value {
    let name = request.name();
    tracing::debug!(
        command = name,
        console = %config.console.address(),
        "Running command"
    );

    let worker = CommandWorker::spawn(tcp_gateway(config), config.worker.queue_capacity);
    let result = worker.submit(request).await;
    worker.shutdown().await;

    match result {
        Ok(reply) => reply,
        Err(e) => {
            tracing::info!("{} failed: {}", name, e);
            failure(&e)
        }
    }
}
