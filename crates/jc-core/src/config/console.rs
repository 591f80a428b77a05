//! Console connection configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Connection and login settings for the jCli console
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Console host
    pub host: String,

    /// Console telnet port
    pub port: u16,

    /// Login name
    pub username: String,

    /// Login password
    pub password: String,

    /// How long to wait for any expected prompt
    #[serde(rename = "timeout_secs", with = "duration_secs")]
    pub timeout: Duration,

    /// Extra connection attempts after the first one fails
    pub connect_retries: u32,

    /// Treat responses that match no known phrasing as errors
    pub strict_responses: bool,

    /// Backoff between connection attempts
    pub backoff: BackoffConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8990,
            username: "jcliadmin".to_string(),
            password: "jclipwd".to_string(),
            timeout: Duration::from_secs(10),
            connect_retries: 0,
            strict_responses: true,
            backoff: BackoffConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Get the console address (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConsoleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("connect_retries", &self.connect_retries)
            .field("backoff", &self.backoff)
            .field("strict_responses", &self.strict_responses)
            .finish()
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(with = "duration_secs")]
    pub initial: Duration,

    /// Maximum delay
    #[serde(with = "duration_secs")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}
