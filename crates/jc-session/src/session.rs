//! The console session
//!
//! `ConsoleSession` owns one logged-in console and exposes the two command
//! primitives everything else is built from: a simple command answered by a
//! prompt, and an interactive form filled in one line at a time.
//!
//! ```text
//! send command ──▶ AwaitingCommandEcho ──"> "──▶ AwaitingSubPrompt (×N)
//!                                                      │
//!                                              send last step
//!                                                      ▼
//!                                             AwaitingFinalPrompt
//!                                          "jcli : "│        │"> "
//!                                                   ▼        ▼
//!                                              classify   classify, send "ko"
//! ```
//!
//! A timeout or end of stream in any state is terminal for the command and
//! drops the connection; the next command logs in again.

use std::time::Duration;

use jc_core::config::ConsoleConfig;
use jc_core::error::{CommandError, ConnectionError, ConsoleError, JcError};
use jc_core::traits::{ConsoleConnector, TextConsole};
use jc_protocol::prompt::{
    COMMAND_PROMPTS, FORM_ABORT, INTERACTIVE_PROMPT, LOGIN_PROMPT, PASSWORD_PROMPT,
    QUIT_COMMAND, STANDARD_PROMPT,
};
use jc_protocol::{classify, Outcome};

use crate::transport::ExponentialBackoff;

/// Index of the interactive prompt in `COMMAND_PROMPTS`
const SUB_PROMPT_INDEX: usize = 1;

/// A lazily connected, reusable console session
pub struct ConsoleSession<C: ConsoleConnector> {
    /// Opens transports
    connector: C,
    /// Login and timing settings
    config: ConsoleConfig,
    /// The logged-in console, present only after a full login
    console: Option<C::Console>,
}

impl<C: ConsoleConnector> ConsoleSession<C> {
    /// Create a session; nothing is opened until the first command
    pub fn new(connector: C, config: ConsoleConfig) -> Self {
        Self {
            connector,
            config,
            console: None,
        }
    }

    /// Whether the session is logged in
    pub fn is_connected(&self) -> bool {
        self.console.is_some()
    }

    /// Session configuration
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Open the transport and log in.
    ///
    /// Retries up to `connect_retries` times with exponential backoff.
    /// Does nothing when already connected.
    pub async fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.console.is_some() {
            return Ok(());
        }

        let mut backoff = ExponentialBackoff::from_config(&self.config.backoff);
        let mut attempt: u32 = 0;

        loop {
            match open_and_login(&self.connector, &self.config).await {
                Ok(console) => {
                    tracing::info!("Logged in to jCli at {}", self.connector.target());
                    self.console = Some(console);
                    return Ok(());
                }
                Err(e) if attempt < self.config.connect_retries => {
                    attempt += 1;
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        "Connection attempt {} to {} failed: {}. Retrying in {:?}",
                        attempt,
                        self.connector.target(),
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn ensure_connected(&mut self) -> Result<&mut C::Console, JcError> {
        if self.console.is_none() {
            self.connect().await?;
        }
        self.console
            .as_mut()
            .ok_or_else(|| ConnectionError::NotConnected.into())
    }

    /// Run a command answered by a single prompt.
    ///
    /// Returns the text printed before the prompt, trimmed, without the
    /// echoed command line.
    pub async fn execute_simple(&mut self, command: &str) -> Result<String, JcError> {
        let timeout = self.config.timeout;
        let console = self.ensure_connected().await?;

        let result = simple_exchange(console, command, timeout).await;
        match result {
            Ok(text) => Ok(text),
            Err(e) => {
                self.drop_connection(&e).await;
                Err(e.into())
            }
        }
    }

    /// Run an interactive form: `command`, then each step, the last being
    /// the terminator (normally `ok`).
    pub async fn execute_interactive(
        &mut self,
        command: &str,
        steps: &[String],
    ) -> Result<Outcome, JcError> {
        if steps.is_empty() {
            return Err(CommandError::InvalidArgument(format!(
                "Interactive command '{}' needs at least one step",
                command
            ))
            .into());
        }

        let timeout = self.config.timeout;
        let console = self.ensure_connected().await?;

        let result = form_exchange(console, command, steps, timeout).await;
        match result {
            Ok(FormReply {
                outcome,
                abort_error: None,
            }) => Ok(outcome),
            Ok(FormReply {
                outcome,
                abort_error: Some(e),
            }) => {
                tracing::warn!("Could not leave the open form cleanly: {}", e);
                self.drop_connection(&e).await;
                Ok(outcome)
            }
            Err(e) => {
                self.drop_connection(&e).await;
                Err(e.into())
            }
        }
    }

    /// Send `quit` and close the transport.
    ///
    /// Never fails and is safe to call repeatedly.
    pub async fn disconnect(&mut self) {
        let Some(mut console) = self.console.take() else {
            return;
        };

        if let Err(e) = console.send_line(QUIT_COMMAND).await {
            tracing::debug!("Failed to send quit: {}", e);
        }
        if let Err(e) = console.close().await {
            tracing::debug!("Failed to close console: {}", e);
        }

        tracing::info!("Disconnected from {}", self.connector.target());
    }

    async fn drop_connection(&mut self, cause: &ConsoleError) {
        tracing::warn!("Dropping console connection: {}", cause);
        if let Some(mut console) = self.console.take() {
            if let Err(e) = console.close().await {
                tracing::debug!("Failed to close console: {}", e);
            }
        }
    }
}

/// Result of a completed form
struct FormReply {
    outcome: Outcome,
    /// Set when the form stayed open and abandoning it failed
    abort_error: Option<ConsoleError>,
}

async fn open_and_login<C: ConsoleConnector>(
    connector: &C,
    config: &ConsoleConfig,
) -> Result<C::Console, ConnectionError> {
    let mut console = connector.open().await?;

    match login(&mut console, config).await {
        Ok(()) => Ok(console),
        Err(e) => {
            if let Err(close_err) = console.close().await {
                tracing::debug!("Failed to close console after login failure: {}", close_err);
            }
            Err(e)
        }
    }
}

async fn login<T: TextConsole>(
    console: &mut T,
    config: &ConsoleConfig,
) -> Result<(), ConnectionError> {
    let timeout = config.timeout;
    let failed = |e: ConsoleError| ConnectionError::LoginFailed(e.to_string());

    console
        .expect_any(&[LOGIN_PROMPT], timeout)
        .await
        .map_err(failed)?;
    tracing::debug!(username = %config.username, "Sending username");
    console.send_line(&config.username).await.map_err(failed)?;

    console
        .expect_any(&[PASSWORD_PROMPT], timeout)
        .await
        .map_err(failed)?;
    tracing::debug!("Sending password");
    console.send_line(&config.password).await.map_err(failed)?;

    let ready = console
        .expect_any(&[STANDARD_PROMPT, LOGIN_PROMPT], timeout)
        .await
        .map_err(failed)?;
    if ready.index == 1 {
        return Err(ConnectionError::LoginFailed(format!(
            "credentials for '{}' were rejected",
            config.username
        )));
    }

    Ok(())
}

async fn simple_exchange<T: TextConsole>(
    console: &mut T,
    command: &str,
    timeout: Duration,
) -> Result<String, ConsoleError> {
    tracing::debug!(command = %loggable(command), "Sending command");
    console.send_line(command).await?;

    let reply = console.expect_any(&COMMAND_PROMPTS, timeout).await?;
    let text = strip_echo(&reply.before, command);
    tracing::trace!(response = %text, "Command answered");
    Ok(text)
}

async fn form_exchange<T: TextConsole>(
    console: &mut T,
    command: &str,
    steps: &[String],
    timeout: Duration,
) -> Result<FormReply, ConsoleError> {
    let Some((last, fields)) = steps.split_last() else {
        return Ok(FormReply {
            outcome: Outcome::Failure {
                message: "No form steps given".to_string(),
            },
            abort_error: None,
        });
    };

    // AwaitingCommandEcho
    tracing::debug!(command = %command, "Opening form");
    console.send_line(command).await?;
    let opened = console.expect_any(&COMMAND_PROMPTS, timeout).await?;
    if opened.index != SUB_PROMPT_INDEX {
        // Back at the standard prompt: the console refused to open the form
        let text = strip_echo(&opened.before, command);
        tracing::debug!(response = %text, "Form was not opened");
        return Ok(FormReply {
            outcome: not_accepted(classify(&text), command),
            abort_error: None,
        });
    }

    // AwaitingSubPrompt
    for field in fields {
        tracing::debug!(step = %loggable(field), "Sending form step");
        console.send_line(field).await?;
        console.expect_any(&[INTERACTIVE_PROMPT], timeout).await?;
    }

    // AwaitingFinalPrompt
    tracing::debug!(step = %loggable(last), "Submitting form");
    console.send_line(last).await?;
    let reply = console.expect_any(&COMMAND_PROMPTS, timeout).await?;
    let text = strip_echo(&reply.before, last);
    let outcome = classify(&text);

    if reply.index != SUB_PROMPT_INDEX {
        tracing::debug!(%outcome, "Form closed");
        return Ok(FormReply {
            outcome,
            abort_error: None,
        });
    }

    // The console kept the form open, so nothing was saved
    tracing::debug!(%outcome, "Form still open, abandoning it");
    let outcome = not_accepted(outcome, command);

    let abort_error = match abandon_form(console, timeout).await {
        Ok(()) => None,
        Err(e) => Some(e),
    };

    Ok(FormReply {
        outcome,
        abort_error,
    })
}

async fn abandon_form<T: TextConsole>(console: &mut T, timeout: Duration) -> Result<(), ConsoleError> {
    console.send_line(FORM_ABORT).await?;
    console.expect_any(&[STANDARD_PROMPT], timeout).await?;
    Ok(())
}

/// A form that was never saved is a failure whatever the console printed
fn not_accepted(outcome: Outcome, command: &str) -> Outcome {
    match outcome {
        Outcome::Failure { message } => Outcome::Failure { message },
        other if other.text().is_empty() => Outcome::Failure {
            message: format!("'{}' was not accepted", command),
        },
        other => Outcome::Failure {
            message: other.text().to_string(),
        },
    }
}

/// Drop the console's echo of `sent` from the start of `text` and trim
fn strip_echo(text: &str, sent: &str) -> String {
    let trimmed = text.trim_start();
    let rest = match trimmed.split_once('\n') {
        Some((first, rest)) if first.trim() == sent.trim() => rest,
        None if trimmed.trim() == sent.trim() => "",
        _ => trimmed,
    };
    rest.trim().to_string()
}

/// Mask password steps before they reach the logs
fn loggable(line: &str) -> &str {
    match line.split_once(' ') {
        Some(("password", _)) => "password ********",
        _ => line,
    }
}
