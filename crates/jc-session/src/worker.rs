//! Background command worker
//!
//! The console cannot interleave commands, so one task owns the gateway and
//! drains a bounded queue one request at a time. Callers wait on a oneshot
//! for their own reply.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use jc_core::error::{CommandError, JcError};
use jc_core::traits::ConsoleConnector;

use crate::gateway::{Gateway, GatewayRequest};

/// A queued request and where to send its result
struct Job {
    request: GatewayRequest,
    reply: oneshot::Sender<Result<Value, JcError>>,
}

/// Spawns the worker task
pub struct CommandWorker;

impl CommandWorker {
    /// Start a worker owning `gateway` with a queue of `capacity` requests
    pub fn spawn<C>(gateway: Gateway<C>, capacity: usize) -> WorkerHandle
    where
        C: ConsoleConnector + 'static,
        C::Console: 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(gateway, rx, cancel.clone()));

        WorkerHandle { tx, cancel, task }
    }
}

/// Handle for submitting requests to a running worker
pub struct WorkerHandle {
    tx: mpsc::Sender<Job>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Queue `request` and wait for its result
    pub async fn submit(&self, request: GatewayRequest) -> Result<Value, JcError> {
        if self.cancel.is_cancelled() {
            return Err(CommandError::WorkerStopped.into());
        }

        let (reply, response) = oneshot::channel();
        self.tx
            .send(Job { request, reply })
            .await
            .map_err(|_| CommandError::WorkerStopped)?;

        match response.await {
            Ok(result) => result,
            Err(_) => Err(CommandError::WorkerStopped.into()),
        }
    }

    /// Whether the worker still accepts requests
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }

    /// Stop the worker and wait for it to disconnect.
    ///
    /// A request already executing runs to completion; queued ones are
    /// answered with `WorkerStopped`.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        drop(self.tx);

        if let Err(e) = self.task.await {
            tracing::error!("Command worker task failed: {}", e);
        }
    }
}

async fn run<C: ConsoleConnector>(
    mut gateway: Gateway<C>,
    mut rx: mpsc::Receiver<Job>,
    cancel: CancellationToken,
) {
    tracing::debug!("Command worker started");

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!("Command worker shutting down");
                break;
            }

            job = rx.recv() => {
                let Some(job) = job else {
                    break;
                };

                let command = job.request.name();
                let result = gateway.dispatch(job.request).await;
                if let Err(e) = &result {
                    tracing::debug!("{} failed: {}", command, e);
                }
                if job.reply.send(result).is_err() {
                    tracing::debug!("Caller of {} stopped waiting", command);
                }
            }
        }
    }

    // Queued jobs are dropped here, which fails their callers' oneshots
    rx.close();
    gateway.disconnect().await;

    tracing::info!("Command worker stopped");
}
