//! Ownership of the backend child process.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};

use crate::app_event::TransportEvent;
use crate::error::{Result, SessionError};
use crate::session::protocol::{self, Request};

/// How to launch the backend.
#[derive(Debug, Clone)]
pub struct BackendCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl BackendCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

/// Write half of a running backend. Output arrives as [`TransportEvent`]s on
/// the channel given to [`Transport::spawn`].
#[derive(Debug)]
pub struct Transport {
    stdin: Option<ChildStdin>,
    kill_tx: Option<oneshot::Sender<()>>,
    pid: Option<u32>,
}

impl Transport {
    pub fn spawn(
        command: &BackendCommand,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Self> {
        let program = &command.program;

        // Bare names are looked up on PATH by the OS
        if program.components().count() > 1 && !program.exists() {
            return Err(SessionError::BackendUnavailable(format!(
                "SSH backend not found at {}",
                program.display()
            )));
        }

        let mut child = Command::new(program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SessionError::BackendUnavailable(format!(
                    "failed to start {}: {}",
                    program.display(),
                    e
                ))
            })?;

        let pid = child.id();
        tracing::info!("Spawned backend {} (pid={:?})", program.display(), pid);

        let stdin = child.stdin.take();

        let stdout_task = child.stdout.take().map(|stdout| {
            let tx = events.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send(TransportEvent::Line(line)).is_err() {
                        break;
                    }
                }
            })
        });

        let stderr_task = child.stderr.take().map(|stderr| {
            let tx = events.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!("Backend stderr: {}", line);
                    if tx.send(TransportEvent::Stderr(line)).is_err() {
                        break;
                    }
                }
            })
        });

        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                // Fires on an explicit terminate and when the transport is dropped
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!("Failed to kill backend: {}", e);
                    }
                    child.wait().await
                }
            };

            // Deliver everything the backend wrote before reporting the exit
            if let Some(task) = stdout_task {
                let _ = task.await;
            }
            if let Some(task) = stderr_task {
                let _ = task.await;
            }

            let code = match status {
                Ok(status) => {
                    tracing::info!("Backend exited with {}", status);
                    status.code()
                }
                Err(e) => {
                    tracing::error!("Failed to wait for backend: {}", e);
                    None
                }
            };
            let _ = events.send(TransportEvent::Exited(code));
        });

        Ok(Self {
            stdin,
            kill_tx: Some(kill_tx),
            pid,
        })
    }

    /// Write one request line.
    pub async fn send(&mut self, request: &Request) -> Result<()> {
        let line = protocol::encode(request)?;
        let stdin = self.stdin.as_mut().ok_or(SessionError::InputClosed)?;

        tracing::debug!("Sending {} request to backend", request.kind());
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Close the backend's stdin so its read loop ends.
    pub fn close_input(&mut self) {
        if self.stdin.take().is_some() {
            tracing::info!("Closed backend input");
        }
    }

    /// Kill the backend. The exit is still reported as an event.
    pub fn terminate(&mut self) {
        self.stdin = None;
        if let Some(kill_tx) = self.kill_tx.take() {
            tracing::info!("Terminating backend (pid={:?})", self.pid);
            let _ = kill_tx.send(());
        }
    }
}
