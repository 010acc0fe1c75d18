use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crate::app::console::Console;
use crate::app_event::{SessionEvent, TransportEvent};
use crate::models::ConnectionConfig;
use crate::session::history::History;
use crate::session::transport::{BackendCommand, Transport};
use crate::session::{SessionController, SessionPhase, TransportCommand};
use crate::sftp_logic::AppSftpState;

/// Stable identity of a session tab. Transport events carry it so they reach
/// the right session after other tabs were closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u64);

/// A remote entry waiting for a y/n answer before deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub name: String,
    pub is_dir: bool,
}

/// One connection with its own backend process, terminal pane and panels.
pub struct SessionTab {
    pub id: TabId,
    pub console: Console,
    pub history: History,
    pub controller: SessionController,
    pub session_rx: UnboundedReceiver<SessionEvent>,
    pub transport: Option<Transport>,
    pub sftp_state: AppSftpState,
    pub pending_delete: Option<PendingDelete>,
}

impl SessionTab {
    pub fn new(
        id: TabId,
        connection: ConnectionConfig,
        handshake_timeout: Duration,
        local_dir: PathBuf,
    ) -> Result<Self> {
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let controller = SessionController::new(connection, handshake_timeout, session_tx);
        let sftp_state = AppSftpState::new(local_dir).context("Failed to open local directory")?;

        Ok(Self {
            id,
            console: Console::default(),
            history: History::new(),
            controller,
            session_rx,
            transport: None,
            sftp_state,
            pending_delete: None,
        })
    }

    pub fn title(&self) -> String {
        self.controller.config().display_name()
    }

    /// Launch the backend and begin the handshake. Its events are tagged
    /// with this tab's id before they reach `events`.
    pub fn start(&mut self, backend: &BackendCommand, events: UnboundedSender<(TabId, TransportEvent)>) {
        let (transport_tx, mut transport_rx) = mpsc::unbounded_channel();
        match Transport::spawn(backend, transport_tx) {
            Ok(transport) => {
                let id = self.id;
                tokio::spawn(async move {
                    while let Some(event) = transport_rx.recv().await {
                        if events.send((id, event)).is_err() {
                            break;
                        }
                    }
                });
                self.transport = Some(transport);
                self.controller.begin_connect(Instant::now());
            }
            Err(e) => self.controller.backend_unavailable(&e),
        }
    }

    pub fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Line(line) => self.controller.handle_line(&line),
            TransportEvent::Stderr(line) => self.controller.handle_stderr(&line),
            TransportEvent::Exited(code) => {
                self.transport = None;
                self.controller.on_backend_exit(code);
            }
        }
    }

    /// Run the transport work the last step produced, then flush its output
    /// and apply the resulting events. Returns status lines for the app.
    pub async fn pump(&mut self) -> Vec<String> {
        while let Some(command) = self.controller.poll_transport() {
            let Some(transport) = self.transport.as_mut() else {
                tracing::debug!("No backend for {:?}", command);
                continue;
            };
            match command {
                TransportCommand::Send(request) => {
                    if let Err(e) = transport.send(&request).await {
                        self.controller.on_write_failed(&e);
                    }
                }
                TransportCommand::CloseInput => transport.close_input(),
                TransportCommand::Terminate => transport.terminate(),
            }
        }

        self.controller.flush_output();
        let mut notices = Vec::new();
        while let Ok(event) = self.session_rx.try_recv() {
            if let Some(notice) = self.apply_session_event(event) {
                notices.push(notice);
            }
        }
        notices
    }

    fn apply_session_event(&mut self, event: SessionEvent) -> Option<String> {
        match event {
            SessionEvent::Output(block) => self.console.apply(&block),
            SessionEvent::Listing(listing) => self.sftp_state.set_remote_listing(listing),
            SessionEvent::LocalChanged => {
                if let Err(e) = self.sftp_state.refresh_local() {
                    tracing::error!("Failed to refresh local panel: {:#}", e);
                    return Some(format!("Error: {}", e));
                }
            }
            SessionEvent::Phase(phase) => return self.on_phase(phase),
        }
        None
    }

    fn on_phase(&mut self, phase: SessionPhase) -> Option<String> {
        if phase.is_terminal() {
            self.pending_delete = None;
        }

        let target = self.title();
        let message = match phase {
            SessionPhase::Disconnected => return None,
            SessionPhase::Connecting => format!("Connecting to {}...", target),
            SessionPhase::Connected => format!("Authenticated on {}", target),
            SessionPhase::Ready => format!("Connected to {} successfully", target),
            SessionPhase::Closed => format!("SSH session to {} ended", target),
            SessionPhase::Errored => format!("Connection to {} failed", target),
        };
        Some(message)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(
            self.controller.phase(),
            SessionPhase::Connecting | SessionPhase::Connected
        )
    }

    /// Backend still running.
    pub fn is_live(&self) -> bool {
        self.transport.is_some()
    }

    pub fn terminate(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.terminate();
        }
    }
}
