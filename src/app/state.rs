use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{timeout, Instant};

use crate::app::tab::{SessionTab, TabId};
use crate::app::types::{App, ClosingTab, Focus};
use crate::app_event::TransportEvent;
use crate::config::AppConfig;
use crate::models::ConnectionConfig;
use crate::session::transport::BackendCommand;

/// How long a clean disconnect may take before the backend is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

impl App {
    pub fn new(
        connection: ConnectionConfig,
        app_config: &AppConfig,
        local_dir: PathBuf,
        transport_tx: UnboundedSender<(TabId, TransportEvent)>,
    ) -> Result<Self> {
        let handshake_timeout = app_config.handshake_timeout();
        let first = SessionTab::new(
            TabId(0),
            connection.clone(),
            handshake_timeout,
            local_dir.clone(),
        )?;

        Ok(Self {
            should_quit: false,
            focus: Focus::Terminal,
            status_message: None,
            tabs: vec![first],
            active_tab: 0,
            closing: Vec::new(),
            next_tab_id: 1,
            new_session: None,
            backend: BackendCommand::new(&app_config.backend_path),
            handshake_timeout,
            template: connection,
            local_dir,
            transport_tx,
        })
    }

    pub fn active(&self) -> &SessionTab {
        &self.tabs[self.active_tab]
    }

    pub fn active_mut(&mut self) -> &mut SessionTab {
        &mut self.tabs[self.active_tab]
    }

    /// Launch the backend of the active session.
    pub fn start(&mut self) {
        let tab = &mut self.tabs[self.active_tab];
        tab.start(&self.backend, self.transport_tx.clone());
    }

    /// Open another session in a new tab and switch to it.
    pub fn open_session(&mut self, destination: &str) -> Result<()> {
        let connection = self.template.for_destination(destination)?;
        let id = TabId(self.next_tab_id);
        self.next_tab_id += 1;

        let mut tab = SessionTab::new(
            id,
            connection,
            self.handshake_timeout,
            self.local_dir.clone(),
        )?;
        tracing::info!("Opening session {:?} to {}", id, tab.title());
        tab.start(&self.backend, self.transport_tx.clone());

        self.tabs.push(tab);
        self.active_tab = self.tabs.len() - 1;
        self.focus = Focus::Terminal;
        Ok(())
    }

    /// Disconnect the active session and drop its tab. Closing the last tab
    /// quits.
    pub fn close_active_tab(&mut self) {
        if self.tabs.len() == 1 {
            self.should_quit = true;
            return;
        }

        let mut tab = self.tabs.remove(self.active_tab);
        tracing::info!("Closing session {:?} to {}", tab.id, tab.title());
        tab.controller.disconnect();
        self.set_status_message(format!("Closed session {}", tab.title()));
        self.closing.push(ClosingTab {
            tab,
            deadline: Instant::now() + SHUTDOWN_GRACE,
        });

        self.active_tab = self.active_tab.min(self.tabs.len() - 1);
    }

    pub fn next_tab(&mut self) {
        self.active_tab = (self.active_tab + 1) % self.tabs.len();
    }

    pub fn previous_tab(&mut self) {
        self.active_tab = (self.active_tab + self.tabs.len() - 1) % self.tabs.len();
    }

    pub fn on_transport_event(&mut self, id: TabId, event: TransportEvent) {
        let tab = self
            .tabs
            .iter_mut()
            .chain(self.closing.iter_mut().map(|c| &mut c.tab))
            .find(|tab| tab.id == id);
        match tab {
            Some(tab) => tab.on_transport_event(event),
            None => tracing::debug!("Dropping {:?} for closed session {:?}", event, id),
        }
    }

    /// Earliest handshake deadline among open sessions.
    pub fn next_handshake_deadline(&self) -> Option<Instant> {
        self.tabs
            .iter()
            .filter_map(|tab| tab.controller.handshake_deadline())
            .min()
    }

    pub fn on_handshake_deadline(&mut self) {
        let now = Instant::now();
        for tab in &mut self.tabs {
            tab.controller.on_handshake_timeout(now);
        }
    }

    /// Pump every session. Closing sessions are dropped once their backend
    /// exits and killed when their grace period runs out.
    pub async fn pump(&mut self) {
        let mut notices = Vec::new();
        for tab in &mut self.tabs {
            notices.extend(tab.pump().await);
        }
        if let Some(notice) = notices.pop() {
            self.set_status_message(notice);
        }

        let now = Instant::now();
        for closing in &mut self.closing {
            closing.tab.pump().await;
            if closing.tab.is_live() && now >= closing.deadline {
                tracing::warn!(
                    "Backend of {} did not exit within {:?}",
                    closing.tab.title(),
                    SHUTDOWN_GRACE
                );
                closing.tab.terminate();
            }
        }
        self.closing
            .retain(|closing| closing.tab.is_live() && now < closing.deadline);
    }

    fn has_live_backends(&self) -> bool {
        self.tabs.iter().any(SessionTab::is_live)
            || self.closing.iter().any(|closing| closing.tab.is_live())
    }

    /// Close every session on quit: ask each backend to disconnect and give
    /// them a moment before killing the rest.
    pub async fn shutdown(&mut self, transport_rx: &mut UnboundedReceiver<(TabId, TransportEvent)>) {
        if !self.has_live_backends() {
            return;
        }

        for tab in &mut self.tabs {
            tab.controller.disconnect();
        }
        self.pump().await;

        let waited = timeout(SHUTDOWN_GRACE, async {
            while self.has_live_backends() {
                let Some((id, event)) = transport_rx.recv().await else {
                    break;
                };
                self.on_transport_event(id, event);
                self.pump().await;
            }
        })
        .await;

        if waited.is_err() {
            tracing::warn!("Backends did not exit within {:?}", SHUTDOWN_GRACE);
            for tab in &mut self.tabs {
                tab.terminate();
            }
            for closing in &mut self.closing {
                closing.tab.terminate();
            }
        }
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), std::time::Instant::now()));
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn is_connecting(&self) -> bool {
        self.active().is_connecting()
    }
}
