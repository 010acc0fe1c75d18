use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;

use crate::app::tab::{SessionTab, TabId};
use crate::app_event::TransportEvent;
use crate::models::ConnectionConfig;
use crate::session::transport::BackendCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Terminal,
    Local,
    Remote,
}

/// A closed tab whose backend was asked to disconnect. It is killed when
/// `deadline` passes first.
pub struct ClosingTab {
    pub tab: SessionTab,
    pub deadline: tokio::time::Instant,
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,

    pub status_message: Option<(String, Instant)>,

    // Sessions; never empty
    pub tabs: Vec<SessionTab>,
    pub active_tab: usize,
    pub closing: Vec<ClosingTab>,
    pub next_tab_id: u64,

    /// `user@host[:port]` being typed for a new session.
    pub new_session: Option<String>,

    // Shared by every session
    pub backend: BackendCommand,
    pub handshake_timeout: Duration,
    pub template: ConnectionConfig,
    pub local_dir: PathBuf,
    pub transport_tx: UnboundedSender<(TabId, TransportEvent)>,
}
