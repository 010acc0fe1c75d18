/// Lifecycle of one backend session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Backend not started.
    Disconnected,
    /// Backend spawned, waiting for `connected`.
    Connecting,
    /// Handshake done, waiting for the home directory.
    Connected,
    /// Fully operational.
    Ready,
    /// Backend exited normally or on request.
    Closed,
    /// Session failed (startup, handshake or abnormal exit).
    Errored,
}

impl SessionPhase {
    /// Whether requests other than `Connect` may be written.
    pub fn can_send(&self) -> bool {
        matches!(self, SessionPhase::Connected | SessionPhase::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Closed | SessionPhase::Errored)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Disconnected => "Disconnected",
            SessionPhase::Connecting => "Connecting",
            SessionPhase::Connected => "Connected",
            SessionPhase::Ready => "Ready",
            SessionPhase::Closed => "Closed",
            SessionPhase::Errored => "Error",
        }
    }
}

/// State owned by the session controller.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub home_dir: Option<String>,
    /// Last path confirmed by a listing. Drives the prompt.
    pub current_path: Option<String>,
    /// Latest listing target not yet confirmed.
    pub requested_path: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            home_dir: None,
            current_path: None,
            requested_path: None,
        }
    }

    /// Path that relative navigation starts from: the latest intent if a
    /// listing is outstanding, otherwise the confirmed path.
    pub fn navigation_base(&self) -> Option<&str> {
        self.requested_path
            .as_deref()
            .or(self.current_path.as_deref())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
