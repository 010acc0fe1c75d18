//! Session protocol controller.
//!
//! Owns the session state, turns submitted lines and browser actions into
//! requests, and routes backend responses to the terminal output and the
//! remote listing. It performs no I/O: the owning loop feeds it transport
//! events, drains [`SessionController::poll_transport`] into the backend and
//! calls [`SessionController::flush_output`] once per step.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::app_event::SessionEvent;
use crate::error::{Result, SessionError};
use crate::models::{ConnectionConfig, FileEntry};
use crate::session::command::{self, Action};
use crate::session::listing;
use crate::session::output::OutputSequencer;
use crate::session::path;
use crate::session::protocol::{self, Incoming, Request, Response};
use crate::session::queue::RequestQueue;
use crate::session::state::{SessionPhase, SessionState};

/// Work for the transport, in the order it must happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Send(Request),
    CloseInput,
    Terminate,
}

pub struct SessionController {
    config: ConnectionConfig,
    state: SessionState,
    output: OutputSequencer,
    requests: RequestQueue,
    control: VecDeque<TransportCommand>,
    handshake_timeout: Duration,
    handshake_deadline: Option<Instant>,
    disconnect_requested: bool,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionController {
    pub fn new(
        config: ConnectionConfig,
        handshake_timeout: Duration,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            config,
            state: SessionState::new(),
            output: OutputSequencer::new(),
            requests: RequestQueue::new(),
            control: VecDeque::new(),
            handshake_timeout,
            handshake_deadline: None,
            disconnect_requested: false,
            events,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    /// Request written and not answered yet.
    pub fn pending_request(&self) -> Option<&Request> {
        self.requests.in_flight()
    }

    pub fn handshake_deadline(&self) -> Option<Instant> {
        self.handshake_deadline
    }

    /// Prompt for the current input line, e.g. `bob@host:~/src$ `.
    pub fn prompt(&self) -> String {
        let path = self.state.current_path.as_deref().unwrap_or("~");
        format!(
            "{}@{}:{}$ ",
            self.config.username(),
            self.config.host(),
            path::abbreviate_home(path, self.state.home_dir.as_deref())
        )
    }

    // ---- lifecycle -------------------------------------------------------

    /// The backend is running: send `Connect` and arm the handshake timer.
    pub fn begin_connect(&mut self, now: Instant) {
        if self.state.phase != SessionPhase::Disconnected {
            tracing::warn!("begin_connect in phase {:?}", self.state.phase);
            return;
        }

        self.set_phase(SessionPhase::Connecting);
        self.output
            .submit(&format!("Connecting to {}...", self.config.display_name()));
        self.send_now(Request::connect(&self.config));
        self.handshake_deadline = Some(now + self.handshake_timeout);
    }

    /// The backend could not be launched.
    pub fn backend_unavailable(&mut self, error: &SessionError) {
        tracing::error!("Backend unavailable: {}", error);
        self.output.submit(&format!("Error: {}", error));
        self.set_phase(SessionPhase::Errored);
    }

    pub fn on_handshake_timeout(&mut self, now: Instant) {
        let Some(deadline) = self.handshake_deadline else {
            return;
        };
        if now < deadline || self.state.phase != SessionPhase::Connecting {
            return;
        }

        tracing::error!("Handshake timed out after {:?}", self.handshake_timeout);
        self.handshake_deadline = None;
        self.output.submit("Error: Connection timeout");
        self.control.push_back(TransportCommand::Terminate);
        self.set_phase(SessionPhase::Errored);
    }

    pub fn on_backend_exit(&mut self, code: Option<i32>) {
        self.handshake_deadline = None;
        self.requests.clear();
        self.control.clear();

        let code_text = code.map_or_else(|| "killed".to_string(), |c| c.to_string());
        self.output
            .submit(&format!("Connection closed (code: {})", code_text));

        if self.state.phase == SessionPhase::Errored {
            return;
        }
        let phase = if self.disconnect_requested || code == Some(0) {
            SessionPhase::Closed
        } else {
            SessionPhase::Errored
        };
        self.set_phase(phase);
    }

    /// A request could not be written. It will never be answered, so the
    /// next queued one may go out.
    pub fn on_write_failed(&mut self, error: &SessionError) {
        tracing::error!("Failed to write to backend: {}", error);
        if let Some(Request::SftpList { path }) = self.requests.complete() {
            if self.state.requested_path.as_deref() == Some(path.as_str()) {
                self.state.requested_path = None;
            }
        }
        self.output.submit(&format!("Error: {}", error));
    }

    /// Ask the backend to close the session. Pending requests are dropped.
    pub fn disconnect(&mut self) {
        if self.disconnect_requested || self.state.phase.is_terminal() {
            return;
        }
        if self.state.phase == SessionPhase::Disconnected {
            self.set_phase(SessionPhase::Closed);
            return;
        }

        tracing::info!("Disconnect requested");
        self.disconnect_requested = true;
        self.handshake_deadline = None;
        self.output.submit("Disconnecting from server...");
        self.send_now(Request::Disconnect);
    }

    // ---- user input ------------------------------------------------------

    /// Handle a line submitted at the prompt.
    pub fn submit_line(&mut self, line: &str) -> Result<()> {
        self.ensure_ready()?;

        let action = match command::interpret(line, &self.state) {
            Ok(action) => action,
            Err(e) => {
                self.output.submit(&format!("Error: {}", e));
                return Err(e);
            }
        };
        tracing::debug!("Interpreted input as {:?}", action);

        match action {
            Action::Noop => self.output.schedule_prompt(),
            Action::LocalEcho(text) => self.output.submit(&text),
            Action::Disconnect => self.disconnect(),
            Action::RemoteList(path) => self.list(path),
            Action::RemoteExec(_) => {
                if let Some(request) = action.request() {
                    self.enqueue(request);
                }
            }
        }
        Ok(())
    }

    /// Open a directory from the remote listing.
    pub fn open_directory(&mut self, name: &str) -> Result<()> {
        self.ensure_ready()?;
        let base = self.state.navigation_base().unwrap_or(".");
        let target = if name == ".." {
            path::parent(base)
        } else {
            path::join(base, name)
        };
        self.list(target);
        Ok(())
    }

    /// Re-list the confirmed current directory.
    pub fn refresh(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.relist_current();
        Ok(())
    }

    pub fn download(&mut self, name: &str, local_dir: &Path) -> Result<()> {
        self.ensure_ready()?;
        let remote = self.remote_path_of(name);
        let local = local_dir.join(name).to_string_lossy().to_string();

        self.output
            .submit(&format!("Downloading {} to {}...", remote, local));
        self.enqueue(Request::SftpDownload { remote, local });
        Ok(())
    }

    pub fn upload(&mut self, local: &Path) -> Result<()> {
        self.ensure_ready()?;
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| SessionError::InvalidConfig(format!("{} is not a file", local.display())))?;
        let remote = self.remote_path_of(&name);
        let local = local.to_string_lossy().to_string();

        self.output
            .submit(&format!("Uploading {} to {}...", local, remote));
        self.enqueue(Request::SftpUpload { local, remote });
        Ok(())
    }

    pub fn delete(&mut self, name: &str, is_dir: bool) -> Result<()> {
        self.ensure_ready()?;
        let path = self.remote_path_of(name);

        self.output.submit(&format!("Deleting {}...", path));
        self.enqueue(Request::SftpDelete { path, is_dir });
        Ok(())
    }

    // ---- backend output --------------------------------------------------

    pub fn handle_line(&mut self, line: &str) {
        match protocol::decode(line) {
            None => {}
            Some(Incoming::RawText(text)) => {
                // Unstructured output answers nothing; the queue waits for a
                // real response
                if let Some(pending) = self.requests.in_flight() {
                    tracing::warn!(
                        "Unstructured backend output while {} is pending: {}",
                        pending.kind(),
                        text
                    );
                }
                self.output.submit(&text);
            }
            Some(Incoming::Response(response)) => self.handle_response(response),
        }
    }

    pub fn handle_stderr(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.output.submit(line);
        }
    }

    fn handle_response(&mut self, response: Response) {
        let answered = self.requests.complete();

        if self.disconnect_requested {
            match response {
                Response::Disconnected => {
                    self.output.submit("Disconnected from server.");
                    self.control.push_back(TransportCommand::CloseInput);
                }
                other => tracing::debug!("Dropping response after disconnect: {:?}", other),
            }
            return;
        }

        match response {
            Response::Connected => self.on_connected(),
            Response::HomeDir { path } => self.on_home_dir(path),
            Response::Files { files, path } => {
                let requested = match &answered {
                    Some(Request::SftpList { path }) => Some(path.as_str()),
                    _ => None,
                };
                self.on_files(&files, path.as_deref(), requested);
            }
            Response::Output { output } => self.output.submit(&output),
            Response::Error { message } => self.on_error(message, answered.as_ref()),
            Response::Ok => self.on_ok(answered),
            Response::DownloadComplete { local } => self.download_finished(&local),
            Response::UploadComplete { remote } => {
                self.output.submit(&format!("Upload complete: {}", remote));
                self.relist_current();
            }
            Response::DeleteComplete { path } => {
                self.output.submit(&format!("Delete complete: {}", path));
                self.relist_current();
            }
            Response::Disconnected => {
                tracing::warn!("Backend closed the session");
                self.disconnect_requested = true;
                self.output.submit("Disconnected from server.");
                self.control.push_back(TransportCommand::CloseInput);
            }
        }
    }

    fn on_connected(&mut self) {
        if self.state.phase != SessionPhase::Connecting {
            tracing::warn!("Unexpected 'connected' in phase {:?}", self.state.phase);
            return;
        }
        self.handshake_deadline = None;
        self.set_phase(SessionPhase::Connected);
        self.output.submit("SSH connection established!");
        self.enqueue(Request::GetHomeDir);
    }

    fn on_home_dir(&mut self, path: String) {
        let path = if path.trim().is_empty() {
            tracing::warn!("Backend reported an empty home directory, using /");
            "/".to_string()
        } else {
            path.trim().to_string()
        };

        self.state.home_dir = Some(path.clone());
        self.state.current_path = Some(path.clone());
        if self.state.phase == SessionPhase::Connected {
            self.set_phase(SessionPhase::Ready);
        }
        self.list(path);
    }

    fn on_files(&mut self, files: &[FileEntry], reported: Option<&str>, requested: Option<&str>) {
        let applied = listing::apply(&mut self.state, files, reported, requested);
        if applied.summary.is_empty() {
            self.output.schedule_prompt();
        } else {
            self.output.submit(&applied.summary);
        }
        self.emit(SessionEvent::Listing(applied.listing));
    }

    fn on_error(&mut self, message: String, answered: Option<&Request>) {
        self.output.submit(&format!("Error: {}", message));

        if self.state.phase == SessionPhase::Connecting {
            tracing::error!("Connection rejected: {}", message);
            self.handshake_deadline = None;
            self.control.push_back(TransportCommand::Terminate);
            self.set_phase(SessionPhase::Errored);
            return;
        }

        if let Some(Request::SftpList { path }) = answered {
            if self.state.requested_path.as_deref() == Some(path.as_str()) {
                self.state.requested_path = None;
            }
        }
    }

    fn on_ok(&mut self, answered: Option<Request>) {
        match answered {
            Some(Request::SftpUpload { remote, .. }) => {
                self.output.submit(&format!("Upload complete: {}", remote));
                self.relist_current();
            }
            Some(Request::SftpDelete { path, .. }) => {
                self.output.submit(&format!("Delete complete: {}", path));
                self.relist_current();
            }
            Some(Request::SftpDownload { local, .. }) => self.download_finished(&local),
            _ => self.output.submit("Command completed successfully"),
        }
    }

    fn download_finished(&mut self, local: &str) {
        self.output.submit(&format!("Download complete: {}", local));
        self.emit(SessionEvent::LocalChanged);
    }

    // ---- outgoing --------------------------------------------------------

    /// Next thing to do on the transport, if any.
    pub fn poll_transport(&mut self) -> Option<TransportCommand> {
        if let Some(command) = self.control.pop_front() {
            return Some(command);
        }
        if !self.state.phase.can_send() {
            return None;
        }
        self.requests.next_ready().map(TransportCommand::Send)
    }

    /// Emit the output collected during this step as a single block.
    pub fn flush_output(&mut self) {
        let prompt = (self.state.phase == SessionPhase::Ready && !self.disconnect_requested)
            .then(|| self.prompt());
        if let Some(block) = self.output.flush(prompt) {
            self.emit(SessionEvent::Output(block));
        }
    }

    fn list(&mut self, path: String) {
        self.state.requested_path = Some(path.clone());
        self.enqueue(Request::SftpList { path });
    }

    fn relist_current(&mut self) {
        if let Some(path) = self.state.current_path.clone() {
            self.enqueue(Request::SftpList { path });
        }
    }

    fn enqueue(&mut self, request: Request) {
        tracing::debug!(
            "Queued {} ({} already waiting)",
            request.kind(),
            self.requests.len()
        );
        self.requests.push(request);
    }

    /// Write ahead of the queue (`Connect`, `Disconnect`).
    fn send_now(&mut self, request: Request) {
        self.requests.preempt(request.clone());
        self.control.push_back(TransportCommand::Send(request));
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state.phase == SessionPhase::Ready && !self.disconnect_requested {
            Ok(())
        } else {
            Err(SessionError::NotReady)
        }
    }

    fn remote_path_of(&self, name: &str) -> String {
        path::join(self.state.current_path.as_deref().unwrap_or("."), name)
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.state.phase != phase {
            tracing::info!("Session phase {:?} -> {:?}", self.state.phase, phase);
            self.state.phase = phase;
            self.emit(SessionEvent::Phase(phase));
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Session event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::listing::Listing;
    use crate::session::output::OutputBlock;

    struct Harness {
        controller: SessionController,
        rx: mpsc::UnboundedReceiver<SessionEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let config = ConnectionConfig::new("example.com", 22, "bob", None, None).unwrap();
            Self {
                controller: SessionController::new(config, Duration::from_secs(10), tx),
                rx,
            }
        }

        /// Connected, home at /home/bob, initial listing answered.
        fn ready() -> Self {
            let mut h = Self::new();
            h.controller.begin_connect(Instant::now());
            h.sent();
            h.recv(r#"{"status":"connected"}"#);
            h.sent();
            h.recv(r#"{"status":"home_dir","path":"/home/bob"}"#);
            h.sent();
            h.recv(r#"{"status":"files","files":[],"path":"/home/bob"}"#);
            h.events();
            h
        }

        fn recv(&mut self, line: &str) {
            self.controller.handle_line(line);
        }

        /// Requests the controller writes right now.
        fn sent(&mut self) -> Vec<Request> {
            let mut sent = Vec::new();
            while let Some(command) = self.controller.poll_transport() {
                if let TransportCommand::Send(request) = command {
                    sent.push(request);
                }
            }
            sent
        }

        fn commands(&mut self) -> Vec<TransportCommand> {
            std::iter::from_fn(|| self.controller.poll_transport()).collect()
        }

        /// Flush, then everything published so far.
        fn events(&mut self) -> Vec<SessionEvent> {
            self.controller.flush_output();
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }

        fn blocks(&mut self) -> Vec<OutputBlock> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    SessionEvent::Output(block) => Some(block),
                    _ => None,
                })
                .collect()
        }

        fn listings(events: &[SessionEvent]) -> Vec<Listing> {
            events
                .iter()
                .filter_map(|e| match e {
                    SessionEvent::Listing(listing) => Some(listing.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    fn list(path: &str) -> Request {
        Request::SftpList { path: path.into() }
    }

    #[test]
    fn test_connect_home_and_initial_listing() {
        let mut h = Harness::new();
        h.controller.begin_connect(Instant::now());
        assert_eq!(h.controller.phase(), SessionPhase::Connecting);

        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], Request::Connect { host, port: 22, username, .. }
            if host == "example.com" && username == "bob"));

        h.recv(r#"{"status":"connected"}"#);
        assert_eq!(h.controller.phase(), SessionPhase::Connected);
        assert_eq!(h.controller.handshake_deadline(), None);
        assert_eq!(h.sent(), vec![Request::GetHomeDir]);

        h.recv(r#"{"status":"home_dir","path":"/home/bob"}"#);
        assert_eq!(h.controller.phase(), SessionPhase::Ready);
        assert_eq!(h.controller.state().current_path.as_deref(), Some("/home/bob"));
        assert_eq!(h.sent(), vec![list("/home/bob")]);

        h.recv(r#"{"status":"files","files":[{"name":"a.txt","is_dir":false,"size":10}],"path":"/home/bob"}"#);
        let events = h.events();
        let listings = Harness::listings(&events);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].names(), vec!["..", "a.txt"]);
        assert_eq!(listings[0].rows[1].size, "10 B");

        let blocks: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Output(block) => Some(block.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(blocks.len(), 1);
        let text = blocks[0].text.as_deref().unwrap();
        assert!(text.starts_with("Connecting to bob@example.com..."));
        assert!(text.contains("SSH connection established!"));
        assert!(text.ends_with("a.txt"));
        assert_eq!(blocks[0].prompt.as_deref(), Some("bob@example.com:~$ "));

        assert!(events.contains(&SessionEvent::Phase(SessionPhase::Ready)));
    }

    #[test]
    fn test_input_rejected_before_ready() {
        let mut h = Harness::new();
        h.controller.begin_connect(Instant::now());
        let err = h.controller.submit_line("ls").unwrap_err();
        assert!(matches!(err, SessionError::NotReady));
    }

    #[test]
    fn test_only_one_request_in_flight() {
        let mut h = Harness::ready();
        h.controller.submit_line("uname").unwrap();
        h.controller.submit_line("cd /tmp").unwrap();

        assert_eq!(
            h.sent(),
            vec![Request::Exec {
                command: "uname".into()
            }]
        );
        assert!(h.sent().is_empty());

        h.recv(r#"{"status":"output","output":"Linux\n"}"#);
        assert_eq!(h.sent(), vec![list("/tmp")]);
    }

    #[test]
    fn test_coalesced_output_yields_one_prompt() {
        let mut h = Harness::ready();
        h.controller.submit_line("pwd").unwrap();
        h.recv("backend chatter");

        let blocks = h.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text.as_deref(), Some("/home/bob\nbackend chatter"));
        assert_eq!(blocks[0].prompt.as_deref(), Some("bob@example.com:~$ "));
    }

    #[test]
    fn test_noop_redisplays_prompt() {
        let mut h = Harness::ready();
        h.controller.submit_line("   ").unwrap();
        assert!(h.sent().is_empty());
        let blocks = h.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, None);
        assert!(blocks[0].prompt.is_some());
    }

    #[test]
    fn test_cd_updates_prompt_after_listing() {
        let mut h = Harness::ready();
        h.controller.submit_line("cd /var/log").unwrap();
        assert_eq!(h.sent(), vec![list("/var/log")]);
        assert_eq!(h.controller.state().current_path.as_deref(), Some("/home/bob"));

        h.recv(r#"{"status":"files","files":[{"name":"syslog","is_dir":false,"size":1}],"path":"/var/log"}"#);
        let events = h.events();
        assert_eq!(Harness::listings(&events)[0].names(), vec!["..", "syslog"]);
        assert_eq!(h.controller.prompt(), "bob@example.com:/var/log$ ");
    }

    #[test]
    fn test_files_with_dot_path_returns_home() {
        let mut h = Harness::ready();
        h.controller.submit_line("cd /etc").unwrap();
        h.sent();
        h.recv(r#"{"status":"files","files":[],"path":"/etc"}"#);
        h.controller.submit_line("ls").unwrap();
        h.sent();
        h.recv(r#"{"status":"files","files":[],"path":"."}"#);
        assert_eq!(h.controller.state().current_path.as_deref(), Some("/home/bob"));
    }

    #[test]
    fn test_pwd_and_ls_use_confirmed_path_while_cd_pending() {
        let mut h = Harness::ready();
        h.controller.submit_line("uname").unwrap();
        h.sent();
        h.controller.submit_line("cd src").unwrap();
        h.controller.submit_line("pwd").unwrap();

        let blocks = h.blocks();
        assert_eq!(blocks[0].text.as_deref(), Some("/home/bob"));

        h.controller.submit_line("ls").unwrap();
        h.recv(r#"{"status":"output","output":"Linux\n"}"#);
        assert_eq!(h.sent(), vec![list("src")]);
        h.recv(r#"{"status":"files","files":[],"path":"/home/bob/src"}"#);
        assert_eq!(h.sent(), vec![list("/home/bob")]);
    }

    #[test]
    fn test_rapid_cd_resolves_against_latest_intent() {
        let mut h = Harness::ready();
        h.controller.submit_line("cd /a/b").unwrap();
        h.controller.submit_line("cd ..").unwrap();
        assert_eq!(h.sent(), vec![list("/a/b")]);

        // Answer for the first request arrives while the second is queued
        h.recv(r#"{"status":"files","files":[],"path":"/a/b"}"#);
        assert_eq!(h.controller.state().current_path.as_deref(), Some("/a/b"));
        assert_eq!(h.controller.state().requested_path.as_deref(), Some("/a"));

        assert_eq!(h.sent(), vec![list("/a")]);
        h.recv(r#"{"status":"files","files":[],"path":"/a"}"#);
        assert_eq!(h.controller.state().current_path.as_deref(), Some("/a"));
        assert_eq!(h.controller.state().requested_path, None);
    }

    #[test]
    fn test_failed_listing_drops_requested_path() {
        let mut h = Harness::ready();
        h.controller.submit_line("cd /nope").unwrap();
        h.sent();
        h.recv(r#"{"status":"error","message":"No such file"}"#);

        assert_eq!(h.controller.phase(), SessionPhase::Ready);
        assert_eq!(h.controller.state().requested_path, None);
        assert_eq!(h.controller.state().current_path.as_deref(), Some("/home/bob"));
        let blocks = h.blocks();
        assert_eq!(blocks[0].text.as_deref(), Some("Error: No such file"));

        h.controller.submit_line("cd ..").unwrap();
        assert_eq!(h.sent(), vec![list("/home")]);
    }

    #[test]
    fn test_upload_completion_relists_current_path() {
        let mut h = Harness::ready();
        h.controller.upload(Path::new("/tmp/report.pdf")).unwrap();
        assert_eq!(
            h.sent(),
            vec![Request::SftpUpload {
                local: "/tmp/report.pdf".into(),
                remote: "/home/bob/report.pdf".into()
            }]
        );

        h.recv(r#"{"status":"upload_complete","remote":"/home/bob/report.pdf"}"#);
        assert_eq!(h.sent(), vec![list("/home/bob")]);
        let blocks = h.blocks();
        let text = blocks[0].text.as_deref().unwrap();
        assert!(text.contains("Uploading /tmp/report.pdf to /home/bob/report.pdf..."));
        assert!(text.contains("Upload complete: /home/bob/report.pdf"));
    }

    #[test]
    fn test_plain_ok_completes_delete_and_download() {
        let mut h = Harness::ready();
        h.controller.delete("old", true).unwrap();
        assert_eq!(
            h.sent(),
            vec![Request::SftpDelete {
                path: "/home/bob/old".into(),
                is_dir: true
            }]
        );
        h.recv(r#"{"status":"ok"}"#);
        assert_eq!(h.sent(), vec![list("/home/bob")]);
        h.recv(r#"{"status":"files","files":[],"path":"/home/bob"}"#);

        h.controller.download("a.txt", Path::new("/tmp")).unwrap();
        assert_eq!(
            h.sent(),
            vec![Request::SftpDownload {
                remote: "/home/bob/a.txt".into(),
                local: "/tmp/a.txt".into()
            }]
        );
        h.recv(r#"{"status":"ok"}"#);
        let events = h.events();
        assert!(events.contains(&SessionEvent::LocalChanged));
        assert!(h.sent().is_empty());
    }

    #[test]
    fn test_rejected_delete_is_reported_without_retry() {
        let mut h = Harness::ready();
        h.controller.delete("locked", false).unwrap();
        h.sent();
        h.recv(r#"{"status":"error","message":"Permission denied"}"#);
        assert!(h.sent().is_empty());
        assert_eq!(h.controller.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_open_directory_from_listing() {
        let mut h = Harness::ready();
        h.controller.open_directory("projects").unwrap();
        assert_eq!(h.sent(), vec![list("/home/bob/projects")]);
        h.recv(r#"{"status":"files","files":[],"path":"/home/bob/projects"}"#);

        h.controller.open_directory("..").unwrap();
        assert_eq!(h.sent(), vec![list("/home/bob")]);
    }

    #[test]
    fn test_disconnect_drops_late_responses() {
        let mut h = Harness::ready();
        h.controller.submit_line("sleep 5").unwrap();
        h.sent();
        h.controller.submit_line("ls").unwrap();

        h.controller.submit_line("disconnect").unwrap();
        assert_eq!(h.sent(), vec![Request::Disconnect]);

        h.recv(r#"{"status":"output","output":"late"}"#);
        h.recv(r#"{"status":"disconnected"}"#);
        assert_eq!(h.commands(), vec![TransportCommand::CloseInput]);

        let blocks = h.blocks();
        let text = blocks[0].text.as_deref().unwrap();
        assert!(!text.contains("late"));
        assert!(text.contains("Disconnected from server."));
        assert_eq!(blocks[0].prompt, None);

        h.controller.on_backend_exit(Some(0));
        assert_eq!(h.controller.phase(), SessionPhase::Closed);
        assert!(h.controller.submit_line("ls").is_err());
    }

    #[test]
    fn test_handshake_timeout_terminates() {
        let mut h = Harness::new();
        let start = Instant::now();
        h.controller.begin_connect(start);
        h.sent();

        h.controller.on_handshake_timeout(start + Duration::from_secs(5));
        assert_eq!(h.controller.phase(), SessionPhase::Connecting);

        h.controller.on_handshake_timeout(start + Duration::from_secs(10));
        assert_eq!(h.controller.phase(), SessionPhase::Errored);
        assert_eq!(h.commands(), vec![TransportCommand::Terminate]);

        h.controller.on_backend_exit(None);
        assert_eq!(h.controller.phase(), SessionPhase::Errored);
        let text = h.blocks()[0].text.clone().unwrap();
        assert!(text.contains("Error: Connection timeout"));
        assert!(text.contains("Connection closed (code: killed)"));
    }

    #[test]
    fn test_rejected_handshake_is_fatal() {
        let mut h = Harness::new();
        h.controller.begin_connect(Instant::now());
        h.sent();
        h.recv(r#"{"status":"error","message":"Authentication failed"}"#);

        assert_eq!(h.controller.phase(), SessionPhase::Errored);
        assert_eq!(h.commands(), vec![TransportCommand::Terminate]);
    }

    #[test]
    fn test_abnormal_exit_is_an_error() {
        let mut h = Harness::ready();
        h.controller.on_backend_exit(Some(101));
        assert_eq!(h.controller.phase(), SessionPhase::Errored);
        let events = h.events();
        assert!(events.contains(&SessionEvent::Phase(SessionPhase::Errored)));
    }

    #[test]
    fn test_backend_unavailable() {
        let mut h = Harness::new();
        h.controller
            .backend_unavailable(&SessionError::BackendUnavailable("missing".into()));
        assert_eq!(h.controller.phase(), SessionPhase::Errored);
        assert!(h.sent().is_empty());
    }

    #[test]
    fn test_stderr_and_raw_text_are_shown_verbatim() {
        let mut h = Harness::ready();
        h.controller.handle_stderr("[WARN] slow network");
        h.recv("{\"status\":");
        let blocks = h.blocks();
        assert_eq!(
            blocks[0].text.as_deref(),
            Some("[WARN] slow network\n{\"status\":")
        );
        assert_eq!(h.controller.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_raw_text_leaves_request_pending() {
        let mut h = Harness::ready();
        h.controller.submit_line("uname").unwrap();
        h.controller.submit_line("whoami").unwrap();
        h.sent();

        h.recv("not json");
        assert_eq!(
            h.controller.pending_request(),
            Some(&Request::Exec {
                command: "uname".into()
            })
        );
        assert!(h.sent().is_empty());
        assert_eq!(h.blocks()[0].text.as_deref(), Some("not json"));
    }

    #[test]
    fn test_failed_write_releases_the_queue() {
        let mut h = Harness::ready();
        h.controller.submit_line("uname").unwrap();
        h.controller.submit_line("whoami").unwrap();
        assert_eq!(
            h.sent(),
            vec![Request::Exec {
                command: "uname".into()
            }]
        );

        h.controller.on_write_failed(&SessionError::InputClosed);
        assert_eq!(
            h.sent(),
            vec![Request::Exec {
                command: "whoami".into()
            }]
        );
        let blocks = h.blocks();
        assert!(blocks[0].text.as_deref().unwrap().starts_with("Error: "));
    }

    #[test]
    fn test_failed_listing_write_forgets_requested_path() {
        let mut h = Harness::ready();
        h.controller.submit_line("cd /tmp").unwrap();
        assert_eq!(h.sent(), vec![list("/tmp")]);

        h.controller.on_write_failed(&SessionError::InputClosed);
        assert_eq!(h.controller.state().requested_path, None);
        assert_eq!(h.controller.pending_request(), None);
    }
}
