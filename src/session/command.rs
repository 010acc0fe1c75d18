use crate::error::Result;
use crate::session::path;
use crate::session::protocol::Request;
use crate::session::state::SessionState;

/// What a submitted terminal line turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Blank input; only the prompt is shown again.
    Noop,
    /// Answered locally without a round trip (`pwd`).
    LocalEcho(String),
    /// Close the session.
    Disconnect,
    /// List a remote directory (`cd <arg>`, `ls`).
    RemoteList(String),
    /// Run the line on the remote host.
    RemoteExec(String),
}

impl Action {
    /// The single wire request this action issues, if any.
    pub fn request(&self) -> Option<Request> {
        match self {
            Action::Noop | Action::LocalEcho(_) => None,
            Action::Disconnect => Some(Request::Disconnect),
            Action::RemoteList(path) => Some(Request::SftpList { path: path.clone() }),
            Action::RemoteExec(command) => Some(Request::Exec {
                command: command.clone(),
            }),
        }
    }
}

/// Classify a submitted line.
///
/// `pwd` and `ls` report the confirmed `current_path`. `cd` resolves its
/// argument against the latest navigation target, so a second `cd ..` issued
/// before the first listing arrives still walks one level further.
pub fn interpret(line: &str, state: &SessionState) -> Result<Action> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Action::Noop);
    }

    let current = state.current_path.as_deref();

    if let Some(arg) = line.strip_prefix("cd ") {
        let base = state.navigation_base().unwrap_or(".");
        let target = path::resolve(base, state.home_dir.as_deref(), arg.trim())?;
        return Ok(Action::RemoteList(target));
    }

    let action = match line {
        "ls" => Action::RemoteList(current.unwrap_or(".").to_string()),
        "pwd" => Action::LocalEcho(current.unwrap_or("~").to_string()),
        "disconnect" => Action::Disconnect,
        _ => Action::RemoteExec(line.to_string()),
    };
    Ok(action)
}
