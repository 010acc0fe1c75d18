use std::io;

use thiserror::Error;

/// Errors raised by the session layer.
///
/// Protocol-level failures reported by the backend are not errors here: they
/// arrive as `Response::Error` and are shown to the user as text.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("SSH backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("home directory is not known yet")]
    UnresolvedHome,

    #[error("session is not ready")]
    NotReady,

    #[error("invalid connection settings: {0}")]
    InvalidConfig(String),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("backend I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("backend input is closed")]
    InputClosed,
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
