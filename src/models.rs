use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Settings for one connection. Immutable once a session has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    username: String,
    password: Option<String>,
    key_path: Option<String>,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: Option<String>,
        key_path: Option<String>,
    ) -> Result<Self, SessionError> {
        let host = host.into().trim().to_string();
        let username = username.into().trim().to_string();

        if host.is_empty() || username.is_empty() {
            return Err(SessionError::InvalidConfig(
                "host and username are required".to_string(),
            ));
        }
        if port == 0 {
            return Err(SessionError::InvalidConfig(
                "port must be a number between 1 and 65535".to_string(),
            ));
        }

        // Blank secrets mean "not provided"
        let password = password.filter(|p| !p.is_empty());
        let key_path = key_path.filter(|k| !k.trim().is_empty());

        Ok(Self {
            host,
            port,
            username,
            password,
            key_path,
        })
    }

    /// Build from a `user@host` destination.
    pub fn from_destination(
        destination: &str,
        port: u16,
        password: Option<String>,
        key_path: Option<String>,
    ) -> Result<Self, SessionError> {
        let (username, host) = destination.rsplit_once('@').ok_or_else(|| {
            SessionError::InvalidConfig(format!(
                "destination '{}' must look like user@host",
                destination
            ))
        })?;
        Self::new(host, port, username, password, key_path)
    }

    /// Settings for another session typed as `user@host[:port]`. Credentials
    /// carry over from `self`; the port does too unless one is given.
    pub fn for_destination(&self, destination: &str) -> Result<Self, SessionError> {
        let destination = destination.trim();
        let (destination, port) = match destination.rsplit_once(':') {
            Some((rest, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    SessionError::InvalidConfig(
                        "port must be a number between 1 and 65535".to_string(),
                    )
                })?;
                (rest, port)
            }
            None => (destination, self.port),
        };
        Self::from_destination(
            destination,
            port,
            self.password.clone(),
            self.key_path.clone(),
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn key_path(&self) -> Option<&str> {
        self.key_path.as_deref()
    }

    pub fn display_name(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

/// One entry of a remote directory listing as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl FileEntry {
    #[cfg(test)]
    pub fn file(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            is_dir: false,
            size: Some(size),
            modified: None,
        }
    }

    #[cfg(test)]
    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_dir: true,
            size: None,
            modified: None,
        }
    }
}
