//! Wire format spoken with the backend process.
//!
//! One JSON record per line in each direction. Requests are tagged by `cmd`,
//! responses by `status`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ConnectionConfig, FileEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Request {
    Connect {
        host: String,
        port: u16,
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },
    Disconnect,
    GetHomeDir,
    SftpList {
        path: String,
    },
    SftpUpload {
        local: String,
        remote: String,
    },
    SftpDownload {
        remote: String,
        local: String,
    },
    SftpDelete {
        path: String,
        is_dir: bool,
    },
    Exec {
        command: String,
    },
}

impl Request {
    pub fn connect(config: &ConnectionConfig) -> Self {
        Request::Connect {
            host: config.host().to_string(),
            port: config.port(),
            username: config.username().to_string(),
            password: config.password().map(str::to_string),
            key: config.key_path().map(str::to_string),
        }
    }

    /// Short name for logs. Never includes credentials.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Connect { .. } => "Connect",
            Request::Disconnect => "Disconnect",
            Request::GetHomeDir => "GetHomeDir",
            Request::SftpList { .. } => "SftpList",
            Request::SftpUpload { .. } => "SftpUpload",
            Request::SftpDownload { .. } => "SftpDownload",
            Request::SftpDelete { .. } => "SftpDelete",
            Request::Exec { .. } => "Exec",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Connected,
    Disconnected,
    HomeDir {
        path: String,
    },
    Ok,
    Files {
        #[serde(default)]
        files: Vec<FileEntry>,
        #[serde(default)]
        path: Option<String>,
    },
    Output {
        #[serde(default)]
        output: String,
    },
    Error {
        #[serde(default = "unknown_error")]
        message: String,
    },
    DownloadComplete {
        #[serde(default)]
        local: String,
    },
    UploadComplete {
        #[serde(default)]
        remote: String,
    },
    DeleteComplete {
        #[serde(default)]
        path: String,
    },
}

fn unknown_error() -> String {
    "Unknown error".to_string()
}

/// A decoded line from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Response(Response),
    /// Anything that is not a recognizable record. Shown verbatim.
    RawText(String),
}

/// Encode a request as a single newline-terminated line.
pub fn encode(request: &Request) -> Result<String> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    Ok(line)
}

/// Decode one line. Blank lines yield `None`; malformed lines are kept as
/// raw text rather than dropped.
pub fn decode(line: &str) -> Option<Incoming> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Response>(trimmed) {
        Ok(response) => Some(Incoming::Response(response)),
        Err(e) => {
            tracing::debug!("Unparsed backend line ({}): {}", e, trimmed);
            Some(Incoming::RawText(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn encoded_json(request: &Request) -> Value {
        let line = encode(request).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        serde_json::from_str(line.trim_end()).unwrap()
    }

    #[test]
    fn test_connect_omits_absent_credentials() {
        let config = ConnectionConfig::new("example.com", 22, "bob", None, None).unwrap();
        let value = encoded_json(&Request::connect(&config));
        assert_eq!(
            value,
            json!({"cmd": "Connect", "host": "example.com", "port": 22, "username": "bob"})
        );
    }

    #[test]
    fn test_connect_carries_password_and_key() {
        let config = ConnectionConfig::new(
            "h",
            2222,
            "u",
            Some("secret".into()),
            Some("/home/u/.ssh/id_ed25519".into()),
        )
        .unwrap();
        let value = encoded_json(&Request::connect(&config));
        assert_eq!(value["password"], "secret");
        assert_eq!(value["key"], "/home/u/.ssh/id_ed25519");
        assert_eq!(value["port"], 2222);
    }

    #[test]
    fn test_request_tags() {
        assert_eq!(encoded_json(&Request::Disconnect), json!({"cmd": "Disconnect"}));
        assert_eq!(encoded_json(&Request::GetHomeDir), json!({"cmd": "GetHomeDir"}));
        assert_eq!(
            encoded_json(&Request::SftpDelete {
                path: "/tmp/x".into(),
                is_dir: true
            }),
            json!({"cmd": "SftpDelete", "path": "/tmp/x", "is_dir": true})
        );
        assert_eq!(
            encoded_json(&Request::SftpDownload {
                remote: "/r".into(),
                local: "/l".into()
            }),
            json!({"cmd": "SftpDownload", "remote": "/r", "local": "/l"})
        );
    }

    #[test]
    fn test_newlines_in_commands_stay_on_one_line() {
        let line = encode(&Request::Exec {
            command: "echo a\necho b".into(),
        })
        .unwrap();
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_decode_response_kinds() {
        assert_eq!(
            decode(r#"{"status":"connected"}"#),
            Some(Incoming::Response(Response::Connected))
        );
        assert_eq!(
            decode(r#"{"status":"home_dir","path":"/home/bob"}"#),
            Some(Incoming::Response(Response::HomeDir {
                path: "/home/bob".into()
            }))
        );
        assert_eq!(
            decode(r#"{"status":"upload_complete","remote":"/tmp/a"}"#),
            Some(Incoming::Response(Response::UploadComplete {
                remote: "/tmp/a".into()
            }))
        );
        assert_eq!(
            decode(r#"{"status":"ok"}"#),
            Some(Incoming::Response(Response::Ok))
        );
    }

    #[test]
    fn test_decode_files_with_and_without_path() {
        let with_path = decode(
            r#"{"status":"files","files":[{"name":"a.txt","is_dir":false,"size":10}],"path":"/home/bob"}"#,
        );
        assert_eq!(
            with_path,
            Some(Incoming::Response(Response::Files {
                files: vec![FileEntry::file("a.txt", 10)],
                path: Some("/home/bob".into()),
            }))
        );

        let without_path = decode(r#"{"status":"files","files":[]}"#);
        assert_eq!(
            without_path,
            Some(Incoming::Response(Response::Files {
                files: vec![],
                path: None,
            }))
        );
    }

    #[test]
    fn test_error_without_message_gets_default() {
        assert_eq!(
            decode(r#"{"status":"error"}"#),
            Some(Incoming::Response(Response::Error {
                message: "Unknown error".into()
            }))
        );
    }

    #[test]
    fn test_malformed_lines_become_raw_text() {
        assert_eq!(
            decode("thread 'main' panicked at src/main.rs\n"),
            Some(Incoming::RawText("thread 'main' panicked at src/main.rs".into()))
        );
        assert_eq!(
            decode(r#"{"status":"mystery"}"#),
            Some(Incoming::RawText(r#"{"status":"mystery"}"#.into()))
        );
        assert_eq!(decode("{not json"), Some(Incoming::RawText("{not json".into())));
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("   \r\n"), None);
    }
}
