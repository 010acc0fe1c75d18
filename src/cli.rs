//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;
use crate::error::SessionError;
use crate::models::ConnectionConfig;

pub const PASSWORD_ENV: &str = "SSHB_PASSWORD";

/// Terminal SSH shell and remote file browser.
#[derive(Debug, Parser)]
#[command(name = "sshb", version, about)]
pub struct Cli {
    /// Remote destination as user@host.
    pub destination: String,

    /// SSH port.
    #[arg(short, long, default_value_t = 22, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Private key file.
    #[arg(short = 'i', long = "identity")]
    pub identity: Option<PathBuf>,

    /// Password. Falls back to the SSHB_PASSWORD environment variable.
    #[arg(long)]
    pub password: Option<String>,

    /// Path of the SSH backend executable.
    #[arg(long)]
    pub backend: Option<PathBuf>,

    /// Seconds to wait for the SSH handshake.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl Cli {
    pub fn connection_config(&self) -> Result<ConnectionConfig, SessionError> {
        let password = self
            .password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok());
        let key_path = self
            .identity
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());

        ConnectionConfig::from_destination(&self.destination, self.port, password, key_path)
    }

    /// Flags win over the config file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(backend) = &self.backend {
            config.backend_path = backend.to_string_lossy().to_string();
        }
        if let Some(timeout) = self.timeout {
            config.handshake_timeout_secs = timeout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_and_flags() {
        let cli = Cli::try_parse_from([
            "sshb",
            "bob@example.com",
            "-p",
            "2222",
            "-i",
            "/home/bob/.ssh/id_ed25519",
            "--password",
            "hunter2",
        ])
        .unwrap();

        let config = cli.connection_config().unwrap();
        assert_eq!(config.host(), "example.com");
        assert_eq!(config.username(), "bob");
        assert_eq!(config.port(), 2222);
        assert_eq!(config.password(), Some("hunter2"));
        assert_eq!(config.key_path(), Some("/home/bob/.ssh/id_ed25519"));
    }

    #[test]
    fn test_port_zero_is_rejected() {
        assert!(Cli::try_parse_from(["sshb", "bob@example.com", "-p", "0"]).is_err());
        assert!(Cli::try_parse_from(["sshb", "bob@example.com", "-p", "70000"]).is_err());
    }

    #[test]
    fn test_destination_without_user_is_rejected() {
        let cli = Cli::try_parse_from(["sshb", "example.com"]).unwrap();
        assert!(matches!(
            cli.connection_config(),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "sshb",
            "bob@example.com",
            "--backend",
            "/opt/ssh_backend",
            "--timeout",
            "3",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.backend_path, "/opt/ssh_backend");
        assert_eq!(config.handshake_timeout_secs, 3);

        let cli = Cli::try_parse_from(["sshb", "bob@example.com"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, AppConfig::default());
    }
}
