use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// SSH backend executable. Bare names are looked up on PATH.
    pub backend_path: String,
    pub handshake_timeout_secs: u64,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_path: "ssh_backend".to_string(),
            handshake_timeout_secs: 10,
            log_dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    pub fn handshake_timeout(&self) -> Duration {
        // A zero timeout would fail every handshake
        Duration::from_secs(self.handshake_timeout_secs.max(1))
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("sshb");
        Self::with_dir(&config_dir)
    }

    pub fn with_dir(config_dir: &Path) -> Result<Self> {
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        }

        Ok(Self {
            config_file: config_dir.join("sshb.toml"),
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config)?;
            tracing::info!("Created default config at {:?}", self.config_file);
            return Ok(default_config);
        }

        let content =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let config: AppConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }
}
