// ABOUTME: Configuration for the scrast recorder and its control socket.
// ABOUTME: Loaded from an optional TOML file with sensible defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Encoder binary name or path
    pub encoder: String,

    /// Well-known rendezvous path of the control socket
    pub socket_path: PathBuf,

    /// Directory recordings are written to (~ is expanded)
    pub output_directory: String,

    /// How long a control exchange may wait for the other side
    pub reply_timeout_secs: u64,

    /// Upper bound on retained encoder diagnostic output
    pub error_buffer_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoder: "ffmpeg".to_string(),
            socket_path: PathBuf::from("/tmp/scrast.sock"),
            output_directory: "~/Videos/scrast".to_string(),
            reply_timeout_secs: 5,
            error_buffer_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the default config file path (~/.config/scrast/config.toml)
    pub fn default_path() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("scrast")
            .join("config.toml")
    }

    /// Expand ~ in the output directory
    pub fn output_directory_expanded(&self) -> PathBuf {
        shellexpand::tilde(&self.output_directory)
            .into_owned()
            .into()
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}
