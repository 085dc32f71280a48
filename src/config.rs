use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Server configuration.
///
/// Every field has a default, so a YAML file only needs to name the values
/// it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the listener binds to.
    pub listen_addr: String,
    /// Directory that request paths are resolved against.
    pub root: PathBuf,
    /// Value of the `Server` response header.
    pub server_name: String,
    /// Read inactivity window before a connection is closed.
    pub idle_timeout_ms: u64,
    /// Capacity of the worker pool.
    pub max_connections: usize,
    /// Receive buffer size; one byte is always left unused.
    pub recv_buffer_size: usize,
    /// Longest request URL kept; longer URLs are truncated.
    pub max_url_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            root: PathBuf::from("/"),
            server_name: "dirhttpd".to_string(),
            idle_timeout_ms: 5000,
            max_connections: 1024,
            recv_buffer_size: 4096,
            max_url_len: 128,
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// Reads the YAML file named by `DIRHTTPD_CONFIG` if set, then applies the
    /// `LISTEN` and `DIRHTTPD_ROOT` overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("DIRHTTPD_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("DIRHTTPD_ROOT") {
            cfg.root = PathBuf::from(root);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("invalid YAML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.recv_buffer_size < 2 {
            anyhow::bail!("recv_buffer_size must be at least 2, got {}", self.recv_buffer_size);
        }
        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        if self.idle_timeout_ms == 0 {
            anyhow::bail!("idle_timeout_ms must be at least 1");
        }
        Ok(())
    }
}
