//! Global configuration parsing and transport-mode selection.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{KtrlError, Result};

fn default_max_history_lines() -> usize {
    500
}

/// Global configuration parsed from `ktrl.toml`.
///
/// Exactly one transport mode is used: the unix socket when both
/// `sock_dir` and `sock_name` are set, otherwise TCP when both
/// `server_host` and `server_port` are set.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct KtrlConfig {
    /// Directory holding the unix socket file.
    #[serde(default)]
    pub sock_dir: Option<PathBuf>,
    /// Unix socket file name inside `sock_dir`.
    #[serde(default)]
    pub sock_name: Option<String>,
    /// Daemon host for TCP mode.
    #[serde(default)]
    pub server_host: Option<String>,
    /// Daemon port for TCP mode.
    #[serde(default)]
    pub server_port: Option<u16>,
    /// Shell history file; history is kept in memory only when unset.
    #[serde(default)]
    pub history_file_path: Option<PathBuf>,
    /// Maximum number of history lines retained on disk.
    #[serde(default = "default_max_history_lines")]
    pub max_history_lines: usize,
}

/// The transport mode selected from a [`KtrlConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// HTTP over a unix-domain socket at `dir/name`.
    Socket {
        /// Socket directory.
        dir: PathBuf,
        /// Socket file name.
        name: String,
    },
    /// HTTP over TCP.
    Tcp {
        /// Host the client connects to.
        host: String,
        /// Port used by both client and listener.
        port: u16,
    },
}

impl TransportConfig {
    /// Unix socket transport at `dir/name`.
    pub fn socket(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::Socket {
            dir: dir.into(),
            name: name.into(),
        }
    }

    /// TCP transport targeting `host:port`.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Full socket path in socket mode, `None` in TCP mode.
    #[must_use]
    pub fn socket_path(&self) -> Option<PathBuf> {
        match self {
            Self::Socket { dir, name } => Some(dir.join(name)),
            Self::Tcp { .. } => None,
        }
    }
}

impl KtrlConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Config` if the file cannot be read, contains
    /// invalid TOML, or fails validation.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| KtrlError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Select the active transport mode.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Config` when neither the socket pair nor the
    /// host/port pair is fully configured.
    pub fn transport(&self) -> Result<TransportConfig> {
        match (
            &self.sock_dir,
            &self.sock_name,
            &self.server_host,
            self.server_port,
        ) {
            (Some(dir), Some(name), _, _) if !dir.as_os_str().is_empty() && !name.is_empty() => {
                Ok(TransportConfig::socket(dir.clone(), name.clone()))
            }
            (_, _, Some(host), Some(port)) if !host.is_empty() && port != 0 => {
                Ok(TransportConfig::tcp(host.clone(), port))
            }
            _ => Err(KtrlError::Config(
                "no transport configured: set sock_dir + sock_name or server_host + server_port"
                    .into(),
            )),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sock_dir.is_some() && self.server_host.is_some() {
            debug!("both socket and tcp transports configured; socket mode takes precedence");
        }

        if self.max_history_lines == 0 {
            return Err(KtrlError::Config(
                "max_history_lines must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
