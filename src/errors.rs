//! Error types shared across the crate.

use std::fmt::{Display, Formatter};

/// Shared crate result type.
pub type Result<T> = std::result::Result<T, KtrlError>;

/// Error enumeration covering every failure mode of the dispatch bridge.
#[derive(Debug)]
pub enum KtrlError {
    /// Configuration parsing or validation failure, including a missing
    /// transport mode.
    Config(String),
    /// Client-side network failure (connect, request, or body read).
    Transport(String),
    /// Listener could not be bound.
    Bind(String),
    /// HTTP server runtime failure after binding.
    Server(String),
    /// Interactive shell failure (command tree or input handling).
    Shell(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for KtrlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Bind(msg) => write!(f, "bind: {msg}"),
            Self::Server(msg) => write!(f, "server: {msg}"),
            Self::Shell(msg) => write!(f, "shell: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for KtrlError {}

impl From<toml::de::Error> for KtrlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for KtrlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
