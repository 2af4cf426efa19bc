//! Daemon listener lifecycle.
//!
//! In socket mode a leftover socket file from a previous process is removed
//! before binding. In TCP mode the listener binds all interfaces on the
//! configured port; the configured host is only used by clients.

use std::net::SocketAddr;
#[cfg(unix)]
use std::path::{Path, PathBuf};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
#[cfg(unix)]
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::adapter::build_router;
use crate::config::TransportConfig;
use crate::registry::Registry;
use crate::{KtrlError, Result};

/// A bound daemon listener.
#[derive(Debug)]
pub enum ServerListener {
    /// Unix-domain socket listener and the path it owns.
    #[cfg(unix)]
    Unix {
        /// Bound listener.
        listener: UnixListener,
        /// Socket file path, removed after shutdown.
        path: PathBuf,
    },
    /// TCP listener on all interfaces.
    Tcp(TcpListener),
}

/// Remove a stale socket file at `path`.
///
/// A missing path is not an error.
///
/// # Errors
///
/// Returns `KtrlError::Bind` if an existing file cannot be removed.
#[cfg(unix)]
pub fn remove_stale_socket(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale socket file");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(KtrlError::Bind(format!(
            "failed to remove stale socket {}: {err}",
            path.display()
        ))),
    }
}

impl ServerListener {
    /// Bind the listener for `config`. Bind failures are not retried.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Bind` if the socket or port cannot be bound, or
    /// `KtrlError::Config` for socket mode on a platform without unix
    /// sockets.
    pub async fn bind(config: &TransportConfig) -> Result<Self> {
        match config {
            #[cfg(unix)]
            TransportConfig::Socket { dir, name } => {
                let path = dir.join(name);
                remove_stale_socket(&path)?;
                std::fs::create_dir_all(dir).map_err(|err| {
                    KtrlError::Bind(format!("failed to create {}: {err}", dir.display()))
                })?;
                let listener = UnixListener::bind(&path).map_err(|err| {
                    KtrlError::Bind(format!("failed to bind {}: {err}", path.display()))
                })?;
                Ok(Self::Unix { listener, path })
            }
            #[cfg(not(unix))]
            TransportConfig::Socket { .. } => Err(KtrlError::Config(
                "unix socket transport is not supported on this platform".into(),
            )),
            TransportConfig::Tcp { host, port } => {
                debug!(%host, port, "tcp listener ignores the configured host and binds all interfaces");
                let bind = SocketAddr::from(([0, 0, 0, 0], *port));
                let listener = TcpListener::bind(bind)
                    .await
                    .map_err(|err| KtrlError::Bind(format!("failed to bind {bind}: {err}")))?;
                Ok(Self::Tcp(listener))
            }
        }
    }

    /// Bound TCP address; `None` in socket mode.
    #[must_use]
    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        match self {
            #[cfg(unix)]
            Self::Unix { .. } => None,
            Self::Tcp(listener) => listener.local_addr().ok(),
        }
    }
}

/// Serve `registry` on `listener` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `KtrlError::Server` if the HTTP server fails.
pub async fn serve(registry: &Registry, listener: ServerListener, ct: CancellationToken) -> Result<()> {
    let router = build_router(registry);

    match listener {
        #[cfg(unix)]
        ServerListener::Unix { listener, path } => {
            info!(path = %path.display(), commands = registry.len(), "daemon listening on unix socket");
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { ct.cancelled().await })
                .await;
            remove_stale_socket(&path)?;
            result.map_err(|err| KtrlError::Server(format!("unix socket server error: {err}")))?;
        }
        ServerListener::Tcp(listener) => {
            let addr = listener
                .local_addr()
                .map_err(|err| KtrlError::Server(format!("listener has no address: {err}")))?;
            info!(%addr, commands = registry.len(), "daemon listening on tcp");
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { ct.cancelled().await })
                .await
                .map_err(|err| KtrlError::Server(format!("tcp server error: {err}")))?;
        }
    }

    info!("daemon shut down");
    Ok(())
}

/// A daemon serving on a background task.
#[derive(Debug)]
pub struct DaemonHandle {
    ct: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl DaemonHandle {
    /// Serve `registry` on `listener` in a spawned task.
    #[must_use]
    pub fn spawn(registry: Registry, listener: ServerListener) -> Self {
        let ct = CancellationToken::new();
        let server_ct = ct.clone();
        let task = tokio::spawn(async move { serve(&registry, listener, server_ct).await });
        Self { ct, task }
    }

    /// Token that stops the daemon when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.ct
    }

    /// Stop the daemon and wait for its task.
    ///
    /// # Errors
    ///
    /// Returns the error `serve` ended with, or `KtrlError::Server` if the
    /// task panicked or was aborted.
    pub async fn shutdown(self) -> Result<()> {
        self.ct.cancel();
        self.task
            .await
            .map_err(|err| KtrlError::Server(format!("daemon task failed: {err}")))?
    }
}

/// Bind the listener for `config` and serve `registry` until `ct` is
/// cancelled.
///
/// # Errors
///
/// Returns `KtrlError::Bind` when binding fails and `KtrlError::Server`
/// when serving fails.
pub async fn run_daemon(config: &TransportConfig, registry: &Registry, ct: CancellationToken) -> Result<()> {
    let listener = ServerListener::bind(config).await?;
    serve(registry, listener, ct).await
}
