//! Client transport: HTTP over a unix socket or over TCP.
//!
//! The transport is built once during initialization and owned by the
//! [`Dispatcher`](super::dispatcher::Dispatcher). No request timeout is set;
//! a daemon that accepts but never answers blocks the caller.

#[cfg(unix)]
use std::path::{Path, PathBuf};

use reqwest::Url;
use tracing::debug;

use crate::config::TransportConfig;
use crate::{KtrlError, Result};

/// Placeholder authority used in socket mode, where the socket path does
/// the real addressing.
pub const UNIX_AUTHORITY: &str = "localhost";

/// Connected-on-demand client for one transport mode.
#[derive(Debug, Clone)]
pub enum ClientTransport {
    /// Dial the socket path for every request.
    #[cfg(unix)]
    Unix {
        /// Socket file path.
        path: PathBuf,
    },
    /// Plain HTTP client targeting `host:port`.
    Tcp {
        /// Shared HTTP client.
        client: reqwest::Client,
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },
}

impl ClientTransport {
    /// Build the client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Config` if socket mode is requested on a platform
    /// without unix sockets, or if the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        match config {
            #[cfg(unix)]
            TransportConfig::Socket { dir, name } => Ok(Self::Unix {
                path: dir.join(name),
            }),
            #[cfg(not(unix))]
            TransportConfig::Socket { .. } => Err(KtrlError::Config(
                "unix socket transport is not supported on this platform".into(),
            )),
            TransportConfig::Tcp { host, port } => {
                let client = reqwest::Client::builder()
                    .no_proxy()
                    .build()
                    .map_err(|err| KtrlError::Config(format!("failed to build http client: {err}")))?;
                Ok(Self::Tcp {
                    client,
                    host: host.clone(),
                    port: *port,
                })
            }
        }
    }

    /// Scheme and authority every request URL starts with.
    #[must_use]
    pub fn base_url(&self) -> String {
        match self {
            #[cfg(unix)]
            Self::Unix { .. } => format!("http://{UNIX_AUTHORITY}"),
            Self::Tcp { host, port, .. } => format!("http://{host}:{port}"),
        }
    }

    /// Issue one GET for `url` and read the whole body.
    ///
    /// The body is buffered in memory without a size limit.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Transport` on connect, request or body failures.
    pub async fn get(&self, url: &Url) -> Result<Vec<u8>> {
        match self {
            #[cfg(unix)]
            Self::Unix { path } => get_unix(path, url).await,
            Self::Tcp { client, .. } => {
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|err| KtrlError::Transport(format!("request to {url} failed: {err}")))?;
                debug!(status = %response.status(), "tcp response received");
                let body = response
                    .bytes()
                    .await
                    .map_err(|err| KtrlError::Transport(format!("failed to read body: {err}")))?;
                Ok(body.to_vec())
            }
        }
    }
}

#[cfg(unix)]
async fn get_unix(path: &Path, url: &Url) -> Result<Vec<u8>> {
    use bytes::Bytes;
    use http_body_util::{BodyExt, Empty};
    use hyper::{header, Method, Request};
    use hyper_util::rt::TokioIo;
    use tokio::net::UnixStream;

    let stream = UnixStream::connect(path).await.map_err(|err| {
        KtrlError::Transport(format!("failed to connect to {}: {err}", path.display()))
    })?;

    let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|err| KtrlError::Transport(format!("http handshake failed: {err}")))?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            debug!(%err, "unix socket connection closed with error");
        }
    });

    let target = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    };

    let request = Request::builder()
        .method(Method::GET)
        .uri(target)
        .header(header::HOST, UNIX_AUTHORITY)
        .body(Empty::<Bytes>::new())
        .map_err(|err| KtrlError::Transport(format!("invalid request: {err}")))?;

    let response = sender
        .send_request(request)
        .await
        .map_err(|err| KtrlError::Transport(format!("request to {url} failed: {err}")))?;
    debug!(status = %response.status(), "unix socket response received");

    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|err| KtrlError::Transport(format!("failed to read body: {err}")))?
        .to_bytes();

    Ok(body.to_vec())
}
