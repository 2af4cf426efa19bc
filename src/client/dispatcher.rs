//! Client-side dispatch of commands to the daemon.

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info_span, Instrument};

use super::transport::ClientTransport;
use crate::config::TransportConfig;
use crate::models::command::CommandSpec;
use crate::models::context::{ClientContext, FlagSource, ParsedFlags};
use crate::models::flag::{FlagSpec, FlagValues};
use crate::route::{format_route, PING_RESPONSE, PING_ROUTE};
use crate::wire::encode_query;
use crate::{KtrlError, Result};

#[derive(Debug, Deserialize)]
struct PingBody {
    message: String,
}

/// Turns command invocations into single GET requests.
///
/// Every dispatch is one request: no retry, no backoff.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    transport: ClientTransport,
}

impl Dispatcher {
    /// Dispatcher over an already-built transport.
    #[must_use]
    pub fn new(transport: ClientTransport) -> Self {
        Self { transport }
    }

    /// Build the transport for `config` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Config` if the transport cannot be built.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        ClientTransport::new(config).map(Self::new)
    }

    /// Underlying transport.
    #[must_use]
    pub fn transport(&self) -> &ClientTransport {
        &self.transport
    }

    /// Full request URL for `route` carrying `values` and `args`.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Transport` if the route does not form a valid URL.
    pub fn url_for(&self, route: &str, values: &FlagValues, args: &[String]) -> Result<Url> {
        let raw = format!("{}{route}", self.transport.base_url());
        let mut url = Url::parse(&raw)
            .map_err(|err| KtrlError::Transport(format!("invalid url '{raw}': {err}")))?;

        let params = encode_query(values, args);
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send one request to `route` and return the raw response body.
    ///
    /// The status code is not inspected; the body is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Transport` when the daemon cannot be reached or
    /// the response cannot be read.
    pub async fn dispatch(&self, route: &str, values: &FlagValues, args: &[String]) -> Result<Vec<u8>> {
        let url = self.url_for(route, values, args)?;
        let span = info_span!("dispatch", %route);
        async move {
            debug!(%url, "sending request");
            self.transport.get(&url).await
        }
        .instrument(span)
        .await
    }

    /// Shell execution path: dispatch `spec` and hand the result to its
    /// run function.
    ///
    /// Dispatch failures are not raised: the run function sees an empty
    /// result. Commands that send in their run function are not dispatched
    /// here; their sender function gets a clone of this dispatcher.
    pub async fn run(&self, spec: &CommandSpec, flags: ParsedFlags) -> ClientContext {
        let route = spec.route();
        let result = if spec.sends_in_run() {
            debug!(%route, "automatic dispatch skipped");
            Vec::new()
        } else {
            match self.dispatch(&route, flags.values(), flags.args()).await {
                Ok(body) => body,
                Err(err) => {
                    debug!(%route, %err, "dispatch failed; continuing with empty result");
                    Vec::new()
                }
            }
        };

        let mut ctx = ClientContext::new(route, flags).with_result(result);
        if let Some(run) = spec.run_fn() {
            run(&ctx);
        }
        if let Some(run) = spec.sender_run_fn() {
            ctx = run(ctx, self.clone()).await;
        }
        ctx
    }

    /// Send a command by name using each flag's default value.
    ///
    /// Failures yield an empty result.
    pub async fn send_msg(
        &self,
        name: &str,
        parent: &str,
        flags: &[FlagSpec],
        args: &[String],
    ) -> Vec<u8> {
        self.send_values(name, parent, &FlagValues::defaults(flags), args)
            .await
            .unwrap_or_else(|err| {
                debug!(%name, %parent, %err, "send failed; returning empty result");
                Vec::new()
            })
    }

    /// Send a command by name with explicit flag values.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Transport` when the daemon cannot be reached.
    pub async fn send_values(
        &self,
        name: &str,
        parent: &str,
        values: &FlagValues,
        args: &[String],
    ) -> Result<Vec<u8>> {
        self.dispatch(&format_route(name, parent), values, args).await
    }

    /// Probe the liveness route.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Transport` if nothing answers or the answer is
    /// not the liveness payload.
    pub async fn ping(&self) -> Result<()> {
        let body = self.dispatch(PING_ROUTE, &FlagValues::new(), &[]).await?;
        match serde_json::from_slice::<PingBody>(&body) {
            Ok(ping) if ping.message == PING_RESPONSE => Ok(()),
            Ok(ping) => Err(KtrlError::Transport(format!(
                "unexpected liveness message: {}",
                ping.message
            ))),
            Err(err) => Err(KtrlError::Transport(format!(
                "invalid liveness response: {err}"
            ))),
        }
    }

    /// Whether a daemon is already listening on the configured transport.
    pub async fn is_daemon_running(&self) -> bool {
        self.ping().await.is_ok()
    }
}
