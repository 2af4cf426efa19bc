//! Per-invocation contexts handed to run functions and handlers.
//!
//! Both sides read flags and positional args through [`FlagSource`]. The
//! shell side resolves them from parsed command-line flags
//! ([`ParsedFlags`]), the daemon side from inbound query parameters
//! ([`QueryParams`]). Either way values are resolved once, at construction.

use axum::http::StatusCode;
use serde::Serialize;

use super::flag::FlagValues;

/// Read access to the resolved flags and positional args of one invocation.
pub trait FlagSource {
    /// Resolved flag values.
    fn values(&self) -> &FlagValues;

    /// Positional args.
    fn args(&self) -> &[String];

    /// String flag, or `""`.
    fn get_string(&self, name: &str) -> String {
        self.values().get_string(name)
    }

    /// Boolean flag, or `false`.
    fn get_bool(&self, name: &str) -> bool {
        self.values().get_bool(name)
    }

    /// Integer flag, or `0`.
    fn get_int(&self, name: &str) -> i64 {
        self.values().get_int(name)
    }

    /// Float flag, or `0.0`.
    fn get_float(&self, name: &str) -> f64 {
        self.values().get_float(name)
    }
}

/// Flags and args as parsed from a shell command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFlags {
    values: FlagValues,
    args: Vec<String>,
}

impl ParsedFlags {
    /// Wrap already-typed values.
    #[must_use]
    pub fn new(values: FlagValues, args: Vec<String>) -> Self {
        Self { values, args }
    }
}

impl FlagSource for ParsedFlags {
    fn values(&self) -> &FlagValues {
        &self.values
    }

    fn args(&self) -> &[String] {
        &self.args
    }
}

/// Flags and args decoded from inbound query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    values: FlagValues,
    args: Vec<String>,
}

impl QueryParams {
    /// Wrap already-decoded values.
    #[must_use]
    pub fn new(values: FlagValues, args: Vec<String>) -> Self {
        Self { values, args }
    }
}

impl FlagSource for QueryParams {
    fn values(&self) -> &FlagValues {
        &self.values
    }

    fn args(&self) -> &[String] {
        &self.args
    }
}

/// Shell-side context: what was sent and the raw bytes that came back.
#[derive(Debug, Clone)]
pub struct ClientContext {
    route: String,
    flags: ParsedFlags,
    result: Vec<u8>,
}

impl ClientContext {
    /// Context for a dispatch to `route`, before a result is known.
    #[must_use]
    pub fn new(route: impl Into<String>, flags: ParsedFlags) -> Self {
        Self {
            route: route.into(),
            flags,
            result: Vec::new(),
        }
    }

    /// Attach the raw daemon response.
    #[must_use]
    pub fn with_result(mut self, result: Vec<u8>) -> Self {
        self.result = result;
        self
    }

    /// Route the command was dispatched to.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Raw response body; empty when the dispatch failed.
    #[must_use]
    pub fn result(&self) -> &[u8] {
        &self.result
    }

    /// Response body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn result_text(&self) -> String {
        String::from_utf8_lossy(&self.result).into_owned()
    }
}

impl FlagSource for ClientContext {
    fn values(&self) -> &FlagValues {
        self.flags.values()
    }

    fn args(&self) -> &[String] {
        self.flags.args()
    }
}

/// Response body written by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Written verbatim as text.
    Text(String),
    /// Written verbatim as bytes.
    Bytes(Vec<u8>),
    /// Marshaled JSON text, or the marshal error.
    Json(std::result::Result<String, String>),
}

impl Payload {
    /// Marshal `value` to JSON. A failure is kept and later answered with
    /// `500` and the error text.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::Json(serde_json::to_string(value).map_err(|err| err.to_string()))
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Payload {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

/// Final status, content type and body of one handled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status.
    pub status: StatusCode,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl Reply {
    fn from_payload(payload: Payload, status: StatusCode) -> Self {
        match payload {
            Payload::Text(text) => Self {
                status,
                content_type: "text/plain; charset=utf-8",
                body: text.into_bytes(),
            },
            Payload::Bytes(bytes) => Self {
                status,
                content_type: "application/octet-stream",
                body: bytes,
            },
            Payload::Json(Ok(json)) => Self {
                status,
                content_type: "application/json",
                body: json.into_bytes(),
            },
            Payload::Json(Err(err)) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                content_type: "text/plain; charset=utf-8",
                body: err.into_bytes(),
            },
        }
    }
}

/// Daemon-side context for one inbound request.
///
/// Sending more than once replaces the earlier response: the last write
/// wins. A handler that never sends answers `200` with an empty body.
#[derive(Debug, Clone)]
pub struct ServerContext {
    route: String,
    flags: QueryParams,
    reply: Option<Reply>,
}

impl ServerContext {
    /// Context for a request that hit `route`.
    #[must_use]
    pub fn new(route: impl Into<String>, flags: QueryParams) -> Self {
        Self {
            route: route.into(),
            flags,
            reply: None,
        }
    }

    /// Route the request was bound at.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Respond with `payload` and status `200`.
    pub fn send_response(&mut self, payload: impl Into<Payload>) {
        self.send_response_with(payload, StatusCode::OK);
    }

    /// Respond with `payload` and `status`.
    pub fn send_response_with(&mut self, payload: impl Into<Payload>, status: StatusCode) {
        self.reply = Some(Reply::from_payload(payload.into(), status));
    }

    /// Respond with `value` marshaled to JSON and status `200`.
    pub fn send_json<T: Serialize + ?Sized>(&mut self, value: &T) {
        self.send_response(Payload::json(value));
    }

    /// The response to emit.
    #[must_use]
    pub fn into_reply(self) -> Reply {
        self.reply.unwrap_or_else(|| Reply {
            status: StatusCode::OK,
            content_type: "text/plain; charset=utf-8",
            body: Vec::new(),
        })
    }
}

impl FlagSource for ServerContext {
    fn values(&self) -> &FlagValues {
        self.flags.values()
    }

    fn args(&self) -> &[String] {
        self.flags.args()
    }
}
