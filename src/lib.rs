#![forbid(unsafe_code)]

//! `ktrl` — one command definition, two execution paths.
//!
//! Commands are registered once as [`CommandSpec`]s. The interactive shell
//! parses them from input lines and forwards each invocation as a single
//! HTTP `GET` to a local daemon over a unix socket or TCP; the daemon binds
//! the same specs as route handlers.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod registry;
pub mod route;
pub mod server;
pub mod shell;
pub mod wire;

pub use client::dispatcher::Dispatcher;
pub use config::{KtrlConfig, TransportConfig};
pub use errors::{KtrlError, Result};
pub use models::command::CommandSpec;
pub use models::context::{ClientContext, FlagSource, ServerContext};
pub use models::flag::{FlagKind, FlagSpec, FlagValue, FlagValues};
pub use registry::{Registry, RegistryBuilder};
pub use route::format_route;
